use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::time::{Duration, MissedTickBehavior};

use crate::app_config::Config;
use crate::clock::{Clock, TokioClock};
use crate::display::DisplayAdapter;
use crate::errors::AppError;
use crate::file_utils::{FileManager, FileType};
use crate::player::{HeadlessPlayer, Player};
use crate::playback::{PlaybackController, SessionStatus, UserCommand};
use crate::progress::ProgressStore;
use crate::subtitle_processor::{self, SubtitleEntry};

// @module: Application controller for drill sessions

// @const: Headless media length past the last subtitle when no duration is given
const TRAILING_MEDIA_MS: u64 = 1000;

/// Outcome of a finished session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Segment index at the end of the session
    pub final_index: usize,
    pub segment_count: usize,
    /// The media played to its end
    pub finished: bool,
    /// Player failure still pending at exit
    pub error: Option<String>,
}

/// Main application controller: loads inputs and runs drill sessions
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self, AppError> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Progress store at the configured location
    pub fn progress_store(&self) -> ProgressStore {
        ProgressStore::new(self.config.progress_file.clone())
    }

    /// Resolve the video and subtitle paths for a session.
    ///
    /// A video that does not exist is looked up by file name in the progress
    /// store. Without an explicit subtitle the companion file is used.
    pub fn resolve_inputs(&self, video: &Path, subtitle: Option<&Path>) -> Result<(PathBuf, PathBuf), AppError> {
        let video = self
            .progress_store()
            .resolve_video(video)
            .unwrap_or_else(|| video.to_path_buf());

        let subtitle = match subtitle {
            Some(path) => {
                if matches!(FileManager::detect_file_type(path), Ok(FileType::Video)) {
                    return Err(AppError::Subtitle(format!("{} looks like a video file, not subtitles", path.display())));
                }
                path.to_path_buf()
            }
            None => FileManager::find_subtitle_for(&video, &self.config.subtitle_suffix).ok_or_else(|| {
                AppError::Subtitle(format!(
                    "No subtitle file found for {} (expected {})",
                    video.display(),
                    FileManager::companion_subtitle_path(&video, &self.config.subtitle_suffix).display()
                ))
            })?,
        };

        debug!("Resolved inputs: video {:?}, subtitles {:?}", video, subtitle);
        Ok((video, subtitle))
    }

    /// Parse the subtitle file into segments
    pub fn load_segments(&self, subtitle: &Path) -> Result<Vec<SubtitleEntry>, AppError> {
        let segments = subtitle_processor::parse_srt_file(subtitle)?;
        if segments.is_empty() {
            warn!("{} contains no usable segments; playing without drilling", subtitle.display());
        } else {
            info!("Loaded {} segments from {}", segments.len(), subtitle.display());
        }
        Ok(segments)
    }

    /// Build a playback controller bound to the progress store for `video`
    pub fn build_session<P: Player, C: Clock, D: DisplayAdapter>(
        &self,
        video: &Path,
        segments: Vec<SubtitleEntry>,
        player: P,
        clock: C,
        display: D,
    ) -> PlaybackController<P, C, D> {
        PlaybackController::new(self.config.playback.clone(), segments, player, clock, display)
            .with_progress(self.progress_store(), video)
    }

    /// Drive a session until the media ends or a quit command arrives.
    ///
    /// Ticks, user commands and player notifications are all handled on this
    /// task, so the controller needs no locking.
    pub async fn run_session<P: Player, C: Clock, D: DisplayAdapter>(
        &self,
        controller: &mut PlaybackController<P, C, D>,
        video: &Path,
        mut commands: mpsc::Receiver<UserCommand>,
    ) -> SessionSummary {
        // Failures are shown on the display and can be retried with a reload
        let _ = controller.open(video);

        let mut ticker = tokio::time::interval(Duration::from_millis(self.config.playback.tick_period_ms));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut commands_open = true;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    controller.tick();
                    if controller.is_finished() {
                        break;
                    }
                    // Nobody left to send a reload
                    if !commands_open && matches!(controller.status(), SessionStatus::Failed(_)) {
                        break;
                    }
                }
                command = commands.recv(), if commands_open => {
                    match command {
                        Some(command) => {
                            debug!("User command: {:?}", command);
                            if !controller.apply_command(command) {
                                info!("Quitting session");
                                break;
                            }
                        }
                        None => commands_open = false,
                    }
                }
            }
        }

        controller.save_progress();

        let error = match controller.status() {
            SessionStatus::Failed(message) => Some(message.clone()),
            _ => None,
        };
        SessionSummary {
            final_index: controller.current_index(),
            segment_count: controller.state().segment_count(),
            finished: controller.is_finished(),
            error,
        }
    }

    /// Run a full session against the headless player
    pub async fn run<D: DisplayAdapter>(
        &self,
        video: &Path,
        subtitle: Option<&Path>,
        duration_ms: Option<u64>,
        display: D,
        commands: mpsc::Receiver<UserCommand>,
    ) -> Result<SessionSummary, AppError> {
        let (video, subtitle) = self.resolve_inputs(video, subtitle)?;
        let segments = self.load_segments(&subtitle)?;

        let duration_ms = duration_ms.or_else(|| Self::default_media_duration(&segments));
        let clock = TokioClock::new();
        let player = HeadlessPlayer::new(clock, duration_ms);

        let mut controller = self.build_session(&video, segments, player, clock, display);
        let summary = self.run_session(&mut controller, &video, commands).await;

        info!(
            "Session ended at segment {} / {}",
            (summary.final_index + 1).min(summary.segment_count),
            summary.segment_count
        );
        Ok(summary)
    }

    /// Headless media length: the last segment end plus a short tail
    pub fn default_media_duration(segments: &[SubtitleEntry]) -> Option<u64> {
        segments
            .iter()
            .map(|s| s.end_time_ms.max(s.start_time_ms))
            .max()
            .map(|end| end.saturating_add(TRAILING_MEDIA_MS))
    }
}
