/*!
 * Display adapters.
 *
 * The controller publishes a `DisplaySnapshot` after each state change; an
 * adapter turns it into whatever the front end shows.
 */

use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};

use crate::playback::PlaybackMode;

/// Read-only view of the controller state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySnapshot {
    /// Subtitle text to show
    pub text: String,
    /// Current segment (0-based; equals `segment_count` when done)
    pub segment_index: usize,
    pub segment_count: usize,
    /// Repetitions completed for the current segment
    pub repetition: u32,
    pub repetitions_configured: u32,
    pub mode: PlaybackMode,
    pub extra_duration_ms: i64,
    /// Player failure shown to the user
    pub error: Option<String>,
}

impl DisplaySnapshot {
    /// "segment 3 / 40, repetition 2 / 3" style status line
    pub fn status_line(&self) -> String {
        let segment = (self.segment_index + 1).min(self.segment_count);
        let repetition = (self.repetition + 1).min(self.repetitions_configured);
        format!(
            "[{}] segment {}/{} rep {}/{} extra {} ms",
            self.mode, segment, self.segment_count, repetition, self.repetitions_configured, self.extra_duration_ms
        )
    }
}

/// Consumer of controller snapshots
pub trait DisplayAdapter {
    fn render(&mut self, snapshot: &DisplaySnapshot);
}

impl<D: DisplayAdapter + ?Sized> DisplayAdapter for Box<D> {
    fn render(&mut self, snapshot: &DisplaySnapshot) {
        (**self).render(snapshot)
    }
}

/// Writes each snapshot to the log
#[derive(Debug, Default)]
pub struct LogDisplay;

impl DisplayAdapter for LogDisplay {
    fn render(&mut self, snapshot: &DisplaySnapshot) {
        if let Some(message) = &snapshot.error {
            error!("{}", message);
            return;
        }
        info!("{} | {}", snapshot.status_line(), snapshot.text.replace('\n', " / "));
    }
}

/// Terminal progress bar over the segments, with the subtitle as its message
pub struct ConsoleDisplay {
    bar: ProgressBar,
}

impl ConsoleDisplay {
    pub fn new(segment_count: usize) -> Self {
        let bar = ProgressBar::new(segment_count as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{bar:30.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-"),
        );
        Self { bar }
    }

    /// Stop drawing and leave the last state on screen
    pub fn finish(&self) {
        self.bar.finish();
    }
}

impl DisplayAdapter for ConsoleDisplay {
    fn render(&mut self, snapshot: &DisplaySnapshot) {
        self.bar.set_length(snapshot.segment_count as u64);
        self.bar.set_position(snapshot.segment_index as u64);

        let message = match &snapshot.error {
            Some(error) => format!("ERROR: {}", error),
            None => {
                let repetition = (snapshot.repetition + 1).min(snapshot.repetitions_configured);
                format!(
                    "rep {}/{} [{}] {}",
                    repetition,
                    snapshot.repetitions_configured,
                    snapshot.mode,
                    snapshot.text.replace('\n', " / ")
                )
            }
        };
        self.bar.set_message(message);
    }
}

impl Drop for ConsoleDisplay {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.abandon();
        }
    }
}
