/*!
 * Interface to the external video player.
 *
 * Decoding and rendering live outside this crate. The controller only needs
 * transport commands, a position query and lifecycle notifications, which the
 * `Player` trait captures. `HeadlessPlayer` is a clock-driven stand-in used by
 * the CLI to run a drill session without a renderer.
 */

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use log::debug;

use crate::clock::Clock;
use crate::errors::PlayerError;

/// Lifecycle notifications from the player
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Media opened and ready
    Opened,
    /// Playback reached the end of the media
    Ended,
    /// Loading or playback failed
    Failed(String),
}

/// Operations the controller issues to a video player
pub trait Player {
    /// Open media. Failures are also reported as `PlayerEvent::Failed`.
    fn open(&mut self, uri: &Path) -> Result<(), PlayerError>;

    fn play(&mut self);

    fn pause(&mut self);

    fn seek(&mut self, position_ms: u64);

    /// Current playback position
    fn position_ms(&self) -> u64;

    /// Media duration, when known
    fn duration_ms(&self) -> Option<u64>;

    fn is_playing(&self) -> bool;

    /// Next pending lifecycle notification
    fn poll_event(&mut self) -> Option<PlayerEvent> {
        None
    }
}

/// Player without output whose position advances with its clock while playing
#[derive(Debug)]
pub struct HeadlessPlayer<C: Clock> {
    clock: C,
    duration_ms: Option<u64>,
    media: Option<PathBuf>,
    // Position at the last play/pause/seek
    anchor_ms: u64,
    // Clock time when playback last started
    playing_since: Option<u64>,
    ended_reported: bool,
    events: VecDeque<PlayerEvent>,
}

impl<C: Clock> HeadlessPlayer<C> {
    pub fn new(clock: C, duration_ms: Option<u64>) -> Self {
        Self {
            clock,
            duration_ms,
            media: None,
            anchor_ms: 0,
            playing_since: None,
            ended_reported: false,
            events: VecDeque::new(),
        }
    }

    /// Currently opened media
    pub fn media(&self) -> Option<&Path> {
        self.media.as_deref()
    }

    fn raw_position(&self) -> u64 {
        let elapsed = self
            .playing_since
            .map_or(0, |since| self.clock.now_ms().saturating_sub(since));
        let position = self.anchor_ms + elapsed;
        match self.duration_ms {
            Some(duration) => position.min(duration),
            None => position,
        }
    }

    fn check_ended(&mut self) {
        let Some(duration) = self.duration_ms else { return };
        if self.playing_since.is_some() && self.raw_position() >= duration {
            self.anchor_ms = duration;
            self.playing_since = None;
            if !self.ended_reported {
                self.ended_reported = true;
                self.events.push_back(PlayerEvent::Ended);
            }
        }
    }
}

impl<C: Clock> Player for HeadlessPlayer<C> {
    fn open(&mut self, uri: &Path) -> Result<(), PlayerError> {
        self.anchor_ms = 0;
        self.playing_since = None;
        self.ended_reported = false;

        if !uri.exists() {
            self.media = None;
            let message = format!("{} does not exist", uri.display());
            self.events.push_back(PlayerEvent::Failed(message.clone()));
            return Err(PlayerError::Open(message));
        }

        debug!("Headless player opened {}", uri.display());
        self.media = Some(uri.to_path_buf());
        self.events.push_back(PlayerEvent::Opened);
        Ok(())
    }

    fn play(&mut self) {
        if self.media.is_none() || self.playing_since.is_some() {
            return;
        }
        if self.duration_ms.is_some_and(|d| self.anchor_ms >= d) {
            return;
        }
        self.playing_since = Some(self.clock.now_ms());
    }

    fn pause(&mut self) {
        self.anchor_ms = self.raw_position();
        self.playing_since = None;
    }

    fn seek(&mut self, position_ms: u64) {
        let position_ms = match self.duration_ms {
            Some(duration) => position_ms.min(duration),
            None => position_ms,
        };
        self.anchor_ms = position_ms;
        if self.playing_since.is_some() {
            self.playing_since = Some(self.clock.now_ms());
        }
        if self.duration_ms.is_some_and(|d| position_ms < d) {
            self.ended_reported = false;
        }
    }

    fn position_ms(&self) -> u64 {
        self.raw_position()
    }

    fn duration_ms(&self) -> Option<u64> {
        self.duration_ms
    }

    fn is_playing(&self) -> bool {
        self.playing_since.is_some()
    }

    fn poll_event(&mut self) -> Option<PlayerEvent> {
        self.check_ended();
        self.events.pop_front()
    }
}
