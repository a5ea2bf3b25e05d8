/*!
 * Segment-repetition playback.
 *
 * This module provides:
 * - The controller state machine driven by position ticks
 * - Session state and modes
 * - One-shot timers guarded by mode and command epoch
 * - User commands
 */

pub mod commands;
pub mod controller;
pub mod scheduler;
pub mod state;

// Re-export main types
pub use commands::UserCommand;
pub use controller::{PlaybackController, SessionStatus};
pub use scheduler::{ScheduledAction, ScheduledEvent, Scheduler};
pub use state::{PausedFrom, PlaybackMode, TimelineState};
