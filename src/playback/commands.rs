/*!
 * User commands sent to a running session.
 */

use std::str::FromStr;
use anyhow::anyhow;

/// Commands a user can issue while a session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    TogglePause,
    Pause,
    Resume,
    /// Jump to the next segment
    Next,
    /// Jump to the previous segment
    Previous,
    /// Jump to a segment (0-based)
    JumpTo(usize),
    IncreaseExtra,
    DecreaseExtra,
    /// Re-open the media after a failure
    Reload,
    Quit,
}

impl FromStr for UserCommand {
    type Err = anyhow::Error;

    /// Parse one line of console input. `g` takes a 1-based segment number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // A bare space is the pause key
        if s == " " {
            return Ok(Self::TogglePause);
        }

        let mut parts = s.split_whitespace();
        let Some(word) = parts.next() else {
            return Err(anyhow!("Empty command"));
        };

        let command = match word.to_lowercase().as_str() {
            "p" | "pause" | "space" => Self::TogglePause,
            "stop" => Self::Pause,
            "c" | "continue" | "resume" => Self::Resume,
            "n" | "next" | "right" => Self::Next,
            "b" | "back" | "prev" | "left" => Self::Previous,
            "+" | "more" => Self::IncreaseExtra,
            "-" | "less" => Self::DecreaseExtra,
            "r" | "reload" => Self::Reload,
            "q" | "quit" | "exit" => Self::Quit,
            "g" | "goto" => {
                let number: usize = parts
                    .next()
                    .ok_or_else(|| anyhow!("Missing segment number"))?
                    .parse()
                    .map_err(|e| anyhow!("Invalid segment number: {}", e))?;
                Self::JumpTo(number.saturating_sub(1))
            }
            other => return Err(anyhow!("Unknown command: {}", other)),
        };

        Ok(command)
    }
}

/// One-line help for the console
pub const COMMAND_HELP: &str =
    "p: pause/resume  n: next  b: previous  g <n>: go to segment  +/-: extra duration  r: reload  q: quit";
