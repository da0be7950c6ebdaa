//! Inbound command parsing.

use regex::Regex;
use std::sync::LazyLock;

// `/name`, optionally addressed as `/name@SomeBot`, then free text.
static COMMAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/([A-Za-z0-9_]+)(?:@[A-Za-z0-9_]+)?(?:\s+([\s\S]*))?$")
        .expect("Invalid regex")
});

/// A slash command sent to the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    /// Search query, whitespace-normalized. May be empty.
    Play(String),
    Unknown(String),
}

impl Command {
    /// Parse a message text. Returns `None` for plain (non-command) text.
    pub fn parse(text: &str) -> Option<Command> {
        if !text.starts_with('/') {
            return None;
        }

        let Some(caps) = COMMAND_RE.captures(text) else {
            return Some(Command::Unknown(text.to_string()));
        };

        let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
        let args = caps
            .get(2)
            .map(|m| m.as_str().split_whitespace().collect::<Vec<_>>().join(" "))
            .unwrap_or_default();

        Some(match name {
            "start" => Command::Start,
            "help" => Command::Help,
            "play" => Command::Play(args),
            other => Command::Unknown(other.to_string()),
        })
    }
}
