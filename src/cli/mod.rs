//! CLI module for Lydbot.

mod output;
pub mod preflight;

pub use output::Output;

use clap::Parser;

/// Lydbot - find a song on YouTube and get it back as audio in Telegram.
///
/// Runs until interrupted. Send the bot `/play <song name>` or just the song name.
#[derive(Parser, Debug)]
#[command(name = "lydbot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Telegram bot token
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}
