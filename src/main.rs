//! Lydbot entry point.

use anyhow::Result;
use clap::Parser;
use lydbot::audio::YtDlpFetcher;
use lydbot::bot::{Dispatcher, SessionHandler};
use lydbot::catalog::YoutubeCatalog;
use lydbot::cli::{preflight, Cli, Output};
use lydbot::config::Settings;
use lydbot::telegram::TelegramClient;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("lydbot={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Missing token is fatal; anyhow prints it once on the way out.
    let settings = Arc::new(settings.with_token(cli.token.clone())?);

    let report = preflight::check(&settings)?;
    for problem in &report.problems {
        Output::warning(&problem.to_string());
    }

    std::fs::create_dir_all(settings.staging_dir())?;

    let client = TelegramClient::new(&settings)?;
    let handler = Arc::new(SessionHandler::new(
        Arc::new(client.clone()),
        Arc::new(YoutubeCatalog::new(&settings.download)),
        Arc::new(YtDlpFetcher::new(&settings)),
        settings.clone(),
    ));

    Output::header("Lydbot");
    Output::kv("Staging", &settings.staging_dir().display().to_string());
    Output::kv("Performer", &settings.bot.performer);
    if report.is_ok() {
        Output::success("yt-dlp and ffmpeg found");
    }
    Output::info("Bot is starting...");

    Dispatcher::new(client, handler, settings.telegram.poll_timeout_secs)
        .run()
        .await?;

    Ok(())
}
