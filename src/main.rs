// EventDesk - terminal client for EventTech event registration
//
// Public mode lists events and registers participants; admin mode adds the
// participants dashboard, winner selection, exports and event settings.
//
// Architecture:
// - API client (reqwest): typed calls against the registration backend
// - App state (tui::app): owns all UI state, turns input into commands
// - Runtime (tui): spawns commands as tokio tasks, results return over mpsc
// - Certificates: previewed in a modal, rasterized to JPEG on download
// - Logging: tracing into an in-memory buffer (TUI) or stderr (headless)

mod api;
mod bulk;
mod certificate;
mod cli;
mod config;
mod error;
mod events;
mod filters;
mod logging;
mod session;
mod tui;
mod validation;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use logging::{LogBuffer, LogTarget};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config()?;

    match cli.command {
        Some(Commands::Config { show, reset, path }) => {
            return cli::handle_config(show, reset, path, &config);
        }
        Some(Commands::Export {
            format,
            event,
            status,
            search,
        }) => {
            let filters = cli::export_filters(event, status, search)?;
            let _file_guard = logging::init(&config.logging, LogTarget::Stderr, &LogBuffer::new());
            return cli::handle_export(&config, format, filters).await;
        }
        None => {}
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    // In TUI mode logs are captured to the buffer so they never garble the
    // display. The guard must live until exit so file logs flush.
    let log_buffer = LogBuffer::new();
    let _file_guard = logging::init(&config.logging, LogTarget::Tui, &log_buffer);

    tracing::info!(version = config::VERSION, "eventdesk starting");
    tui::run(config, log_buffer).await
}
