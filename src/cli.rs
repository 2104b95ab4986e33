// CLI module - command-line argument parsing and headless handlers
//
// Without a subcommand the TUI starts. Subcommands run headless:
// - config --show: Display effective configuration
// - config --path: Show config file path
// - config --reset: Regenerate config file with defaults
// - export --format: Download a participants export to the download dir

use crate::api::{Backend, ExportFormat, HttpBackend};
use crate::config::{Config, VERSION};
use crate::filters::FilterState;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;

/// Terminal client for the EventTech registration backend
#[derive(Parser, Debug)]
#[command(name = "eventdesk")]
#[command(version = VERSION)]
#[command(about = "Terminal client for EventTech event registration", long_about = None)]
pub struct Cli {
    /// Open the admin dashboard instead of the registration page
    #[arg(long, global = true)]
    pub admin: bool,

    /// Backend root URL (overrides config and EVENTDESK_BASE_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Export participants (uses the admin session)
    Export {
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        /// Only participants of this event
        #[arg(long)]
        event: Option<String>,

        /// winner or participant
        #[arg(long)]
        status: Option<String>,

        /// Name, email or college contains
        #[arg(long)]
        search: Option<String>,
    },
}

impl Cli {
    pub fn config(&self) -> Result<Config> {
        Ok(Config::load()?.with_overrides(self.admin, self.base_url.clone()))
    }
}

pub fn handle_config(show: bool, reset: bool, path: bool, config: &Config) -> Result<()> {
    if path {
        handle_config_path()
    } else if show {
        handle_config_show(config);
        Ok(())
    } else if reset {
        handle_config_reset()
    } else {
        println!("Usage: eventdesk config [--show|--reset|--path]");
        println!();
        println!("Options:");
        println!("  --show    Display effective configuration");
        println!("  --reset   Reset config file to defaults");
        println!("  --path    Show config file path");
        Ok(())
    }
}

fn handle_config_path() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;
    println!("{}", path.display());
    Ok(())
}

fn handle_config_show(config: &Config) {
    println!("# Effective configuration (flags > env > file > defaults)");
    println!();
    print!("{}", config.to_display_toml());

    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
}

fn handle_config_reset() -> Result<()> {
    let path = Config::config_path().context("Could not determine config path")?;

    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Error creating directory {}", parent.display()))?;
    }
    std::fs::write(&path, Config::default().to_toml())
        .with_context(|| format!("Error writing config {}", path.display()))?;

    println!("Config reset to defaults: {}", path.display());
    Ok(())
}

/// Filters from the export flags
pub fn export_filters(
    event: Option<String>,
    status: Option<String>,
    search: Option<String>,
) -> Result<FilterState> {
    let status = status.unwrap_or_default().trim().to_lowercase();
    if !crate::filters::STATUS_CHOICES.contains(&status.as_str()) {
        bail!("--status must be 'winner' or 'participant'");
    }
    Ok(FilterState {
        event: event.unwrap_or_default().trim().to_string(),
        status,
        search: search.unwrap_or_default().trim().to_string(),
    })
}

pub async fn handle_export(config: &Config, format: ExportFormat, filters: FilterState) -> Result<()> {
    println!("Preparing {} export...", format.as_str().to_uppercase());
    let backend = HttpBackend::new(&config.base_url, config.session_cookie.clone())?;
    let file = backend
        .export(format, filters)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))
        .context("Export failed")?;

    let path = file
        .save_to(&config.download_dir)
        .with_context(|| format!("Cannot save export to {}", config.download_dir.display()))?;
    println!("Saved {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::try_parse_from(["eventdesk", "--admin", "--base-url", "http://x"]).unwrap();
        assert!(cli.admin);
        assert_eq!(cli.base_url.as_deref(), Some("http://x"));
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_parse_export() {
        let cli = Cli::try_parse_from(["eventdesk", "export", "--format", "json", "--status", "winner"])
            .unwrap();
        match cli.command {
            Some(Commands::Export { format, status, .. }) => {
                assert_eq!(format, ExportFormat::Json);
                assert_eq!(status.as_deref(), Some("winner"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_export_filters_reject_unknown_status() {
        assert!(export_filters(None, Some("loser".to_string()), None).is_err());
        let filters = export_filters(Some(" Hack Night ".to_string()), None, None).unwrap();
        assert_eq!(filters.event, "Hack Night");
        assert_eq!(filters.status, "");
    }
}
