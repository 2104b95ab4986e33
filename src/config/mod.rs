//! Configuration for the client
//!
//! Configuration is loaded in order of precedence:
//! 1. Command-line flags (`--admin`, `--base-url`)
//! 2. Environment variables
//! 3. Config file (~/.config/eventdesk/config.toml)
//! 4. Built-in defaults

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

mod logging;
mod serialization;

#[cfg(test)]
mod tests;

pub use logging::{FileLogging, LogRotation, LoggingConfig};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/EventTech/";

pub const ENV_BASE_URL: &str = "EVENTDESK_BASE_URL";
pub const ENV_SESSION: &str = "EVENTDESK_SESSION";
pub const ENV_MODE: &str = "EVENTDESK_MODE";
pub const ENV_DOWNLOAD_DIR: &str = "EVENTDESK_DOWNLOAD_DIR";

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Which surface the TUI opens on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Public registration page
    #[default]
    Public,
    /// Admin dashboard and event settings
    Admin,
}

impl Mode {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "admin" => Mode::Admin,
            _ => Mode::Public,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Public => "public",
            Mode::Admin => "admin",
        }
    }
}

/// Certificate output settings
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateConfig {
    /// JPEG quality, 1..=100
    pub quality: u8,
    /// Multiplier over the 800x566 base page
    pub scale: u32,
}

impl Default for CertificateConfig {
    fn default() -> Self {
        Self {
            quality: 95,
            scale: 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Backend root, always ending with '/'
    pub base_url: String,

    /// Cookie header value forwarded on admin calls (e.g. "JSESSIONID=...")
    pub session_cookie: Option<String>,

    pub mode: Mode,

    /// Where certificates and exports are saved
    pub download_dir: PathBuf,

    /// Where client state (last admin refresh) is persisted
    pub state_dir: PathBuf,

    /// Theme name: dark, light, nord
    pub theme: String,

    /// Spacing between calls of a bulk selection
    pub bulk_stagger: Duration,

    pub certificate: CertificateConfig,

    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            session_cookie: None,
            mode: Mode::Public,
            download_dir: default_download_dir(),
            state_dir: default_state_dir(),
            theme: "dark".to_string(),
            bulk_stagger: crate::bulk::STAGGER,
            certificate: CertificateConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|p| p.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn default_state_dir() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .map(|p| p.join("eventdesk"))
        .unwrap_or_else(|| PathBuf::from(".eventdesk"))
}

fn with_trailing_slash(url: String) -> String {
    let url = url.trim().to_string();
    if url.ends_with('/') {
        url
    } else {
        format!("{url}/")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub base_url: Option<String>,
    pub session_cookie: Option<String>,
    pub mode: Option<String>,
    pub download_dir: Option<String>,
    pub state_dir: Option<String>,
    pub theme: Option<String>,

    /// Optional [bulk] section
    pub bulk: Option<FileBulk>,

    /// Optional [certificate] section
    pub certificate: Option<FileCertificate>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileBulk {
    pub stagger_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileCertificate {
    pub quality: Option<u8>,
    pub scale: Option<u32>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// ~/.config/eventdesk/config.toml on all platforms
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("eventdesk").join("config.toml"))
    }

    /// Write the commented template if no config file exists yet
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };
        if path.exists() {
            return;
        }
        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return;
            }
        }
        // Config is optional; a failed write just means defaults next time
        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Read the config file. A missing file means defaults; a broken one is
    /// an error so the user is not left debugging silently ignored values.
    fn load_file_config() -> Result<FileConfig> {
        let Some(path) = Self::config_path() else {
            return Ok(FileConfig::default());
        };
        match std::fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
            Err(e) => {
                Err(e).with_context(|| format!("Cannot read config file {}", path.display()))
            }
        }
    }

    /// Load configuration: env vars > file > defaults
    pub fn load() -> Result<Self> {
        let file = Self::load_file_config()?;
        Ok(Self::from_sources(file, |key| std::env::var(key).ok()))
    }

    /// Merge a parsed file with an environment lookup
    pub(crate) fn from_sources(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let base_url = env(ENV_BASE_URL)
            .or(file.base_url)
            .map(with_trailing_slash)
            .unwrap_or(defaults.base_url);

        let session_cookie = env(ENV_SESSION)
            .or(file.session_cookie)
            .filter(|c| !c.is_empty());

        let mode = env(ENV_MODE)
            .or(file.mode)
            .map(|m| Mode::parse(&m))
            .unwrap_or(defaults.mode);

        let download_dir = env(ENV_DOWNLOAD_DIR)
            .or(file.download_dir)
            .map(PathBuf::from)
            .unwrap_or(defaults.download_dir);

        let state_dir = file
            .state_dir
            .map(PathBuf::from)
            .unwrap_or(defaults.state_dir);

        let theme = file.theme.unwrap_or(defaults.theme);

        let bulk_stagger = file
            .bulk
            .and_then(|b| b.stagger_ms)
            .map(Duration::from_millis)
            .unwrap_or(defaults.bulk_stagger);

        let file_cert = file.certificate.unwrap_or_default();
        let certificate = CertificateConfig {
            quality: file_cert
                .quality
                .map(|q| q.clamp(1, 100))
                .unwrap_or(defaults.certificate.quality),
            scale: file_cert
                .scale
                .map(|s| s.clamp(1, 4))
                .unwrap_or(defaults.certificate.scale),
        };

        let logging = LoggingConfig::from_file(file.logging);

        Self {
            base_url,
            session_cookie,
            mode,
            download_dir,
            state_dir,
            theme,
            bulk_stagger,
            certificate,
            logging,
        }
    }

    /// Apply command-line overrides on top of the loaded values
    pub fn with_overrides(mut self, admin: bool, base_url: Option<String>) -> Self {
        if admin {
            self.mode = Mode::Admin;
        }
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = with_trailing_slash(url);
        }
        self
    }

    /// state.json in the state directory
    pub fn state_file(&self) -> PathBuf {
        self.state_dir.join("state.json")
    }
}
