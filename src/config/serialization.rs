//! Config serialization to TOML
//!
//! Single source of truth for the config file format.

use super::Config;

/// Quote a string for TOML (basic string, escaped)
fn quoted(value: &str) -> String {
    format!("{:?}", value)
}

/// Hide the cookie value, keep its name
fn masked(cookie: &str) -> String {
    match cookie.split_once('=') {
        Some((name, _)) => format!("{}=********", name.trim()),
        None => "********".to_string(),
    }
}

impl Config {
    /// Commented TOML for this configuration
    pub fn to_toml(&self) -> String {
        self.render(false)
    }

    /// Same as `to_toml` with the session cookie masked, for printing
    pub fn to_display_toml(&self) -> String {
        self.render(true)
    }

    fn render(&self, mask_secrets: bool) -> String {
        let session = match &self.session_cookie {
            Some(cookie) if mask_secrets => {
                format!("session_cookie = {}  # masked", quoted(&masked(cookie)))
            }
            Some(cookie) => format!("session_cookie = {}", quoted(cookie)),
            None => "# session_cookie = \"JSESSIONID=...\"".to_string(),
        };

        format!(
            r#"# eventdesk configuration

# Backend root (EVENTDESK_BASE_URL overrides)
base_url = {base_url}

# Cookie forwarded on admin calls (EVENTDESK_SESSION overrides)
{session}

# Start surface: public or admin (EVENTDESK_MODE overrides, --admin forces admin)
mode = "{mode}"

# Where certificates and exports are saved (EVENTDESK_DOWNLOAD_DIR overrides)
download_dir = {download_dir}

# Client state (last admin refresh)
state_dir = {state_dir}

# Theme: dark, light, nord
theme = {theme}

[bulk]
# Spacing between winner selection calls
stagger_ms = {stagger}

[certificate]
quality = {quality}
scale = {scale}

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = {log_level}
# JSON log files (in addition to the TUI buffer or stderr)
file_enabled = {log_file_enabled}
file_dir = {log_file_dir}
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = {log_file_prefix}
"#,
            base_url = quoted(&self.base_url),
            session = session,
            mode = self.mode.as_str(),
            download_dir = quoted(&self.download_dir.display().to_string()),
            state_dir = quoted(&self.state_dir.display().to_string()),
            theme = quoted(&self.theme),
            stagger = self.bulk_stagger.as_millis(),
            quality = self.certificate.quality,
            scale = self.certificate.scale,
            log_level = quoted(&self.logging.level),
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = quoted(&self.logging.file_dir.display().to_string()),
            log_file_rotation = self.logging.file_rotation.as_str(),
            log_file_prefix = quoted(&self.logging.file_prefix),
        )
    }
}
