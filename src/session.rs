//! Admin session upkeep
//!
//! While the terminal has focus the dashboard re-checks the session every
//! 10 minutes and reloads its data every 5. Regaining focus reloads at once
//! when the persisted refresh stamp is missing or older than 5 minutes. An
//! unauthorized answer schedules the move to the signed-out screen 2 s later
//! so the warning toast can be read first.

use crate::error::{ErrorClass, UiError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub const SESSION_CHECK_INTERVAL: Duration = Duration::from_secs(10 * 60);
pub const AUTO_REFRESH_INTERVAL: Duration = Duration::from_secs(5 * 60);
pub const REDIRECT_DELAY: Duration = Duration::from_secs(2);

/// Age after which a focus change forces a reload
pub const STALE_AFTER: Duration = Duration::from_secs(5 * 60);

pub const EXPIRED_MESSAGE: &str = "Session expired. Redirecting to login...";

/// Timers that came due on a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionDue {
    pub check: bool,
    pub refresh: bool,
}

#[derive(Debug)]
pub struct SessionMonitor {
    focused: bool,
    next_check: Instant,
    next_refresh: Instant,
    redirect_at: Option<Instant>,
}

impl SessionMonitor {
    pub fn new(now: Instant) -> Self {
        Self {
            focused: true,
            next_check: now + SESSION_CHECK_INTERVAL,
            next_refresh: now + AUTO_REFRESH_INTERVAL,
            redirect_at: None,
        }
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Record a focus change. Timers only run while focused; regaining
    /// focus restarts both intervals from `now`.
    pub fn set_focus(&mut self, focused: bool, now: Instant) {
        if focused && !self.focused {
            self.next_check = now + SESSION_CHECK_INTERVAL;
            self.next_refresh = now + AUTO_REFRESH_INTERVAL;
        }
        self.focused = focused;
    }

    /// Restart the auto-refresh interval after a manual reload
    pub fn refreshed(&mut self, now: Instant) {
        self.next_refresh = now + AUTO_REFRESH_INTERVAL;
    }

    pub fn poll(&mut self, now: Instant) -> SessionDue {
        if !self.focused || self.redirect_at.is_some() {
            return SessionDue::default();
        }
        let mut due = SessionDue::default();
        if now >= self.next_check {
            due.check = true;
            self.next_check = now + SESSION_CHECK_INTERVAL;
        }
        if now >= self.next_refresh {
            due.refresh = true;
            self.next_refresh = now + AUTO_REFRESH_INTERVAL;
        }
        due
    }

    /// Schedule the redirect. Returns false if one is already pending.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.redirect_at.is_some() {
            return false;
        }
        tracing::warn!("admin session expired");
        self.redirect_at = Some(now + REDIRECT_DELAY);
        true
    }

    /// True once, when the redirect delay has elapsed
    pub fn redirect_due(&mut self, now: Instant) -> bool {
        match self.redirect_at {
            Some(at) if now >= at => {
                self.redirect_at = None;
                true
            }
            _ => false,
        }
    }
}

/// Is this error the backend telling us the session is gone?
pub fn is_unauthorized(error: &UiError) -> bool {
    error.class() == ErrorClass::Unauthorized
}

// ─────────────────────────────────────────────────────────────────────────────
// Persisted refresh stamp
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    /// Epoch millis
    #[serde(default)]
    last_admin_refresh: Option<i64>,
}

/// `last_admin_refresh` in state.json
#[derive(Debug, Clone)]
pub struct RefreshStamp {
    path: PathBuf,
}

impl RefreshStamp {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last stamp, None if never written or unreadable
    pub fn load(&self) -> Option<DateTime<Utc>> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        let state: StateFile = match serde_json::from_str(&contents) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable state file");
                return None;
            }
        };
        DateTime::from_timestamp_millis(state.last_admin_refresh?)
    }

    pub fn save(&self, millis: i64) -> Result<(), UiError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let state = StateFile {
            last_admin_refresh: Some(millis),
        };
        std::fs::write(&self.path, serde_json::to_vec_pretty(&state)?)?;
        Ok(())
    }

    /// Whether a focus gain at `now` should force a reload
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        stale(self.load(), now)
    }
}

pub fn stale(last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match last {
        // A stamp from the future counts as fresh
        Some(last) => (now - last)
            .to_std()
            .map(|age| age > STALE_AFTER)
            .unwrap_or(false),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[test]
    fn test_timers_fire_on_schedule() {
        let t0 = Instant::now();
        let mut monitor = SessionMonitor::new(t0);
        assert_eq!(monitor.poll(t0), SessionDue::default());

        let due = monitor.poll(t0 + AUTO_REFRESH_INTERVAL);
        assert!(due.refresh && !due.check);

        let due = monitor.poll(t0 + SESSION_CHECK_INTERVAL);
        assert!(due.refresh && due.check);
    }

    #[test]
    fn test_timers_paused_without_focus() {
        let t0 = Instant::now();
        let mut monitor = SessionMonitor::new(t0);
        monitor.set_focus(false, t0);
        assert_eq!(
            monitor.poll(t0 + SESSION_CHECK_INTERVAL * 3),
            SessionDue::default()
        );

        // Regaining focus restarts the intervals
        let back = t0 + SESSION_CHECK_INTERVAL * 3;
        monitor.set_focus(true, back);
        assert_eq!(monitor.poll(back), SessionDue::default());
        assert!(monitor.poll(back + AUTO_REFRESH_INTERVAL).refresh);
    }

    #[test]
    fn test_redirect_after_delay_once() {
        let t0 = Instant::now();
        let mut monitor = SessionMonitor::new(t0);
        assert!(monitor.expire(t0));
        assert!(!monitor.expire(t0 + Duration::from_millis(500)));
        assert!(!monitor.redirect_due(t0 + Duration::from_millis(1999)));
        assert!(monitor.redirect_due(t0 + REDIRECT_DELAY));
        assert!(!monitor.redirect_due(t0 + REDIRECT_DELAY * 2));
    }

    #[test]
    fn test_unauthorized_detection() {
        assert!(is_unauthorized(&UiError::from_backend_message(
            "Unauthorized access. Please login first."
        )));
        assert!(!is_unauthorized(&UiError::Backend("Invalid action".to_string())));
    }

    #[test]
    fn test_stale_threshold() {
        let now = Utc::now();
        assert!(stale(None, now));
        assert!(!stale(Some(now - ChronoDuration::minutes(4)), now));
        assert!(!stale(Some(now - ChronoDuration::minutes(5)), now));
        assert!(!stale(Some(now + ChronoDuration::minutes(1)), now));
        assert!(stale(Some(now - ChronoDuration::minutes(6)), now));
    }

    #[test]
    fn test_stamp_roundtrip_on_disk() {
        let dir = std::env::temp_dir().join(format!("eventdesk-state-{}", std::process::id()));
        let stamp = RefreshStamp::new(dir.join("state.json"));
        assert!(stamp.load().is_none());

        let now = Utc::now();
        stamp.save(now.timestamp_millis()).unwrap();
        assert_eq!(
            stamp.load().map(|t| t.timestamp_millis()),
            Some(now.timestamp_millis())
        );
        assert!(!stamp.is_stale(now));

        std::fs::write(stamp.path(), "not json").unwrap();
        assert!(stamp.load().is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
