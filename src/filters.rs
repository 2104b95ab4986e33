//! Dashboard filter state
//!
//! Filters are owned by the app state and passed to participant loads and
//! exports explicitly. Search input is debounced: the value only becomes the
//! active filter after it has been quiet for `SEARCH_DEBOUNCE`.

use std::time::{Duration, Instant};

/// Quiet period before a search edit is applied
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Status filter values understood by the backend, "" meaning all
pub const STATUS_CHOICES: [&str; 3] = ["", "winner", "participant"];

/// Current participant filters; empty strings mean "no filter"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub event: String,
    pub status: String,
    pub search: String,
}

impl FilterState {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.event.is_empty() && self.status.is_empty() && self.search.is_empty()
    }

    /// Query parameters for the non-empty filters
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("event", &self.event),
            ("status", &self.status),
            ("search", &self.search),
        ]
        .into_iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| (k, v.clone()))
        .collect()
    }

    /// Export parameters. The export endpoint names the status filter
    /// `winner`, so it is sent under both names.
    pub fn export_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = self.query_pairs();
        if !self.status.is_empty() {
            pairs.push(("winner", self.status.clone()));
        }
        pairs
    }

    /// Step the event filter through "" and the known event names
    pub fn cycle_event(&mut self, events: &[String], forward: bool) {
        self.event = cycle(&self.event, events.iter().map(String::as_str), forward);
    }

    pub fn cycle_status(&mut self, forward: bool) {
        self.status = cycle(&self.status, STATUS_CHOICES[1..].iter().copied(), forward);
    }

    /// After the event list reloads, keep the selection only if it still exists
    pub fn retain_event(&mut self, events: &[String]) {
        if !self.event.is_empty() && !events.iter().any(|e| *e == self.event) {
            tracing::debug!(event = %self.event, "event filter no longer available");
            self.event.clear();
        }
    }

    /// Short human-readable summary for the filter bar
    pub fn describe(&self) -> String {
        let part = |label: &str, value: &str| {
            if value.is_empty() {
                format!("{label}: all")
            } else {
                format!("{label}: {value}")
            }
        };
        format!(
            "{}  {}  {}",
            part("event", &self.event),
            part("status", &self.status),
            part("search", &self.search)
        )
    }
}

/// Cycle through an implicit "" followed by `choices`
fn cycle<'a>(current: &str, choices: impl Iterator<Item = &'a str>, forward: bool) -> String {
    let mut slots: Vec<&str> = vec![""];
    slots.extend(choices);
    let idx = slots.iter().position(|s| *s == current).unwrap_or(0);
    let next = if forward {
        (idx + 1) % slots.len()
    } else {
        (idx + slots.len() - 1) % slots.len()
    };
    slots[next].to_string()
}

/// Holds the latest search edit until it has been quiet long enough
#[derive(Debug)]
pub struct SearchDebounce {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl Default for SearchDebounce {
    fn default() -> Self {
        Self::new(SEARCH_DEBOUNCE)
    }
}

impl SearchDebounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Record an edit; restarts the quiet period
    pub fn input(&mut self, value: impl Into<String>, now: Instant) {
        self.pending = Some((value.into(), now));
    }

    /// Returns the trimmed value once the quiet period has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, at)) if now.duration_since(*at) >= self.delay => {
                self.pending.take().map(|(value, _)| value.trim().to_string())
            }
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_resets_all_values() {
        let mut filters = FilterState {
            event: "Hack Night".to_string(),
            status: "winner".to_string(),
            search: "jane".to_string(),
        };
        filters.clear();
        assert!(filters.is_empty());
        assert!(filters.query_pairs().is_empty());
    }

    #[test]
    fn test_query_pairs_skip_empty() {
        let filters = FilterState {
            event: "Hack Night".to_string(),
            ..Default::default()
        };
        assert_eq!(
            filters.query_pairs(),
            vec![("event", "Hack Night".to_string())]
        );
    }

    #[test]
    fn test_export_pairs_carry_winner_filter() {
        let filters = FilterState {
            status: "participant".to_string(),
            ..Default::default()
        };
        assert_eq!(
            filters.export_pairs(),
            vec![
                ("status", "participant".to_string()),
                ("winner", "participant".to_string())
            ]
        );
        assert!(FilterState::default().export_pairs().is_empty());
    }

    #[test]
    fn test_cycle_status() {
        let mut filters = FilterState::default();
        filters.cycle_status(true);
        assert_eq!(filters.status, "winner");
        filters.cycle_status(true);
        assert_eq!(filters.status, "participant");
        filters.cycle_status(true);
        assert_eq!(filters.status, "");
        filters.cycle_status(false);
        assert_eq!(filters.status, "participant");
    }

    #[test]
    fn test_retain_event_drops_missing_selection() {
        let events = vec!["A".to_string(), "B".to_string()];
        let mut filters = FilterState::default();
        filters.cycle_event(&events, true);
        assert_eq!(filters.event, "A");
        filters.retain_event(&events);
        assert_eq!(filters.event, "A");
        filters.retain_event(&["B".to_string()]);
        assert_eq!(filters.event, "");
    }

    #[test]
    fn test_debounce_fires_once_after_quiet_period() {
        let mut debounce = SearchDebounce::default();
        let t0 = Instant::now();
        debounce.input("ja", t0);
        debounce.input("jane ", t0 + Duration::from_millis(200));

        assert_eq!(debounce.poll(t0 + Duration::from_millis(400)), None);
        assert_eq!(
            debounce.poll(t0 + Duration::from_millis(500)),
            Some("jane".to_string())
        );
        assert_eq!(debounce.poll(t0 + Duration::from_secs(5)), None);
    }
}
