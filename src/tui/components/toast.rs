//! Toast notification stack
//!
//! Non-blocking overlays stacked in the bottom-right corner. At most
//! `MAX_TOASTS` are visible; adding one more evicts the oldest immediately,
//! regardless of its own timer. Removal is idempotent so the expiry sweep and
//! a manual dismissal can both target the same toast.

use crate::tui::theme::Theme;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

/// Maximum number of toasts shown at once
pub const MAX_TOASTS: usize = 5;

/// Default lifetime of a toast
pub const DEFAULT_DURATION: Duration = Duration::from_millis(5000);

/// Toast severity, decides icon and accent color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastKind {
    pub fn icon(&self) -> &'static str {
        match self {
            ToastKind::Success => "✓",
            ToastKind::Error => "✕",
            ToastKind::Warning => "⚠",
            ToastKind::Info => "ℹ",
        }
    }

    fn color(&self, theme: &Theme) -> ratatui::style::Color {
        match self {
            ToastKind::Success => theme.success,
            ToastKind::Error => theme.error,
            ToastKind::Warning => theme.warning,
            ToastKind::Info => theme.info,
        }
    }
}

/// Stable handle for dismissing a specific toast
pub type ToastId = u64;

/// A toast notification
#[derive(Debug, Clone)]
pub struct Toast {
    pub id: ToastId,
    /// Message to display
    pub message: String,
    pub kind: ToastKind,
    /// Zero means the toast stays until dismissed
    pub duration: Duration,
    /// When the toast was created
    created_at: Instant,
}

impl Toast {
    /// Check if the toast has expired and should be removed
    pub fn is_expired(&self, now: Instant) -> bool {
        !self.duration.is_zero() && now.duration_since(self.created_at) >= self.duration
    }
}

/// Ordered toast container, oldest first
#[derive(Debug, Default)]
pub struct ToastStack {
    toasts: VecDeque<Toast>,
    next_id: ToastId,
}

impl ToastStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_at(
        &mut self,
        message: impl Into<String>,
        kind: ToastKind,
        duration: Duration,
        now: Instant,
    ) -> ToastId {
        let id = self.next_id;
        self.next_id += 1;

        let message = message.into();
        tracing::debug!(id, ?kind, "toast: {}", message);

        self.toasts.push_back(Toast {
            id,
            message,
            kind,
            duration,
            created_at: now,
        });

        // FIFO eviction, independent of the evicted toast's own timer
        while self.toasts.len() > MAX_TOASTS {
            self.toasts.pop_front();
        }

        id
    }

    /// Remove a toast. Returns false if it was already gone.
    pub fn dismiss(&mut self, id: ToastId) -> bool {
        match self.toasts.iter().position(|t| t.id == id) {
            Some(idx) => {
                self.toasts.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Dismiss the most recently added toast (manual close)
    pub fn dismiss_newest(&mut self) -> bool {
        match self.latest().map(|t| t.id) {
            Some(id) => self.dismiss(id),
            None => false,
        }
    }

    /// Drop every toast whose timer has run out
    pub fn prune_expired(&mut self, now: Instant) {
        self.toasts.retain(|t| !t.is_expired(now));
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn latest(&self) -> Option<&Toast> {
        self.toasts.back()
    }

    /// Render the stack in the bottom-right corner, newest at the bottom
    ///
    /// Uses `Clear` so toasts stay visible on top of modals.
    pub fn render(&self, f: &mut Frame, area: Rect, theme: &Theme) {
        let max_width = area.width.saturating_sub(4).min(50);
        if max_width < 8 {
            return;
        }

        let mut bottom = area.bottom().saturating_sub(1);
        for toast in self.toasts.iter().rev() {
            // icon + space + message, 2 for borders, 2 for padding
            let text_width = toast.message.width() as u16 + 2;
            let width = (text_width + 4).min(max_width);
            let inner = width.saturating_sub(4).max(1);
            let lines = (text_width + inner - 1) / inner;
            let height = lines + 2;

            if bottom < area.y + height {
                break;
            }
            let y = bottom - height;
            let x = area.right().saturating_sub(width + 2);
            let toast_area = Rect::new(x, y, width, height);

            let accent = toast.kind.color(theme);
            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(theme.border_type)
                .border_style(Style::default().fg(accent))
                .style(Style::default().bg(theme.background));

            let text = Paragraph::new(Line::from(vec![
                Span::styled(format!("{} ", toast.kind.icon()), Style::default().fg(accent)),
                Span::styled(toast.message.as_str(), Style::default().fg(theme.foreground)),
            ]))
            .wrap(Wrap { trim: true })
            .block(block);

            f.render_widget(Clear, toast_area);
            f.render_widget(text, toast_area);
            bottom = y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sixth_toast_evicts_oldest() {
        let mut stack = ToastStack::new();
        let now = Instant::now();
        let ids: Vec<_> = (0..5)
            .map(|i| stack.show_at(format!("t{i}"), ToastKind::Info, DEFAULT_DURATION, now))
            .collect();
        assert_eq!(stack.len(), 5);

        stack.show_at("t5", ToastKind::Info, DEFAULT_DURATION, now);
        assert_eq!(stack.len(), 5);
        let messages: Vec<_> = stack.iter().map(|t| t.message.as_str()).collect();
        assert_eq!(messages, vec!["t1", "t2", "t3", "t4", "t5"]);
        assert!(!stack.dismiss(ids[0]), "evicted toast is already gone");

        stack.show_at("t6", ToastKind::Info, DEFAULT_DURATION, now);
        assert_eq!(stack.len(), 5);
    }

    #[test]
    fn test_eviction_ignores_remaining_lifetime() {
        let mut stack = ToastStack::new();
        let now = Instant::now();
        stack.show_at("sticky", ToastKind::Error, Duration::ZERO, now);
        for i in 0..5 {
            stack.show_at(format!("t{i}"), ToastKind::Info, Duration::from_secs(1), now);
        }
        assert!(stack.iter().all(|t| t.message != "sticky"));
    }

    #[test]
    fn test_expiry_and_persistent_toasts() {
        let mut stack = ToastStack::new();
        let now = Instant::now();
        stack.show_at("short", ToastKind::Info, Duration::from_millis(1000), now);
        stack.show_at("forever", ToastKind::Warning, Duration::ZERO, now);

        stack.prune_expired(now + Duration::from_millis(999));
        assert_eq!(stack.len(), 2);

        stack.prune_expired(now + Duration::from_secs(3600));
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.latest().map(|t| t.message.as_str()), Some("forever"));
    }

    #[test]
    fn test_dismiss_is_idempotent() {
        let mut stack = ToastStack::new();
        let now = Instant::now();
        let id = stack.show_at("bye", ToastKind::Success, Duration::from_millis(10), now);

        assert!(stack.dismiss(id));
        assert!(!stack.dismiss(id));
        // Timer firing after manual dismissal is a no-op
        stack.prune_expired(now + Duration::from_secs(1));
        assert!(stack.is_empty());
    }
}
