// Components module - reusable UI building blocks
//
// Shell components are rendered in every view:
// - Title bar: App name, mode, active view
// - Status bar: Key hints for the active view, busy markers
// - Logs panel: Captured tracing output (toggled with L)
// - Toast: Notification stack, drawn last so it sits above modals

pub mod logs_panel;
pub mod status_bar;
pub mod title_bar;
pub mod toast;

use crate::tui::app::App;
use ratatui::{layout::Rect, Frame};

/// Render the title bar (convenience wrapper)
pub fn render_title(f: &mut Frame, area: Rect, app: &App) {
    title_bar::render(f, area, app);
}

/// Render the status bar (convenience wrapper)
pub fn render_status(f: &mut Frame, area: Rect, app: &App) {
    status_bar::render(f, area, app);
}

/// Render the logs panel (convenience wrapper)
pub fn render_logs_panel(f: &mut Frame, area: Rect, app: &App) {
    logs_panel::render(f, area, app);
}
