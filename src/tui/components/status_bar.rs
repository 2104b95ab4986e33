// Status bar component
//
// Key hints for the active view, plus what is currently in flight.

use crate::tui::app::{App, View};
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn hints(app: &App) -> &'static str {
    if app.search_editing {
        return "type to search │ Enter: done │ Esc: stop editing";
    }
    if app.modals.any_active() {
        return "Esc: close all dialogs │ click outside: close top dialog";
    }
    match app.view {
        View::Register => "↑↓: event │ Enter: register │ r: blank form │ ?: help │ q: quit",
        View::Dashboard => {
            "Space: select │ a: page │ w/u: winner/revoke │ b: bulk │ v: certificate │ D: delete │ e/s: filter │ /: search │ c: clear │ Tab: events"
        }
        View::EventSettings => "↑↓: browse │ Ctrl+N: add │ e: edit │ D: delete │ Ctrl+R: reload │ Tab: dashboard",
        View::SignedOut => "Session expired │ restart with a fresh session cookie │ q: quit",
    }
}

/// Render the status bar
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let mut busy = Vec::new();
    if app.busy.registering {
        busy.push("registering");
    }
    if app.busy.saving_event {
        busy.push("saving event");
    }
    if app.busy.loading_certificate {
        busy.push("fetching certificate");
    }
    if app.busy.downloading {
        busy.push("rendering certificate");
    }
    if app.busy.exporting {
        busy.push("exporting");
    }

    let status_text = if busy.is_empty() {
        format!(" {}", hints(app))
    } else {
        format!(" ⏳ {} │ {}", busy.join(", "), hints(app))
    };

    let status = Paragraph::new(status_text)
        .style(Style::default().fg(app.theme.muted))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        );

    f.render_widget(status, area);
}
