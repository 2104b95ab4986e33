// Views module - screen-level rendering logic
//
// Each view is a full-screen experience within the TUI:
// - Register: Public event list, opens the registration form
// - Dashboard: Admin statistics, filters and the participants table
// - Event Settings: Admin event list
// - Signed Out: Terminal screen after the admin session expired
//
// This module dispatches to the appropriate view based on app state, then
// layers modals and toasts on top.

mod dashboard;
mod event_settings;
mod modal;
mod register;

use super::app::{App, View};
use crate::tui::components;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

/// Height of the logs panel when shown
const LOGS_HEIGHT: u16 = 10;

/// Main UI render function - called on every frame
pub fn draw(f: &mut Frame, app: &mut App) {
    let bg_block = Block::default().style(Style::default().bg(app.theme.background));
    f.render_widget(bg_block, f.area());

    let mut constraints = vec![Constraint::Length(3), Constraint::Min(10)];
    if app.show_logs {
        constraints.push(Constraint::Length(LOGS_HEIGHT));
    }
    constraints.push(Constraint::Length(3));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    components::render_title(f, chunks[0], app);
    let content = chunks[1];
    if app.show_logs {
        components::render_logs_panel(f, chunks[2], app);
    }
    components::render_status(f, chunks[chunks.len() - 1], app);

    match app.view {
        View::Register => register::render(f, content, app),
        View::Dashboard => dashboard::render(f, content, app),
        View::EventSettings => event_settings::render(f, content, app),
        View::SignedOut => render_signed_out(f, content, app),
    }

    // Bottom-most first so the newest modal ends up on top
    let visible: Vec<_> = app.modals.visible().collect();
    for (kind, phase) in visible {
        let area = modal::render(f, kind, phase, app);
        app.modals.set_area(kind, area);
    }

    if !app.toasts.is_empty() {
        app.toasts.render(f, f.area(), &app.theme);
    }
}

fn render_signed_out(f: &mut Frame, area: Rect, app: &App) {
    let text = vec![
        Line::raw(""),
        Line::from(Span::styled(
            "Your admin session has expired.",
            Style::default()
                .fg(app.theme.warning)
                .add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::from(Span::styled(
            "Sign in again through the web login, then restart eventdesk with the new session cookie.",
            Style::default().fg(app.theme.foreground),
        )),
        Line::raw(""),
        Line::from(Span::styled(
            "Press q to quit.",
            Style::default().fg(app.theme.muted),
        )),
    ];

    let paragraph = Paragraph::new(text)
        .centered()
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border))
                .title(" Signed Out "),
        );
    f.render_widget(paragraph, area);
}

/// Block used by every content panel
pub(super) fn panel<'a>(title: impl Into<Line<'a>>, app: &App, focused: bool) -> Block<'a> {
    let color = if focused {
        app.theme.highlight
    } else {
        app.theme.border
    };
    Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(color))
        .title(title)
}
