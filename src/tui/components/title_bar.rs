// Title bar component
//
// Renders the app name, the active view and a marker while bulk jobs run.

use crate::config::Mode;
use crate::tui::app::App;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the title bar at the top of the screen
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let mode = match app.mode {
        Mode::Public => "",
        Mode::Admin => " [admin]",
    };

    let bulk = match app.bulk.active() {
        0 => String::new(),
        n => format!(" ──── ⟳ {} bulk job{} running", n, if n == 1 { "" } else { "s" }),
    };

    let title_text = format!(" EventTech{} ── {}{}", mode, app.view.title(), bulk);

    let title = Paragraph::new(title_text)
        .style(
            Style::default()
                .fg(app.theme.title)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.title))
                .title_top(Line::from(" ? ").right_aligned()),
        );

    f.render_widget(title, area);
}
