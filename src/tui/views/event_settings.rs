// Event settings view - admin event list
//
// Ctrl+N opens the event form empty, e or Enter opens it on the selected
// event, D asks before deleting. The list reloads after each change.

use super::panel;
use crate::tui::app::App;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let block = panel(format!(" Events ({}) ", app.events.len()), app, true);

    if app.events.is_empty() {
        let empty = Paragraph::new("No events yet. Press Ctrl+N to add one.")
            .style(Style::default().fg(app.theme.muted))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let header = Row::new(["Event", "Description", "Registrations"]).style(
        Style::default()
            .fg(app.theme.title)
            .add_modifier(Modifier::BOLD),
    );

    let rows = app.events.iter().map(|event| {
        Row::new(vec![
            Cell::from(event.event_name.clone()),
            Cell::from(event.description.clone().unwrap_or_default()),
            Cell::from(
                event
                    .registration_count
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(30),
            Constraint::Percentage(55),
            Constraint::Percentage(15),
        ],
    )
    .header(header)
    .style(Style::default().fg(app.theme.foreground))
    .row_highlight_style(
        Style::default()
            .bg(app.theme.selected_bg)
            .fg(app.theme.selected_fg),
    )
    .block(block);

    let mut state = TableState::default().with_selected(Some(app.event_cursor));
    f.render_stateful_widget(table, area, &mut state);
}
