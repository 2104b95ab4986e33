// Register view - public event list
//
// The left pane lists events, the right pane describes the one under the
// cursor. Enter opens the registration form with that event preselected.

use super::panel;
use crate::tui::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_event_list(f, chunks[0], app);
    render_event_detail(f, chunks[1], app);
}

fn render_event_list(f: &mut Frame, area: Rect, app: &App) {
    let block = panel(format!(" Events ({}) ", app.events.len()), app, true);

    if app.events.is_empty() {
        let empty = Paragraph::new("Loading events...")
            .style(Style::default().fg(app.theme.muted))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .events
        .iter()
        .map(|event| ListItem::new(format!(" {}", event.event_name)))
        .collect();

    let list = List::new(items)
        .style(Style::default().fg(app.theme.foreground))
        .highlight_style(
            Style::default()
                .bg(app.theme.selected_bg)
                .fg(app.theme.selected_fg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶")
        .block(block);

    let mut state = ListState::default().with_selected(Some(app.event_cursor));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_event_detail(f: &mut Frame, area: Rect, app: &App) {
    let block = panel(" Details ", app, false);
    let Some(event) = app.events.get(app.event_cursor) else {
        f.render_widget(block, area);
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            event.event_name.as_str(),
            Style::default()
                .fg(app.theme.title)
                .add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::from(Span::styled(
            event
                .description
                .as_deref()
                .unwrap_or("No description available."),
            Style::default().fg(app.theme.foreground),
        )),
    ];
    if let Some(count) = event.registration_count {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(
            format!("{} registered", count),
            Style::default().fg(app.theme.muted),
        )));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
        Span::styled("Enter", Style::default().fg(app.theme.highlight)),
        Span::styled(" register for this event", Style::default().fg(app.theme.muted)),
    ]));

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true }).block(block);
    f.render_widget(paragraph, area);
}
