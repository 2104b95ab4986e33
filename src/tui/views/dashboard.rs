// Dashboard view - admin participants management
//
// Layout, top to bottom:
// - Statistics cards (registrations, winners, busiest events)
// - Filter bar with the live search input
// - Participants table with selection checkboxes and sort indicators
// - Pagination footer

use super::panel;
use crate::api::Statistics;
use crate::tui::app::{App, SortColumn};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    render_statistics(f, chunks[0], app);
    render_filters(f, chunks[1], app);
    render_table(f, chunks[2], app);
    render_pagination(f, chunks[3], app);
}

fn render_statistics(f: &mut Frame, area: Rect, app: &App) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(50),
        ])
        .split(area);

    let value_style = Style::default()
        .fg(app.theme.highlight)
        .add_modifier(Modifier::BOLD);

    let (registrations, winners, events) = match &app.statistics {
        Some(stats) => (
            stats.total_registrations.to_string(),
            stats.total_winners.to_string(),
            top_events(stats, 2),
        ),
        None => ("-".to_string(), "-".to_string(), "-".to_string()),
    };

    f.render_widget(
        Paragraph::new(Span::styled(registrations, value_style))
            .block(panel(" Registrations ", app, false)),
        cards[0],
    );
    f.render_widget(
        Paragraph::new(Span::styled(winners, value_style)).block(panel(" Winners ", app, false)),
        cards[1],
    );
    f.render_widget(
        Paragraph::new(Span::styled(events, Style::default().fg(app.theme.foreground)))
            .block(panel(" By Event ", app, false)),
        cards[2],
    );
}

/// "Hack Night 12 · AI Day 7" for the busiest events
fn top_events(stats: &Statistics, n: usize) -> String {
    let mut events: Vec<_> = stats.event_registrations.iter().collect();
    events.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    let parts: Vec<String> = events
        .into_iter()
        .take(n)
        .map(|(name, count)| format!("{name} {count}"))
        .collect();
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(" · ")
    }
}

fn render_filters(f: &mut Frame, area: Rect, app: &App) {
    let label = Style::default().fg(app.theme.muted);
    let value = Style::default().fg(app.theme.foreground);
    let or_all = |v: &str| {
        if v.is_empty() {
            "all".to_string()
        } else {
            v.to_string()
        }
    };

    let search = if app.search_editing {
        format!("{}▏", app.search_input)
    } else {
        or_all(&app.search_input)
    };

    let line = Line::from(vec![
        Span::styled(" event: ", label),
        Span::styled(or_all(&app.filters.event), value),
        Span::styled("   status: ", label),
        Span::styled(or_all(&app.filters.status), value),
        Span::styled("   search: ", label),
        Span::styled(
            search,
            if app.search_editing {
                value.fg(app.theme.highlight)
            } else {
                value
            },
        ),
        Span::styled(
            format!("   sort: {}", sort_label(app.sort, app.sort_ascending)),
            label,
        ),
    ]);

    let title = if app.filters.is_empty() {
        " Filters "
    } else {
        " Filters ── c: clear "
    };
    let paragraph = Paragraph::new(line).block(panel(title, app, app.search_editing));
    f.render_widget(paragraph, area);
}

fn sort_label(column: SortColumn, ascending: bool) -> String {
    match column {
        SortColumn::None => "none".to_string(),
        c => format!("{} {}", c.label(), if ascending { "↑" } else { "↓" }),
    }
}

/// Header text with ↑/↓ on the sorted column and ↕ on the others
fn header_cell(title: &str, column: SortColumn, app: &App) -> String {
    let indicator = if app.sort == column {
        if app.sort_ascending {
            "↑"
        } else {
            "↓"
        }
    } else {
        "↕"
    };
    format!("{title} {indicator}")
}

fn render_table(f: &mut Frame, area: Rect, app: &App) {
    let title = if app.selection.is_empty() {
        " Participants ".to_string()
    } else {
        format!(" Participants ── {} selected ", app.selection.len())
    };
    let block = panel(title, app, true);

    if app.participants.is_empty() {
        let empty = Paragraph::new("No participants found.")
            .style(Style::default().fg(app.theme.muted))
            .block(block);
        f.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from(" "),
        Cell::from(header_cell("Name", SortColumn::Name, app)),
        Cell::from(header_cell("Email", SortColumn::Email, app)),
        Cell::from(header_cell("College", SortColumn::College, app)),
        Cell::from(header_cell("Event", SortColumn::Event, app)),
        Cell::from(header_cell("Registered", SortColumn::Date, app)),
        Cell::from("Status"),
    ])
    .style(
        Style::default()
            .fg(app.theme.title)
            .add_modifier(Modifier::BOLD),
    );

    let rows = app.sorted_participants().into_iter().map(|p| {
        let check = if app.is_selected(p.id) { "[x]" } else { "[ ]" };
        let status = if p.winner_status {
            Cell::from("🏆 Winner").style(Style::default().fg(app.theme.warning))
        } else {
            Cell::from("Participant").style(Style::default().fg(app.theme.muted))
        };
        Row::new(vec![
            Cell::from(check),
            Cell::from(p.name.clone()),
            Cell::from(p.email.clone()),
            Cell::from(p.college.clone()),
            Cell::from(p.event.clone()),
            Cell::from(p.registration_date_text()),
            status,
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Percentage(18),
            Constraint::Percentage(24),
            Constraint::Percentage(18),
            Constraint::Percentage(15),
            Constraint::Percentage(13),
            Constraint::Percentage(12),
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

    let mut state = TableState::default().with_selected(Some(app.cursor));
    f.render_stateful_widget(table, area, &mut state);
}

fn render_pagination(f: &mut Frame, area: Rect, app: &App) {
    let p = &app.pagination;
    let total_pages = p.total_pages.max(1);
    let text = format!(
        " Page {} of {} ({} total){}{}",
        app.page,
        total_pages,
        p.total_count,
        if p.has_previous || app.page > 1 { "  ◀ p" } else { "" },
        if p.has_next { "  n ▶" } else { "" },
    );
    f.render_widget(
        Paragraph::new(text).style(Style::default().fg(app.theme.muted)),
        area,
    );
}
