// Modal overlay rendering
//
// Modals are rendered on top of the main content:
// - Registration / Event: form fields with inline validation messages
// - Certificate: preview of the certificate with download and copy keys
// - Confirmation: winner selection prompts
// - Help: keyboard shortcuts
//
// A modal that is still fading in or already closing is drawn dimmed.

use crate::certificate::{CertificateKind, LineRole};
use crate::tui::app::App;
use crate::tui::modal::{ModalKind, ModalPhase};
use crate::validation::Form;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Render a modal dialog as a centered overlay. Returns the area it covers.
pub fn render(f: &mut Frame, kind: ModalKind, phase: ModalPhase, app: &App) -> Rect {
    let dim = !matches!(phase, ModalPhase::Open);
    match kind {
        ModalKind::Registration => {
            render_form(f, app, &app.registration, " Register for Event ", dim)
        }
        ModalKind::EventForm => {
            let title = if app.editing_event.is_some() {
                " Edit Event "
            } else {
                " Add New Event "
            };
            render_form(f, app, &app.event_form, title, dim)
        }
        ModalKind::Certificate => render_certificate(f, app, dim),
        ModalKind::Confirmation => render_confirmation(f, app, dim),
        ModalKind::Help => render_help(f, app, dim),
    }
}

/// Calculate centered rect for modal dialog
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

fn frame_block<'a>(title: &'a str, hint: &'a str, color: Color, app: &App, dim: bool) -> Block<'a> {
    let mut style = Style::default().bg(app.theme.background);
    if dim {
        style = style.add_modifier(Modifier::DIM);
    }
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .border_type(app.theme.border_type)
        .style(style)
        .title(title)
        .title_bottom(Line::from(hint).centered())
}

fn render_form(f: &mut Frame, app: &App, form: &Form, title: &str, dim: bool) -> Rect {
    let label_style = Style::default().fg(app.theme.muted);
    let value_style = Style::default().fg(app.theme.foreground);
    let error_style = Style::default().fg(app.theme.error);

    let mut lines = vec![Line::raw("")];
    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        lines.push(Line::from(Span::styled(
            format!("  {}", field.label),
            if focused {
                label_style.fg(app.theme.highlight).add_modifier(Modifier::BOLD)
            } else {
                label_style
            },
        )));

        let shown = if field.is_choice() {
            let current = if field.value.is_empty() {
                "Select an event"
            } else {
                field.value.as_str()
            };
            format!("◀ {current} ▶")
        } else if focused {
            format!("{}▏", field.value)
        } else {
            field.value.clone()
        };
        let marker = if field.is_marked() { "✕" } else { "›" };
        let marker_style = if field.is_marked() {
            error_style
        } else {
            label_style
        };
        lines.push(Line::from(vec![
            Span::styled(format!("  {marker} "), marker_style),
            Span::styled(shown, value_style),
        ]));

        if let Some(message) = field.error() {
            lines.push(Line::from(Span::styled(format!("    {message}"), error_style)));
        } else {
            lines.push(Line::raw(""));
        }
    }

    let height = lines.len() as u16 + 2;
    let area = centered_rect(64, height, f.area());
    f.render_widget(Clear, area);

    let paragraph = Paragraph::new(Text::from(lines)).block(frame_block(
        title,
        " Tab: next field  ←/→: choose  Enter: submit  Esc: close ",
        app.theme.highlight,
        app,
        dim,
    ));
    f.render_widget(paragraph, area);
    area
}

fn render_certificate(f: &mut Frame, app: &App, dim: bool) -> Rect {
    let area = centered_rect(72, 22, f.area());
    f.render_widget(Clear, area);

    let Some(cert) = &app.certificate else {
        return area;
    };
    let view = &cert.view;
    let accent = match view.kind {
        CertificateKind::Winner => app.theme.winner_accent,
        CertificateKind::Participant => app.theme.participant_accent,
    };

    let mut lines = vec![Line::raw("")];
    for (role, text) in view.body() {
        let style = match role {
            LineRole::Title => Style::default().fg(accent).add_modifier(Modifier::BOLD),
            LineRole::Subtitle => Style::default().fg(app.theme.muted),
            LineRole::Body => Style::default().fg(app.theme.foreground),
            LineRole::Name => Style::default()
                .fg(app.theme.foreground)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            LineRole::Event => Style::default().fg(accent).add_modifier(Modifier::BOLD),
        };
        lines.push(Line::from(Span::styled(text, style)).centered());
        lines.push(Line::raw(""));
    }

    let footer = Style::default().fg(app.theme.muted);
    let inner_width = area.width.saturating_sub(2) as usize;
    let left = format!(" ID: {}", view.certificate_id);
    let right = format!("{} ", view.issue_date);
    let middle = "Event Organizer";
    let used = left.chars().count() + right.chars().count() + middle.len();
    let gap = inner_width.saturating_sub(used);
    let pad_left = gap / 2;
    lines.push(Line::from(vec![
        Span::styled(left, footer),
        Span::raw(" ".repeat(pad_left)),
        Span::styled(middle, footer.add_modifier(Modifier::ITALIC)),
        Span::raw(" ".repeat(gap - pad_left)),
        Span::styled(right, footer),
    ]));

    let hint = if app.busy.downloading {
        " Generating certificate... "
    } else {
        " d: download  y: copy ID  Esc: close "
    };
    let paragraph = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: false })
        .block(frame_block(" Certificate ", hint, accent, app, dim));
    f.render_widget(paragraph, area);
    area
}

fn render_confirmation(f: &mut Frame, app: &App, dim: bool) -> Rect {
    let area = centered_rect(60, 11, f.area());
    f.render_widget(Clear, area);

    let Some(confirmation) = &app.confirmation else {
        return area;
    };

    let mut lines = vec![
        Line::raw(""),
        Line::from(Span::styled(
            confirmation.message.as_str(),
            Style::default().fg(app.theme.foreground),
        ))
        .centered(),
    ];
    if let Some(warning) = &confirmation.warning {
        lines.push(Line::raw(""));
        lines.push(
            Line::from(Span::styled(
                format!("⚠ {warning}"),
                Style::default().fg(app.theme.warning),
            ))
            .centered(),
        );
    }

    let paragraph = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: true })
        .block(frame_block(
            confirmation.title.as_str(),
            " y/Enter: confirm  n/Esc: cancel ",
            app.theme.warning,
            app,
            dim,
        ));
    f.render_widget(paragraph, area);
    area
}

/// Render the help modal overlay
fn render_help(f: &mut Frame, app: &App, dim: bool) -> Rect {
    let key_style = Style::default().fg(app.theme.highlight);
    let desc_style = Style::default().fg(app.theme.foreground);
    let header_style = Style::default()
        .fg(app.theme.title)
        .add_modifier(Modifier::BOLD);

    // Helper to create a keybind line: "    key         description"
    let kb = |key: &str, desc: &str| -> Line {
        Line::from(vec![
            Span::raw("    "),
            Span::styled(format!("{:<12}", key), key_style),
            Span::styled(desc.to_string(), desc_style),
        ])
    };

    let mut lines = vec![
        Line::raw(""),
        Line::from(Span::styled("  Registration", header_style)),
        kb("↑/↓, j/k", "Choose event"),
        kb("Enter", "Register for event"),
        kb("r", "Open a blank form"),
        Line::raw(""),
        Line::from(Span::styled("  Forms", header_style)),
        kb("Tab", "Next field"),
        kb("←/→", "Cycle event choice"),
        kb("Enter", "Submit"),
        Line::raw(""),
        Line::from(Span::styled("  Certificate", header_style)),
        kb("d", "Download as JPEG"),
        kb("y", "Copy certificate ID"),
    ];

    if app.mode == crate::config::Mode::Admin {
        lines.extend([
            Line::raw(""),
            Line::from(Span::styled("  Dashboard", header_style)),
            kb("Space / a", "Select row / page"),
            kb("w / b", "Winner / bulk winners"),
            kb("u", "Revoke winner"),
            kb("D", "Delete participant"),
            kb("v", "View certificate"),
            kb("e/E, s/S", "Cycle event / status"),
            kb("/ , c", "Search / clear filters"),
            kb("o / O", "Sort column / direction"),
            kb("n / p", "Next / previous page"),
            kb("Ctrl+R", "Refresh dashboard"),
            kb("Ctrl+E", "Export CSV"),
            kb("Ctrl+N", "Add event (events view)"),
            kb("e / D", "Edit / delete event"),
            kb("Tab", "Dashboard / events"),
        ]);
    }

    lines.extend([
        Line::raw(""),
        Line::from(Span::styled("  General", header_style)),
        kb("Esc", "Close all dialogs"),
        kb("x", "Dismiss newest toast"),
        kb("t", "Cycle theme"),
        kb("L", "Toggle logs"),
        kb("?", "Toggle this help"),
        kb("q", "Quit"),
        Line::raw(""),
        Line::from(vec![
            Span::styled("  Theme: ", desc_style),
            Span::styled(app.theme.name, key_style),
        ]),
    ]);

    let height = lines.len() as u16 + 2;
    let area = centered_rect(48, height, f.area());
    f.render_widget(Clear, area);

    let paragraph = Paragraph::new(Text::from(lines)).block(frame_block(
        " Help ",
        " Press ? or Esc to close ",
        app.theme.highlight,
        app,
        dim,
    ));
    f.render_widget(paragraph, area);
    area
}
