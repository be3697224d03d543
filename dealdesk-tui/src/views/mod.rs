//! View rendering dispatch.

pub mod list;

use crate::app::{pending_delete_label, App};
use crate::keys::HELP_LINES;
use crate::nav::Screen;
use crate::notifications::NotificationLevel;
use crate::widgets::{centered_rect, Modal};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render_view(f: &mut Frame<'_>, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    render_header(f, app, layout[0]);

    let scope = app.active_scope().map(|scope| scope.label.as_str());
    let title = app.active_screen.title();
    match app.active_screen {
        Screen::Leads => list::render(f, &app.theme, title, scope, &app.leads, layout[1]),
        Screen::Interactions => {
            list::render(f, &app.theme, title, scope, &app.interactions, layout[1])
        }
        Screen::Comments => list::render(f, &app.theme, title, scope, &app.comments, layout[1]),
    }

    render_footer(f, app, layout[2]);

    if let Some(label) = pending_delete_label(app) {
        render_delete_confirm(f, app, &label);
    } else if app.help_visible {
        render_help(f, app);
    }
}

fn render_header(f: &mut Frame<'_>, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        " DEALDESK ",
        Style::default()
            .fg(app.theme.bg)
            .bg(app.theme.primary)
            .add_modifier(Modifier::BOLD),
    )];
    for (index, screen) in Screen::all().iter().enumerate() {
        let style = if *screen == app.active_screen {
            Style::default()
                .fg(app.theme.primary)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(app.theme.text_dim)
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!("{} {}", index + 1, screen.title()), style));
    }
    let title = format!("Org: {}", app.config.organization_id);
    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border))
            .title(Span::styled(title, Style::default().fg(app.theme.text_dim))),
    );
    f.render_widget(header, area);
}

fn render_footer(f: &mut Frame<'_>, app: &App, area: Rect) {
    let help = "j/k move • h/l page • [/] partition • / search • c/s sort • u unassigned • d delete • ? help • q quit";
    let (text, style) = if let Some(search) = &app.search {
        (
            format!("Search: {}_", search.buffer),
            Style::default().fg(app.theme.primary),
        )
    } else if let Some(note) = app.notifications.last() {
        let color = match note.level {
            NotificationLevel::Info => app.theme.info,
            NotificationLevel::Warning => app.theme.warning,
            NotificationLevel::Error => app.theme.error,
            NotificationLevel::Success => app.theme.success,
        };
        let text = match (note.hint(), note.screen) {
            (Some(hint), Some(screen)) if screen != app.active_screen => {
                format!("{}: {} ({} on {})", note.label(), note.message, hint, screen.title())
            }
            (Some(hint), _) => format!("{}: {} ({})", note.label(), note.message, hint),
            (None, _) => format!("{}: {}", note.label(), note.message),
        };
        (text, Style::default().fg(color))
    } else {
        (help.to_string(), Style::default().fg(app.theme.text_dim))
    };
    let footer = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .style(style);
    f.render_widget(footer, area);
}

fn render_help(f: &mut Frame<'_>, app: &App) {
    let lines: Vec<Line> = HELP_LINES.iter().map(|line| Line::raw(*line)).collect();
    let height = u16::try_from(lines.len()).unwrap_or(u16::MAX).saturating_add(2);
    let area = centered_rect(60, height, f.size());
    Modal {
        title: "Keybindings",
        lines,
        border_style: Style::default().fg(app.theme.primary),
    }
    .render(f, area);
}

fn render_delete_confirm(f: &mut Frame<'_>, app: &App, label: &str) {
    let in_flight = match app.active_screen {
        Screen::Leads => app.leads.snapshot().delete_in_flight,
        Screen::Interactions => app.interactions.snapshot().delete_in_flight,
        Screen::Comments => app.comments.snapshot().delete_in_flight,
    };
    let prompt = if in_flight {
        Line::styled("Deleting...", Style::default().fg(app.theme.warning))
    } else {
        Line::styled("y confirm • n cancel", Style::default().fg(app.theme.text_dim))
    };
    let lines = vec![Line::raw(format!("Delete \"{}\"?", label)), Line::raw(""), prompt];
    let area = centered_rect(50, 5, f.size());
    Modal {
        title: "Confirm delete",
        lines,
        border_style: Style::default().fg(app.theme.error),
    }
    .render(f, area);
}
