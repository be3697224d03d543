//! Generic partitioned list screen: tabs, table, detail panel and pager.

use crate::session::ListSession;
use crate::theme::{load_status_color, SynthBruteTheme};
use crate::traits::TableRow;
use crate::widgets::{DetailPanel, FilterBar, FilterOption};
use dealdesk_core::{LoadStatus, PartitionKey, PartitionSnapshot, Snapshot, SortDirection};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

pub fn render<R, P, M>(
    f: &mut Frame<'_>,
    theme: &SynthBruteTheme,
    title: &str,
    scope: Option<&str>,
    session: &ListSession<R, P, M>,
    area: Rect,
) where
    R: TableRow,
    P: PartitionKey,
    M: Send + 'static,
{
    let snapshot = session.snapshot();
    let active = snapshot.active();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let filters = partition_tabs(&snapshot);
    let bar_title = match scope {
        Some(label) => format!("{} of {}", title, label),
        None => title.to_string(),
    };
    FilterBar {
        title: &bar_title,
        filters: &filters,
        summary: filter_summary(&snapshot),
        active_style: Style::default()
            .fg(theme.bg)
            .bg(theme.primary)
            .add_modifier(Modifier::BOLD),
        inactive_style: Style::default().fg(theme.text_dim),
    }
    .render(f, rows[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(rows[1]);

    let selected = session.selected_index(&active.records);
    render_table(f, theme, session.sort_cursor(), &snapshot, selected, body[0]);

    let fields = selected
        .and_then(|index| active.records.get(index))
        .map(|record| record.details())
        .unwrap_or_default();
    DetailPanel {
        title: "Details",
        fields,
        label_style: Style::default().fg(theme.secondary),
        empty_style: Style::default().fg(theme.text_dim),
    }
    .render(f, body[1]);

    f.render_widget(Paragraph::new(pager_line(theme, active)), rows[2]);
}

fn partition_tabs<R: TableRow, P: PartitionKey>(snapshot: &Snapshot<R, P>) -> Vec<FilterOption> {
    snapshot
        .partitions
        .iter()
        .map(|partition| FilterOption {
            label: format!("{} ({})", partition.label.title(), partition.total_count),
            active: partition.label == snapshot.active_partition,
        })
        .collect()
}

fn filter_summary<R: TableRow, P>(snapshot: &Snapshot<R, P>) -> Option<String> {
    let mut parts = Vec::new();
    if !snapshot.search_text.trim().is_empty() {
        parts.push(format!("search: {}", snapshot.search_text.trim()));
    }
    if snapshot.unassigned_only {
        parts.push("unassigned only".to_string());
    }
    (!parts.is_empty()).then(|| parts.join(" | "))
}

fn render_table<R: TableRow, P: PartitionKey>(
    f: &mut Frame<'_>,
    theme: &SynthBruteTheme,
    sort_cursor: usize,
    snapshot: &Snapshot<R, P>,
    selected: Option<usize>,
    area: Rect,
) {
    let active = snapshot.active();
    let columns = R::columns();

    let header = Row::new(columns.iter().enumerate().map(|(index, column)| {
        let mut text = column.title.to_string();
        if snapshot.sort_key.as_deref() == Some(column.field) {
            text.push_str(match snapshot.sort_direction {
                Some(SortDirection::Desc) => " v",
                _ => " ^",
            });
        }
        let mut style = Style::default().fg(theme.primary).add_modifier(Modifier::BOLD);
        if index == sort_cursor {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        Cell::from(text).style(style)
    }));

    let rows: Vec<Row> = active
        .records
        .iter()
        .map(|record| {
            let accent = record.accent(theme).unwrap_or(theme.text);
            Row::new(record.cells()).style(Style::default().fg(accent))
        })
        .collect();

    let widths: Vec<Constraint> = columns
        .iter()
        .map(|column| Constraint::Percentage(column.width))
        .collect();

    let block = Block::default()
        .title(table_title(theme, active))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border_focus));

    if rows.is_empty() {
        let message = match active.status {
            LoadStatus::Idle | LoadStatus::Loading => "Loading...",
            LoadStatus::Errored => "Failed to load. Press r to retry.",
            LoadStatus::Loaded if snapshot.unassigned_only => "No unassigned records on this page",
            LoadStatus::Loaded => "No records",
        };
        let placeholder = Paragraph::new(message)
            .style(Style::default().fg(theme.text_dim))
            .block(block);
        f.render_widget(placeholder, area);
        return;
    }

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .highlight_style(Style::default().bg(theme.bg_highlight).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    let mut state = TableState::default();
    state.select(selected);
    f.render_stateful_widget(table, area, &mut state);
}

fn table_title<'a, R, P>(theme: &SynthBruteTheme, partition: &PartitionSnapshot<R, P>) -> Line<'a> {
    let status = if partition.is_loading {
        "loading"
    } else {
        match partition.status {
            LoadStatus::Idle => "idle",
            LoadStatus::Loading => "loading",
            LoadStatus::Loaded => "ok",
            LoadStatus::Errored => "error",
        }
    };
    let color = if partition.is_loading {
        theme.warning
    } else {
        load_status_color(partition.status, theme)
    };
    Line::from(vec![
        Span::raw(" Records "),
        Span::styled(format!("[{}] ", status), Style::default().fg(color)),
    ])
}

fn pager_line<'a, R, P>(theme: &SynthBruteTheme, partition: &PartitionSnapshot<R, P>) -> Line<'a> {
    Line::from(vec![
        Span::styled(
            format!(" Page {}/{}", partition.page, partition.total_pages),
            Style::default().fg(theme.primary),
        ),
        Span::styled(
            format!(
                " | {} records | {} per page | showing {}",
                partition.total_count,
                partition.page_size,
                partition.records.len()
            ),
            Style::default().fg(theme.text_dim),
        ),
    ])
}
