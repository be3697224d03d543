//! Centered overlay dialogs.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub struct Modal<'a> {
    pub title: &'a str,
    pub lines: Vec<Line<'a>>,
    pub border_style: Style,
}

impl<'a> Modal<'a> {
    pub fn render(self, f: &mut Frame<'_>, area: Rect) {
        f.render_widget(Clear, area);
        let widget = Paragraph::new(self.lines)
            .block(
                Block::default()
                    .title(self.title)
                    .borders(Borders::ALL)
                    .border_style(self.border_style),
            )
            .wrap(Wrap { trim: false });
        f.render_widget(widget, area);
    }
}

/// A rectangle of `percent_x` by `height` rows centered in `area`.
pub fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let height = height.min(area.height);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);
    let percent_x = percent_x.min(100);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fits_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect(60, 10, area);
        assert_eq!(rect.height, 10);
        assert_eq!(rect.y, 15);
        assert!(rect.x >= 19 && rect.right() <= 81);
    }

    #[test]
    fn test_centered_rect_clamps_height() {
        let area = Rect::new(0, 0, 80, 6);
        let rect = centered_rect(50, 20, area);
        assert_eq!(rect.height, 6);
    }
}
