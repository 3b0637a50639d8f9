use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::cell::PLACEHOLDER;
use crate::value::Row;

/// Popup listing every field of one activated row.
pub struct RecordView<'a> {
    row: &'a Row,
    title: String,
    pub border_fg: Color,
    pub key_fg: Color,
}

impl<'a> RecordView<'a> {
    pub fn new(row: &'a Row, title: &str) -> Self {
        Self {
            row,
            title: title.to_string(),
            border_fg: Color::Cyan,
            key_fg: Color::Yellow,
        }
    }

    pub fn with_colors(mut self, border_fg: Color, key_fg: Color) -> Self {
        self.border_fg = border_fg;
        self.key_fg = key_fg;
        self
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let names = self.row.field_names();
        let width = names.iter().map(|n| n.chars().count()).max().unwrap_or(0);
        names
            .into_iter()
            .map(|name| {
                let value = match self.row.get(name) {
                    Some(v) if !v.is_blank() => v.as_text(),
                    _ => PLACEHOLDER.to_string(),
                };
                Line::from(vec![
                    Span::styled(
                        format!("{:>width$}  ", name, width = width),
                        Style::default()
                            .fg(self.key_fg)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(value),
                ])
            })
            .collect()
    }
}

impl Widget for RecordView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.border_fg))
            .title(format!(" {} ", self.title))
            .title_bottom(Line::from(" Esc to close ").right_aligned());
        Paragraph::new(self.lines())
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
