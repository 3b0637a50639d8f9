use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Padding, Paragraph, Row, StatefulWidget, Table, TableState, Widget,
    },
};

use crate::cell::{Align, RenderedCell};
use crate::drilldown::{RenderedTable, TableBody};

/// Draws a [`RenderedTable`] as a bordered table, or its empty state.
pub struct TableView<'a> {
    table: &'a RenderedTable,
    pub header_fg: Color,
    pub border_fg: Color,
    pub dimmed_fg: Color,
    /// `Color::Reset` selects with the reversed modifier
    pub selected_bg: Color,
}

impl<'a> TableView<'a> {
    pub fn new(table: &'a RenderedTable) -> Self {
        Self {
            table,
            header_fg: Color::White,
            border_fg: Color::Cyan,
            dimmed_fg: Color::DarkGray,
            selected_bg: Color::Reset,
        }
    }

    pub fn with_colors(
        mut self,
        header_fg: Color,
        border_fg: Color,
        dimmed_fg: Color,
        selected_bg: Color,
    ) -> Self {
        self.header_fg = header_fg;
        self.border_fg = border_fg;
        self.dimmed_fg = dimmed_fg;
        self.selected_bg = selected_bg;
        self
    }

    fn block(&self) -> Block<'a> {
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.border_fg))
            .title(Line::from(format!(" {} ", self.table.title)).bold());
        if let Some(subtitle) = &self.table.subtitle {
            block = block.title_bottom(Line::from(format!(" {} ", subtitle)).right_aligned());
        }
        block
    }

    fn cell(&self, cell: &'a RenderedCell, align: Align) -> Cell<'a> {
        let style = match (cell.placeholder, cell.color) {
            (true, _) => Style::default().fg(self.dimmed_fg),
            (false, Some(color)) => Style::default().fg(color).add_modifier(Modifier::BOLD),
            (false, None) => Style::default(),
        };
        Cell::from(Line::from(Span::styled(cell.text.as_str(), style)).alignment(alignment(align)))
    }

    fn selected_style(&self) -> Style {
        if self.selected_bg == Color::Reset {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default().bg(self.selected_bg)
        }
    }
}

fn alignment(align: Align) -> Alignment {
    match align {
        Align::Left => Alignment::Left,
        Align::Center => Alignment::Center,
        Align::Right => Alignment::Right,
    }
}

impl StatefulWidget for TableView<'_> {
    type State = TableState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let block = self.block();
        let table = self.table;

        let rows = match &table.body {
            TableBody::Empty {
                message,
                description,
            } => {
                let inner = block.inner(area);
                block.render(area, buf);
                let lines = vec![
                    Line::from(message.as_str()).bold(),
                    Line::from(""),
                    Line::from(description.as_str()).style(Style::default().fg(self.dimmed_fg)),
                ];
                Paragraph::new(lines)
                    .centered()
                    .block(Block::default().padding(Padding::top(inner.height.saturating_sub(3) / 2)))
                    .render(inner, buf);
                return;
            }
            TableBody::Rows(rows) => rows,
        };

        let headers = &table.headers;
        let widths: Vec<Constraint> = headers
            .iter()
            .map(|h| match h.width {
                Some(w) => Constraint::Length(w),
                None => Constraint::Fill(1),
            })
            .collect();

        let header = Row::new(headers.iter().map(|h| {
            Cell::from(Line::from(h.header.as_str()).alignment(alignment(h.align)))
        }))
        .style(
            Style::default()
                .fg(self.header_fg)
                .add_modifier(Modifier::BOLD),
        );

        let body: Vec<Row> = rows
            .iter()
            .map(|cells| {
                Row::new(
                    cells
                        .iter()
                        .zip(headers.iter())
                        .map(|(cell, h)| self.cell(cell, h.align)),
                )
            })
            .collect();

        if let Some(selected) = state.selected() {
            if selected >= body.len() {
                state.select(Some(body.len().saturating_sub(1)));
            }
        }

        let selected_style = self.selected_style();
        let widget = Table::new(body, widths)
            .header(header)
            .block(block)
            .column_spacing(1)
            .row_highlight_style(selected_style);
        StatefulWidget::render(widget, area, buf, state);
    }
}

/// Centered popup area of the given percentage size.
pub fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drilldown::HeaderCell;

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        (area.y..area.bottom())
            .map(|y| {
                (area.x..area.right())
                    .map(|x| buf[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn header(key: &str) -> HeaderCell {
        HeaderCell {
            key: key.to_string(),
            header: key.to_uppercase(),
            align: Align::Left,
            width: None,
        }
    }

    #[test]
    fn test_renders_rows_and_subtitle() {
        let table = RenderedTable {
            title: "Tickets".to_string(),
            subtitle: Some("1 of 3 items shown".to_string()),
            headers: vec![header("id"), header("severity")],
            body: TableBody::Rows(vec![vec![
                RenderedCell {
                    text: "T1".to_string(),
                    color: None,
                    placeholder: false,
                },
                RenderedCell {
                    text: "High".to_string(),
                    color: Some(Color::Red),
                    placeholder: false,
                },
            ]]),
        };
        let area = Rect::new(0, 0, 40, 6);
        let mut buf = Buffer::empty(area);
        let mut state = TableState::default().with_selected(Some(0));
        TableView::new(&table).render(area, &mut buf, &mut state);
        let text = buffer_text(&buf);
        assert!(text.contains("Tickets"));
        assert!(text.contains("SEVERITY"));
        assert!(text.contains("T1"));
        assert!(text.contains("1 of 3 items shown"));
    }

    #[test]
    fn test_renders_empty_state() {
        let table = RenderedTable {
            title: "Tickets".to_string(),
            subtitle: None,
            headers: vec![header("id")],
            body: TableBody::Empty {
                message: "No deviations found".to_string(),
                description: "Adjust the filters".to_string(),
            },
        };
        let area = Rect::new(0, 0, 40, 10);
        let mut buf = Buffer::empty(area);
        let mut state = TableState::default();
        TableView::new(&table).render(area, &mut buf, &mut state);
        let text = buffer_text(&buf);
        assert!(text.contains("No deviations found"));
        assert!(text.contains("Adjust the filters"));
        assert!(!text.contains("ID"));
    }

    #[test]
    fn test_popup_area_is_centered() {
        let area = popup_area(Rect::new(0, 0, 100, 50), 50, 50);
        assert_eq!((area.x, area.width, area.height), (25, 50, 25));
    }
}
