use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::heatmap::{cell_visual, legend, HeatmapMatrix, HeatmapPalette, SizeTier};

const CELL_WIDTH: usize = 12;
const MAX_LABEL_WIDTH: usize = 28;

/// Cursor over the heatmap grid, as (row, column) indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeatmapCursor {
    pub row: usize,
    pub col: usize,
}

impl HeatmapCursor {
    pub fn up(&mut self) {
        self.row = self.row.saturating_sub(1);
    }

    pub fn down(&mut self, rows: usize) {
        if self.row + 1 < rows {
            self.row += 1;
        }
    }

    pub fn left(&mut self) {
        self.col = self.col.saturating_sub(1);
    }

    pub fn right(&mut self, cols: usize) {
        if self.col + 1 < cols {
            self.col += 1;
        }
    }

    /// (sub-process, root cause) labels under the cursor
    pub fn labels<'a>(&self, matrix: &'a HeatmapMatrix) -> Option<(&'a str, &'a str)> {
        Some((
            matrix.rows.get(self.row)?.as_str(),
            matrix.cols.get(self.col)?.as_str(),
        ))
    }
}

pub struct HeatmapView<'a> {
    matrix: &'a HeatmapMatrix,
    palette: &'a HeatmapPalette,
    cursor: HeatmapCursor,
    pub title: String,
    pub show_legend: bool,
    pub border_fg: Color,
    pub dimmed_fg: Color,
}

impl<'a> HeatmapView<'a> {
    pub fn new(matrix: &'a HeatmapMatrix, palette: &'a HeatmapPalette) -> Self {
        Self {
            matrix,
            palette,
            cursor: HeatmapCursor::default(),
            title: "Deviation Heatmap".to_string(),
            show_legend: true,
            border_fg: Color::Cyan,
            dimmed_fg: Color::DarkGray,
        }
    }

    pub fn with_cursor(mut self, cursor: HeatmapCursor) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn with_legend(mut self, show_legend: bool) -> Self {
        self.show_legend = show_legend;
        self
    }

    pub fn with_colors(mut self, border_fg: Color, dimmed_fg: Color) -> Self {
        self.border_fg = border_fg;
        self.dimmed_fg = dimmed_fg;
        self
    }

    fn label_width(&self) -> usize {
        self.matrix
            .rows
            .iter()
            .map(|r| r.chars().count())
            .max()
            .unwrap_or(0)
            .clamp(8, MAX_LABEL_WIDTH)
    }

    fn header_line(&self, label_width: usize) -> Line<'static> {
        let mut spans = vec![Span::raw(" ".repeat(label_width + 1))];
        for col in &self.matrix.cols {
            spans.push(Span::styled(
                pad(&truncate(col, CELL_WIDTH - 1), CELL_WIDTH),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        }
        spans.push(Span::styled(
            "Total",
            Style::default().add_modifier(Modifier::BOLD),
        ));
        Line::from(spans)
    }

    fn row_line(&self, row_idx: usize, label_width: usize) -> Line<'static> {
        let row = &self.matrix.rows[row_idx];
        let mut spans = vec![Span::raw(pad(&truncate(row, label_width), label_width + 1))];
        for (col_idx, col) in self.matrix.cols.iter().enumerate() {
            let cell = self.matrix.cell(row, col);
            let visual = cell_visual(cell.count, cell.severity, self.palette);
            let text = if visual.tier == SizeTier::Empty {
                SizeTier::Empty.glyph().to_string()
            } else {
                format!("{} {}", visual.tier.glyph(), cell.count)
            };
            let mut style = Style::default().fg(visual.fill.unwrap_or(visual.outline));
            if self.cursor.row == row_idx && self.cursor.col == col_idx {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(pad(&text, CELL_WIDTH - 1), style));
            spans.push(Span::raw(" "));
        }
        spans.push(Span::raw(self.matrix.row_total(row).to_string()));
        Line::from(spans)
    }

    fn totals_line(&self, label_width: usize) -> Line<'static> {
        let mut spans = vec![Span::styled(
            pad("Total", label_width + 1),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        let mut grand = 0;
        for col in &self.matrix.cols {
            let total = self.matrix.col_total(col);
            grand += total;
            spans.push(Span::raw(pad(&total.to_string(), CELL_WIDTH)));
        }
        spans.push(Span::raw(grand.to_string()));
        Line::from(spans)
    }

    fn detail_line(&self) -> Line<'static> {
        match self.cursor.labels(self.matrix) {
            Some((row, col)) => {
                let cell = self.matrix.cell(row, col);
                let severity = cell.severity.map(|s| s.as_str()).unwrap_or("no data");
                Line::from(format!("{} × {}: {} ({})", row, col, cell.count, severity))
            }
            None => Line::from(""),
        }
    }

    fn legend_line(&self) -> Line<'static> {
        let mut spans = vec![Span::raw("Legend: ")];
        for entry in legend(self.palette) {
            let tier = SizeTier::from_count(entry.representative_count);
            spans.push(Span::styled(
                tier.glyph().to_string(),
                Style::default().fg(entry.color),
            ));
            spans.push(Span::raw(format!(" {}   ", entry.label)));
        }
        spans.push(Span::styled(
            format!("{} No data", SizeTier::Empty.glyph()),
            Style::default().fg(self.palette.empty),
        ));
        Line::from(spans)
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn pad(s: &str, width: usize) -> String {
    format!("{:<width$}", s, width = width)
}

impl Widget for HeatmapView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.border_fg))
            .title(format!(" {} ", self.title));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.matrix.is_empty() {
            Paragraph::new("No heatmap data")
                .style(Style::default().fg(self.dimmed_fg))
                .centered()
                .render(inner, buf);
            return;
        }

        let footer_height = if self.show_legend { 3 } else { 2 };
        let [grid_area, footer_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(footer_height)])
                .areas(inner);

        let label_width = self.label_width();
        let mut lines = vec![self.header_line(label_width)];
        lines.extend((0..self.matrix.rows.len()).map(|i| self.row_line(i, label_width)));
        lines.push(self.totals_line(label_width));
        Paragraph::new(lines).render(grid_area, buf);

        let mut footer = vec![Line::from(""), self.detail_line()];
        if self.show_legend {
            footer.push(self.legend_line());
        }
        Paragraph::new(footer).render(footer_area, buf);
    }
}
