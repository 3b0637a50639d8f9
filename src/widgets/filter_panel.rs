use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::filter::{FilterKind, FilterSpec, FilterValue, FilterValues};

/// Which filter (and which option within a multiselect) has focus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterPanelState {
    pub selected: usize,
    pub option: usize,
}

impl FilterPanelState {
    pub fn next(&mut self, count: usize) {
        if self.selected + 1 < count {
            self.selected += 1;
            self.option = 0;
        }
    }

    pub fn previous(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.option = 0;
        }
    }

    pub fn next_option(&mut self, count: usize) {
        if self.option + 1 < count {
            self.option += 1;
        }
    }

    pub fn previous_option(&mut self) {
        self.option = self.option.saturating_sub(1);
    }
}

/// Side panel listing every filter and its current value.
pub struct FilterPanel<'a> {
    specs: &'a [FilterSpec],
    values: &'a FilterValues,
    search: &'a str,
    state: FilterPanelState,
    active_filters: usize,
    pub border_fg: Color,
    pub active_fg: Color,
    pub dimmed_fg: Color,
}

impl<'a> FilterPanel<'a> {
    pub fn new(
        specs: &'a [FilterSpec],
        values: &'a FilterValues,
        search: &'a str,
        state: FilterPanelState,
    ) -> Self {
        Self {
            specs,
            values,
            search,
            state,
            active_filters: 0,
            border_fg: Color::Yellow,
            active_fg: Color::Cyan,
            dimmed_fg: Color::DarkGray,
        }
    }

    pub fn with_active_count(mut self, active_filters: usize) -> Self {
        self.active_filters = active_filters;
        self
    }

    pub fn with_colors(mut self, border_fg: Color, active_fg: Color, dimmed_fg: Color) -> Self {
        self.border_fg = border_fg;
        self.active_fg = active_fg;
        self.dimmed_fg = dimmed_fg;
        self
    }

    fn summary(&self, spec: &FilterSpec) -> String {
        if spec.kind == FilterKind::Search {
            return if self.search.is_empty() {
                "any".to_string()
            } else {
                format!("\"{}\"", self.search)
            };
        }
        match self.values.get(&spec.id) {
            Some(value) if !value.is_empty() => value.values().join(", "),
            _ => "any".to_string(),
        }
    }

    fn spec_lines(&self, index: usize, spec: &FilterSpec) -> Vec<Line<'static>> {
        let focused = index == self.state.selected;
        let marker = if focused { "▶ " } else { "  " };
        let summary = self.summary(spec);
        let value_style = if summary == "any" {
            Style::default().fg(self.dimmed_fg)
        } else {
            Style::default().fg(self.active_fg)
        };
        let label_style = if focused {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let mut lines = vec![Line::from(vec![
            Span::raw(marker),
            Span::styled(format!("{}: ", spec.label), label_style),
            Span::styled(summary, value_style),
        ])];

        // Expanded option list for the focused multiselect
        if focused && spec.kind == FilterKind::MultiSelect {
            let ticked: Vec<&str> = self
                .values
                .get(&spec.id)
                .map(FilterValue::values)
                .unwrap_or_default();
            for (i, option) in spec.options.iter().enumerate() {
                let check = if ticked.contains(&option.value.as_str()) {
                    "[x]"
                } else {
                    "[ ]"
                };
                let mut style = Style::default();
                if i == self.state.option {
                    style = style.add_modifier(Modifier::REVERSED);
                }
                lines.push(Line::from(vec![
                    Span::raw("    "),
                    Span::styled(format!("{} {}", check, option.label), style),
                ]));
            }
        }
        lines
    }
}

impl Widget for FilterPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = match self.active_filters {
            0 => " Filters ".to_string(),
            n => format!(" Filters ({} active) ", n),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.border_fg))
            .title(title);

        let lines: Vec<Line> = self
            .specs
            .iter()
            .enumerate()
            .flat_map(|(i, spec)| self.spec_lines(i, spec))
            .collect();
        Paragraph::new(lines).block(block).render(area, buf);
    }
}
