use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    widgets::{Paragraph, Widget},
};

pub const TABLE_CONTROLS: [(&str, &str); 6] = [
    ("Tab", "Heatmap"),
    ("/", "Search"),
    ("f", "Filters"),
    ("Enter", "Open"),
    ("c", "Clear"),
    ("q", "Quit"),
];

pub const HEATMAP_CONTROLS: [(&str, &str); 4] = [
    ("Tab", "Deviations"),
    ("←↑↓→", "Move"),
    ("Enter", "Drill down"),
    ("q", "Quit"),
];

pub const FILTER_CONTROLS: [(&str, &str); 5] = [
    ("↑↓", "Choose"),
    ("←→", "Cycle"),
    ("Space", "Toggle"),
    ("c", "Clear"),
    ("Esc", "Close"),
];

pub const SEARCH_CONTROLS: [(&str, &str); 2] = [("Enter", "Apply"), ("Esc", "Cancel")];

/// Key hints plus a "shown of total" counter.
pub struct Controls<'a> {
    pub hints: &'a [(&'a str, &'a str)],
    pub shown: Option<(usize, usize)>,
    pub active_filters: usize,
    pub dimmed: bool,
    pub key_color: Color,
    pub bg_color: Color,
}

impl<'a> Controls<'a> {
    pub fn new(hints: &'a [(&'a str, &'a str)]) -> Self {
        Self {
            hints,
            shown: None,
            active_filters: 0,
            dimmed: false,
            key_color: Color::Cyan,
            bg_color: Color::DarkGray,
        }
    }

    pub fn with_counts(mut self, shown: usize, total: usize, active_filters: usize) -> Self {
        self.shown = Some((shown, total));
        self.active_filters = active_filters;
        self
    }

    pub fn with_dimmed(mut self, dimmed: bool) -> Self {
        self.dimmed = dimmed;
        self
    }

    pub fn with_colors(mut self, key_color: Color, bg_color: Color) -> Self {
        self.key_color = key_color;
        self.bg_color = bg_color;
        self
    }

    fn counter_text(&self) -> Option<String> {
        let (shown, total) = self.shown?;
        Some(match self.active_filters {
            0 => format!("{} of {}", shown, total),
            1 => format!("{} of {} · 1 filter", shown, total),
            n => format!("{} of {} · {} filters", shown, total, n),
        })
    }
}

impl Widget for &Controls<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let counter = self.counter_text();

        let mut constraints = self.hints.iter().fold(vec![], |mut acc, (key, action)| {
            acc.push(Constraint::Length(key.chars().count() as u16 + 2));
            acc.push(Constraint::Length(action.chars().count() as u16 + 1));
            acc
        });
        constraints.push(Constraint::Fill(1));
        if let Some(text) = &counter {
            constraints.push(Constraint::Length(text.chars().count() as u16 + 1));
        }

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);

        let base_style = if self.dimmed {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        for (i, (key, action)) in self.hints.iter().enumerate() {
            let j = i * 2;
            Paragraph::new(*key)
                .style(base_style.fg(self.key_color).bold())
                .centered()
                .render(layout[j], buf);
            Paragraph::new(*action)
                .style(base_style.bg(self.bg_color))
                .render(layout[j + 1], buf);
        }

        let fill_idx = self.hints.len() * 2;
        Paragraph::new("")
            .style(base_style.bg(self.bg_color))
            .render(layout[fill_idx], buf);

        if let Some(text) = counter {
            Paragraph::new(text)
                .style(base_style.bg(self.bg_color))
                .right_aligned()
                .render(layout[fill_idx + 1], buf);
        }
    }
}
