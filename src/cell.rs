//! Cell rendering: maps a field value and a cell kind to a display description.
//!
//! Every variant of [`CellKind`] has its own pure renderer. Nothing here fails:
//! missing values become a placeholder and values of the wrong shape fall back
//! to their plain text.

use chrono::{DateTime, NaiveDate};
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::value::CellValue;

/// Text shown for absent or blank values.
pub const PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, PartialEq)]
pub struct BadgeConfig {
    pub color_map: HashMap<String, Color>,
    pub default_color: Color,
}

impl BadgeConfig {
    pub fn new(default_color: Color) -> Self {
        Self {
            color_map: HashMap::new(),
            default_color,
        }
    }

    pub fn with_color(mut self, value: &str, color: Color) -> Self {
        self.color_map.insert(value.to_string(), color);
        self
    }

    pub fn color_for(&self, value: &str) -> Color {
        self.color_map
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellKind {
    Text,
    Number { decimals: usize },
    Badge(BadgeConfig),
    Currency { symbol: String, decimals: usize },
    Percentage { decimals: usize },
    Date { format: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedCell {
    pub text: String,
    /// Badge color; None for plain cells.
    pub color: Option<Color>,
    pub placeholder: bool,
}

impl RenderedCell {
    fn plain(text: String) -> Self {
        Self {
            text,
            color: None,
            placeholder: false,
        }
    }

    fn placeholder() -> Self {
        Self {
            text: PLACEHOLDER.to_string(),
            color: None,
            placeholder: true,
        }
    }
}

pub fn render(value: Option<&CellValue>, kind: &CellKind) -> RenderedCell {
    let value = match value {
        Some(v) if !v.is_blank() => v,
        _ => return RenderedCell::placeholder(),
    };
    match kind {
        CellKind::Text => RenderedCell::plain(value.as_text()),
        CellKind::Number { decimals } => render_number(value, *decimals),
        CellKind::Badge(config) => render_badge(value, config),
        CellKind::Currency { symbol, decimals } => render_currency(value, symbol, *decimals),
        CellKind::Percentage { decimals } => render_percentage(value, *decimals),
        CellKind::Date { format } => render_date(value, format),
    }
}

fn render_number(value: &CellValue, decimals: usize) -> RenderedCell {
    match value.as_f64() {
        Some(n) => RenderedCell::plain(group_thousands(n, decimals)),
        None => RenderedCell::plain(value.as_text()),
    }
}

fn render_badge(value: &CellValue, config: &BadgeConfig) -> RenderedCell {
    let text = value.as_text();
    RenderedCell {
        color: Some(config.color_for(&text)),
        text,
        placeholder: false,
    }
}

fn render_currency(value: &CellValue, symbol: &str, decimals: usize) -> RenderedCell {
    match value.as_f64() {
        Some(n) if n < 0.0 => {
            RenderedCell::plain(format!("-{}{}", symbol, group_thousands(-n, decimals)))
        }
        Some(n) => RenderedCell::plain(format!("{}{}", symbol, group_thousands(n, decimals))),
        None => RenderedCell::plain(value.as_text()),
    }
}

fn render_percentage(value: &CellValue, decimals: usize) -> RenderedCell {
    match value.as_f64() {
        Some(n) => RenderedCell::plain(format!("{:.*}%", decimals, n)),
        None => RenderedCell::plain(value.as_text()),
    }
}

fn render_date(value: &CellValue, format: &str) -> RenderedCell {
    let text = value.as_text();
    match parse_date(&text) {
        Some(date) => RenderedCell::plain(date.format(format).to_string()),
        None => RenderedCell::plain(text),
    }
}

/// Parse `YYYY-MM-DD` or an RFC 3339 timestamp into a calendar date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

fn group_thousands(n: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };
    let digits: Vec<char> = int_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }
    let sign = if n < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}
