//! Cross-tabulation of two categorical dimensions (sub-process x root cause).
//!
//! Row and column order is the first-seen order of the source cells, never
//! alphabetical. Visual weight is a pure function of `count` and `severity`.

use ratatui::style::Color;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Self; 4] = [Self::Critical, Self::High, Self::Medium, Self::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Ok(Severity::Critical),
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            _ => Err(format!("Unknown severity: '{}'", s)),
        }
    }
}

/// Unknown severity strings become None so the cell renders as "no defined visual".
fn lenient_severity<'de, D>(deserializer: D) -> Result<Option<Severity>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match s.parse() {
        Ok(severity) => Some(severity),
        Err(e) => {
            warn!("{}; treating heatmap cell as having no severity", e);
            None
        }
    }))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatmapCell {
    #[serde(alias = "subProcess", alias = "sub_process")]
    pub dim_a: String,
    #[serde(alias = "rootCause", alias = "root_cause")]
    pub dim_b: String,
    #[serde(default)]
    pub count: u32,
    #[serde(default, deserialize_with = "lenient_severity")]
    pub severity: Option<Severity>,
}

impl HeatmapCell {
    pub fn new(dim_a: &str, dim_b: &str, count: u32, severity: Option<Severity>) -> Self {
        Self {
            dim_a: dim_a.to_string(),
            dim_b: dim_b.to_string(),
            count,
            severity,
        }
    }
}

/// What a coordinate of the matrix holds. Misses are `count = 0, severity = None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatrixCell {
    pub count: u32,
    pub severity: Option<Severity>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeatmapMatrix {
    pub rows: Vec<String>,
    pub cols: Vec<String>,
    pub lookup: HashMap<(String, String), HeatmapCell>,
}

impl HeatmapMatrix {
    pub fn cell(&self, dim_a: &str, dim_b: &str) -> MatrixCell {
        self.lookup
            .get(&(dim_a.to_string(), dim_b.to_string()))
            .map(|c| MatrixCell {
                count: c.count,
                severity: c.severity,
            })
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.cols.is_empty()
    }

    pub fn row_total(&self, dim_a: &str) -> u32 {
        self.cols.iter().map(|b| self.cell(dim_a, b).count).sum()
    }

    pub fn col_total(&self, dim_b: &str) -> u32 {
        self.rows.iter().map(|a| self.cell(a, dim_b).count).sum()
    }
}

pub fn build_matrix(cells: &[HeatmapCell]) -> HeatmapMatrix {
    let mut matrix = HeatmapMatrix::default();
    let mut seen_rows = HashSet::new();
    let mut seen_cols = HashSet::new();

    for cell in cells {
        if seen_rows.insert(cell.dim_a.as_str()) {
            matrix.rows.push(cell.dim_a.clone());
        }
        if seen_cols.insert(cell.dim_b.as_str()) {
            matrix.cols.push(cell.dim_b.clone());
        }
        let key = (cell.dim_a.clone(), cell.dim_b.clone());
        if matrix.lookup.insert(key, cell.clone()).is_some() {
            debug!(
                "Duplicate heatmap cell ({}, {}); keeping the last one",
                cell.dim_a, cell.dim_b
            );
        }
    }

    matrix
}

/// Size of a heatmap marker, driven only by `count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SizeTier {
    Empty,
    Small,
    Medium,
    Large,
    Largest,
}

impl SizeTier {
    pub fn from_count(count: u32) -> Self {
        match count {
            0 => SizeTier::Empty,
            1 => SizeTier::Small,
            2..=4 => SizeTier::Medium,
            5..=7 => SizeTier::Large,
            _ => SizeTier::Largest,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            SizeTier::Empty => "·",
            SizeTier::Small => "▪",
            SizeTier::Medium => "■",
            SizeTier::Large => "██",
            SizeTier::Largest => "███",
        }
    }
}

/// Severity to color bindings and the no-data outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatmapPalette {
    pub critical: Color,
    pub high: Color,
    pub medium: Color,
    pub low: Color,
    pub empty: Color,
}

impl Default for HeatmapPalette {
    fn default() -> Self {
        Self {
            critical: Color::Red,
            high: Color::Indexed(208),
            medium: Color::Yellow,
            low: Color::Green,
            empty: Color::DarkGray,
        }
    }
}

impl HeatmapPalette {
    pub fn color(&self, severity: Severity) -> Color {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellVisual {
    /// None for the no-data treatment.
    pub fill: Option<Color>,
    pub outline: Color,
    pub tier: SizeTier,
}

impl CellVisual {
    pub fn is_empty(&self) -> bool {
        self.fill.is_none()
    }
}

pub fn cell_visual(count: u32, severity: Option<Severity>, palette: &HeatmapPalette) -> CellVisual {
    match severity {
        Some(severity) if count > 0 => {
            let color = palette.color(severity);
            CellVisual {
                fill: Some(color),
                outline: color,
                tier: SizeTier::from_count(count),
            }
        }
        _ => CellVisual {
            fill: None,
            outline: palette.empty,
            tier: SizeTier::Empty,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    pub severity: Severity,
    pub label: &'static str,
    pub color: Color,
    pub representative_count: u32,
}

/// Static legend, independent of the data shown.
pub fn legend(palette: &HeatmapPalette) -> [LegendEntry; 4] {
    let entry = |severity: Severity, label: &'static str, representative_count: u32| LegendEntry {
        severity,
        label,
        color: palette.color(severity),
        representative_count,
    };
    [
        entry(Severity::Critical, "Critical (8+)", 8),
        entry(Severity::High, "High (5-7)", 5),
        entry(Severity::Medium, "Medium (2-4)", 3),
        entry(Severity::Low, "Low (1)", 1),
    ]
}
