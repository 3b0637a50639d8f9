//! Drilldown table: column definitions over a filtered row set, with an
//! empty state and a synchronous row-activation callback.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::cell::{self, Align, CellKind, RenderedCell};
use crate::value::{CellValue, Row};

type ComputeFn = dyn Fn(&Row) -> Option<CellValue> + Send + Sync;
type SubtitleFn = dyn Fn(usize, usize) -> String + Send + Sync;

/// How a column reads its value from a row. Computed accessors must be pure.
#[derive(Clone)]
pub enum Accessor {
    Field(String),
    Computed(Arc<ComputeFn>),
}

impl Accessor {
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&Row) -> Option<CellValue> + Send + Sync + 'static,
    {
        Accessor::Computed(Arc::new(f))
    }

    pub fn read(&self, row: &Row) -> Option<CellValue> {
        match self {
            Accessor::Field(field) => row.get(field).cloned(),
            Accessor::Computed(f) => f(row),
        }
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Field(field) => write!(f, "Field({:?})", field),
            Accessor::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColumnDefinition {
    pub key: String,
    pub header: String,
    pub accessor: Accessor,
    pub kind: CellKind,
    pub align: Align,
    pub width: Option<u16>,
}

impl ColumnDefinition {
    /// Column reading the field named `key`.
    pub fn field(key: &str, header: &str) -> Self {
        Self {
            key: key.to_string(),
            header: header.to_string(),
            accessor: Accessor::Field(key.to_string()),
            kind: CellKind::Text,
            align: Align::Left,
            width: None,
        }
    }

    pub fn computed<F>(key: &str, header: &str, f: F) -> Self
    where
        F: Fn(&Row) -> Option<CellValue> + Send + Sync + 'static,
    {
        Self {
            accessor: Accessor::computed(f),
            ..Self::field(key, header)
        }
    }

    pub fn with_kind(mut self, kind: CellKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    pub fn render_cell(&self, row: &Row) -> RenderedCell {
        cell::render(self.accessor.read(row).as_ref(), &self.kind)
    }
}

#[derive(Clone, Default)]
pub enum Subtitle {
    #[default]
    None,
    Static(String),
    /// Called with (shown, total) on every render.
    Dynamic(Arc<SubtitleFn>),
}

impl Subtitle {
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(usize, usize) -> String + Send + Sync + 'static,
    {
        Subtitle::Dynamic(Arc::new(f))
    }

    /// "N of M items shown"
    pub fn shown_of_total() -> Self {
        Self::dynamic(|shown, total| format!("{} of {} items shown", shown, total))
    }

    pub fn text(&self, shown: usize, total: usize) -> Option<String> {
        match self {
            Subtitle::None => None,
            Subtitle::Static(s) => Some(s.clone()),
            Subtitle::Dynamic(f) => Some(f(shown, total)),
        }
    }
}

impl fmt::Debug for Subtitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subtitle::None => f.write_str("None"),
            Subtitle::Static(s) => write!(f, "Static({:?})", s),
            Subtitle::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyState {
    pub message: String,
    pub description: String,
}

impl Default for EmptyState {
    fn default() -> Self {
        Self {
            message: "No items found".to_string(),
            description: "Try adjusting the search or filters.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub key: String,
    pub header: String,
    pub align: Align,
    pub width: Option<u16>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableBody {
    Rows(Vec<Vec<RenderedCell>>),
    Empty { message: String, description: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTable {
    pub title: String,
    pub subtitle: Option<String>,
    pub headers: Vec<HeaderCell>,
    pub body: TableBody,
}

impl RenderedTable {
    pub fn is_empty(&self) -> bool {
        matches!(self.body, TableBody::Empty { .. })
    }
}

type RowClickFn = dyn FnMut(&Row);

pub struct DrilldownTable {
    pub title: String,
    pub subtitle: Subtitle,
    columns: Vec<ColumnDefinition>,
    pub empty: EmptyState,
    on_row_click: Option<Box<RowClickFn>>,
}

impl DrilldownTable {
    /// Fails when two columns share a key.
    pub fn new(title: &str, columns: Vec<ColumnDefinition>) -> Result<Self> {
        let mut keys = HashSet::new();
        for column in &columns {
            if !keys.insert(column.key.as_str()) {
                return Err(eyre!(
                    "Duplicate column key '{}' in table '{}'",
                    column.key,
                    title
                ));
            }
        }
        Ok(Self {
            title: title.to_string(),
            subtitle: Subtitle::None,
            columns,
            empty: EmptyState::default(),
            on_row_click: None,
        })
    }

    pub fn with_subtitle(mut self, subtitle: Subtitle) -> Self {
        self.subtitle = subtitle;
        self
    }

    pub fn with_empty_state(mut self, message: &str, description: &str) -> Self {
        self.empty = EmptyState {
            message: message.to_string(),
            description: description.to_string(),
        };
        self
    }

    pub fn on_row_click<F>(mut self, f: F) -> Self
    where
        F: FnMut(&Row) + 'static,
    {
        self.on_row_click = Some(Box::new(f));
        self
    }

    pub fn set_on_row_click<F>(&mut self, f: F)
    where
        F: FnMut(&Row) + 'static,
    {
        self.on_row_click = Some(Box::new(f));
    }

    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    /// Render the (already filtered) `rows`. `total` is the unfiltered row count.
    pub fn render(&self, rows: &[&Row], total: usize) -> RenderedTable {
        let headers = self
            .columns
            .iter()
            .map(|c| HeaderCell {
                key: c.key.clone(),
                header: c.header.clone(),
                align: c.align,
                width: c.width,
            })
            .collect();

        let body = if rows.is_empty() {
            TableBody::Empty {
                message: self.empty.message.clone(),
                description: self.empty.description.clone(),
            }
        } else {
            TableBody::Rows(
                rows.iter()
                    .map(|row| self.columns.iter().map(|c| c.render_cell(row)).collect())
                    .collect(),
            )
        };

        RenderedTable {
            title: self.title.clone(),
            subtitle: self.subtitle.text(rows.len(), total),
            headers,
            body,
        }
    }

    /// Invoke the row-click callback for `rows[index]`. Returns false when
    /// the index is out of range or no callback is registered.
    pub fn activate(&mut self, rows: &[&Row], index: usize) -> bool {
        match (self.on_row_click.as_mut(), rows.get(index).copied()) {
            (Some(callback), Some(row)) => {
                callback(row);
                true
            }
            _ => false,
        }
    }

    /// Enter and Space activate the selected row.
    pub fn handle_key(&mut self, key: &KeyEvent, rows: &[&Row], selected: usize) -> bool {
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => self.activate(rows, selected),
            _ => false,
        }
    }
}
