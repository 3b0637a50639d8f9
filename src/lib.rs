use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, StatefulWidget, TableState, Tabs, Widget},
};
use std::path::PathBuf;
use std::sync::mpsc::Sender;
use tracing::{debug, info, warn};

pub mod cell;
pub mod config;
pub mod dataset;
pub mod drilldown;
pub mod filter;
pub mod heatmap;
pub mod logging;
pub mod summary;
pub mod value;
pub mod view;
pub mod widgets;

pub use config::{AppConfig, ColorParser, ConfigManager, Theme};
pub use dataset::Dataset;
pub use drilldown::{ColumnDefinition, DrilldownTable, RenderedTable, Subtitle, TableBody};
pub use filter::{FilterKind, FilterOption, FilterSpec, FilterValue, FilterValues};
pub use heatmap::{HeatmapCell, HeatmapMatrix, Severity};
pub use value::{CellValue, Row};
pub use view::{DerivedView, ViewState};

use cell::CellKind;
use config::DisplayConfig;
use heatmap::{build_matrix, HeatmapPalette};
use widgets::controls::{
    Controls, FILTER_CONTROLS, HEATMAP_CONTROLS, SEARCH_CONTROLS, TABLE_CONTROLS,
};
use widgets::debug::DebugState;
use widgets::drilldown_table::{popup_area, TableView};
use widgets::filter_panel::{FilterPanel, FilterPanelState};
use widgets::heatmap::{HeatmapCursor, HeatmapView};
use widgets::record::RecordView;
use widgets::text_input::{TextInput, TextInputEvent};

/// Application name used for the config directory and other app-specific paths
pub const APP_NAME: &str = "cockpit";

/// Filter set from the heatmap row label on drilldown
pub const DRILL_ROW_FILTER: &str = "sub_process";
/// Filter set from the heatmap column label on drilldown
pub const DRILL_COL_FILTER: &str = "root_cause";

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Key(KeyEvent),
    Open(PathBuf),
    Resize(u16, u16), // resized (width, height)
    Search(String),
    Filter(String, FilterValue),
    ClearFilters,
    /// Heatmap cell activated: (sub-process, root cause)
    Drilldown(String, String),
    /// Row activated in the deviations table
    ShowRecord(Row),
    Exit,
    Crash(String),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    Searching,
    Filtering,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Deviations,
    Heatmap,
}

impl Tab {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "deviations" => Some(Tab::Deviations),
            "heatmap" => Some(Tab::Heatmap),
            _ => None,
        }
    }

    fn toggle(self) -> Self {
        match self {
            Tab::Deviations => Tab::Heatmap,
            Tab::Heatmap => Tab::Deviations,
        }
    }

    fn index(self) -> usize {
        match self {
            Tab::Deviations => 0,
            Tab::Heatmap => 1,
        }
    }
}

pub struct App {
    dataset: Dataset,
    table: DrilldownTable,
    /// Filters as configured; select options may be empty until data is loaded
    configured_filters: Vec<FilterSpec>,
    /// Filters with options resolved against the loaded rows
    specs: Vec<FilterSpec>,
    pub view: ViewState,
    derived: DerivedView,
    matrix: HeatmapMatrix,
    palette: HeatmapPalette,
    pub tab: Tab,
    pub input_mode: InputMode,
    search_input: TextInput,
    search_before: String,
    filter_panel: FilterPanelState,
    heatmap_cursor: HeatmapCursor,
    record: Option<Row>,
    table_state: TableState,
    display: DisplayConfig,
    debug: DebugState,
    theme: Theme,
}

impl App {
    pub fn new(events: Sender<AppEvent>) -> Result<App> {
        Self::new_with_config(events, &AppConfig::default())
    }

    pub fn new_with_config(events: Sender<AppEvent>, app_config: &AppConfig) -> Result<App> {
        let theme = Theme::from_config(&app_config.theme)?;
        let mut table = app_config.table.build(&theme, &app_config.display)?;

        // Row activation goes back through the event channel
        table.set_on_row_click(move |row| {
            if events.send(AppEvent::ShowRecord(row.clone())).is_err() {
                debug!("Event channel closed; dropping row activation");
            }
        });

        let tab = Tab::from_name(&app_config.display.default_tab).unwrap_or_default();
        let filters = app_config.table.filters.clone();

        let mut app = App {
            dataset: Dataset::default(),
            table,
            specs: filters.clone(),
            configured_filters: filters,
            view: ViewState::default(),
            derived: DerivedView {
                indices: Vec::new(),
                total: 0,
                active_filters: 0,
            },
            matrix: build_matrix(&[]),
            palette: theme.heatmap_palette(),
            tab,
            input_mode: InputMode::Normal,
            search_input: TextInput::new().with_theme(&theme),
            search_before: String::new(),
            filter_panel: FilterPanelState::default(),
            heatmap_cursor: HeatmapCursor::default(),
            record: None,
            table_state: TableState::default(),
            display: app_config.display.clone(),
            debug: DebugState::default(),
            theme,
        };
        app.debug.enabled = app_config.debug.enabled;
        app.recompute();
        Ok(app)
    }

    pub fn enable_debug(&mut self) {
        self.debug.enabled = true;
    }

    /// Get a color from the theme by name
    fn color(&self, name: &str) -> Color {
        self.theme.get(name)
    }

    /// Replace the loaded data. Filter state is kept; select options are re-derived.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.specs = self
            .configured_filters
            .iter()
            .map(|spec| {
                let derive = matches!(spec.kind, FilterKind::Select | FilterKind::MultiSelect)
                    && spec.options.is_empty();
                if derive {
                    spec.clone()
                        .with_options(FilterSpec::options_from_rows(&dataset.tickets, &spec.id))
                } else {
                    spec.clone()
                }
            })
            .collect();
        self.matrix = build_matrix(&dataset.heatmap);
        self.heatmap_cursor = HeatmapCursor::default();
        self.dataset = dataset;
        self.recompute();
    }

    /// Turn `ID=VALUE` pairs into filter events. Repeated ids collect into one
    /// list for multiselect filters; otherwise the last value wins.
    pub fn filter_events(&self, pairs: &[(String, String)]) -> Vec<AppEvent> {
        let mut grouped: Vec<(String, Vec<String>)> = Vec::new();
        for (id, value) in pairs {
            match grouped.iter_mut().find(|(g, _)| g == id) {
                Some((_, values)) => values.push(value.clone()),
                None => grouped.push((id.clone(), vec![value.clone()])),
            }
        }
        grouped
            .into_iter()
            .filter_map(|(id, mut values)| {
                let multi = self
                    .configured_filters
                    .iter()
                    .any(|s| s.id == id && s.kind == FilterKind::MultiSelect);
                let value = if multi {
                    FilterValue::Many(values)
                } else {
                    FilterValue::Single(values.pop()?)
                };
                Some(AppEvent::Filter(id, value))
            })
            .collect()
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn specs(&self) -> &[FilterSpec] {
        &self.specs
    }

    pub fn derived(&self) -> &DerivedView {
        &self.derived
    }

    pub fn matrix(&self) -> &HeatmapMatrix {
        &self.matrix
    }

    pub fn record(&self) -> Option<&Row> {
        self.record.as_ref()
    }

    /// The deviations table for the current state, as drawn.
    pub fn rendered_table(&self) -> RenderedTable {
        let rows = self.derived.rows(&self.dataset.tickets);
        self.table.render(&rows, self.derived.total)
    }

    /// Re-derive the visible rows from data and view state.
    fn recompute(&mut self) {
        self.derived = self.view.derive(&self.dataset.tickets, &self.specs);
        let shown = self.derived.shown();
        self.view.clamp_selection(shown);
        self.table_state
            .select(if shown > 0 { Some(self.view.selected) } else { None });
        debug!(
            shown,
            total = self.derived.total,
            active_filters = self.derived.active_filters,
            "View recomputed"
        );
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Open(path) => match Dataset::load(path) {
                Ok(dataset) => {
                    self.set_dataset(dataset);
                    None
                }
                Err(e) => Some(AppEvent::Crash(e.to_string())),
            },
            AppEvent::Resize(_, _) => None,
            AppEvent::Search(search) => {
                self.view.set_search(search);
                if self.search_input.value() != search {
                    self.search_input.set_value(search);
                }
                self.recompute();
                None
            }
            AppEvent::Filter(id, value) => {
                if self.specs.iter().any(|s| &s.id == id) {
                    self.view.set_filter(id, value.clone());
                    self.recompute();
                } else {
                    warn!("Ignoring value for unknown filter '{}'", id);
                }
                None
            }
            AppEvent::ClearFilters => {
                self.view.clear_filters();
                self.search_input.clear();
                self.recompute();
                None
            }
            AppEvent::Drilldown(row, col) => {
                self.drilldown(row, col);
                None
            }
            AppEvent::ShowRecord(row) => {
                self.record = Some(row.clone());
                None
            }
            AppEvent::Exit | AppEvent::Crash(_) => None,
        }
    }

    /// Open the deviations table narrowed to one heatmap cell.
    fn drilldown(&mut self, sub_process: &str, root_cause: &str) {
        self.debug.action("drilldown");
        info!("Drilldown into {} × {}", sub_process, root_cause);
        self.view.clear_filters();
        self.search_input.clear();
        for (id, value) in [(DRILL_ROW_FILTER, sub_process), (DRILL_COL_FILTER, root_cause)] {
            if self.specs.iter().any(|s| s.id == id) {
                self.view.set_filter(id, FilterValue::from(value));
            } else {
                warn!("No '{}' filter configured; drilldown cannot narrow by it", id);
            }
        }
        self.tab = Tab::Deviations;
        self.input_mode = InputMode::Normal;
        self.recompute();
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        self.debug.on_key(event);
        if event.kind != KeyEventKind::Press {
            return None;
        }
        if event.code == KeyCode::Char('c') && event.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(AppEvent::Exit);
        }

        if self.record.is_some() {
            if matches!(
                event.code,
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char(' ')
            ) {
                self.record = None;
                self.debug.action("close_record");
            }
            return None;
        }

        match self.input_mode {
            InputMode::Searching => self.search_key(event),
            InputMode::Filtering => self.filter_key(event),
            InputMode::Normal => match self.tab {
                Tab::Deviations => self.table_key(event),
                Tab::Heatmap => self.heatmap_key(event),
            },
        }
    }

    fn common_key(&mut self, event: &KeyEvent) -> Option<Option<AppEvent>> {
        match event.code {
            KeyCode::Char('q') => Some(Some(AppEvent::Exit)),
            KeyCode::Tab | KeyCode::BackTab => {
                self.tab = self.tab.toggle();
                self.debug.action("switch_tab");
                Some(None)
            }
            _ => None,
        }
    }

    fn table_key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        if let Some(result) = self.common_key(event) {
            return result;
        }
        let shown = self.derived.shown();
        match event.code {
            KeyCode::Down | KeyCode::Char('j') => self.view.select_next(shown),
            KeyCode::Up | KeyCode::Char('k') => self.view.select_previous(),
            KeyCode::PageDown => {
                for _ in 0..10 {
                    self.view.select_next(shown);
                }
            }
            KeyCode::PageUp => self.view.selected = self.view.selected.saturating_sub(10),
            KeyCode::Home | KeyCode::Char('g') => self.view.selected = 0,
            KeyCode::End | KeyCode::Char('G') => self.view.selected = shown.saturating_sub(1),
            KeyCode::Char('/') => self.start_search(),
            KeyCode::Char('f') => {
                self.input_mode = InputMode::Filtering;
                self.debug.action("open_filters");
            }
            KeyCode::Char('c') => return Some(AppEvent::ClearFilters),
            KeyCode::Enter | KeyCode::Char(' ') => {
                let rows = self.derived.rows(&self.dataset.tickets);
                if self.table.handle_key(event, &rows, self.view.selected) {
                    self.debug.action("activate_row");
                }
            }
            _ => {}
        }
        if shown > 0 {
            self.table_state.select(Some(self.view.selected));
        }
        None
    }

    fn heatmap_key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        if let Some(result) = self.common_key(event) {
            return result;
        }
        let (rows, cols) = (self.matrix.rows.len(), self.matrix.cols.len());
        match event.code {
            KeyCode::Up | KeyCode::Char('k') => self.heatmap_cursor.up(),
            KeyCode::Down | KeyCode::Char('j') => self.heatmap_cursor.down(rows),
            KeyCode::Left | KeyCode::Char('h') => self.heatmap_cursor.left(),
            KeyCode::Right | KeyCode::Char('l') => self.heatmap_cursor.right(cols),
            KeyCode::Enter | KeyCode::Char(' ') => {
                return self
                    .heatmap_cursor
                    .labels(&self.matrix)
                    .map(|(row, col)| AppEvent::Drilldown(row.to_string(), col.to_string()));
            }
            _ => {}
        }
        None
    }

    fn start_search(&mut self) {
        self.input_mode = InputMode::Searching;
        self.search_before = self.view.search.clone();
        self.search_input.set_value(&self.view.search);
        self.search_input.set_focused(true);
        self.debug.action("start_search");
    }

    fn search_key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        match self.search_input.handle_key(event) {
            TextInputEvent::Changed => Some(AppEvent::Search(self.search_input.value().to_string())),
            TextInputEvent::Submit => {
                self.input_mode = InputMode::Normal;
                self.search_input.set_focused(false);
                None
            }
            TextInputEvent::Cancel => {
                self.input_mode = InputMode::Normal;
                self.search_input.set_focused(false);
                Some(AppEvent::Search(self.search_before.clone()))
            }
            TextInputEvent::None => None,
        }
    }

    fn filter_key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        let count = self.specs.len();
        let Some(spec) = self.specs.get(self.filter_panel.selected).cloned() else {
            if matches!(event.code, KeyCode::Esc | KeyCode::Char('f')) {
                self.input_mode = InputMode::Normal;
            }
            return None;
        };

        match event.code {
            KeyCode::Esc | KeyCode::Char('f') => {
                self.input_mode = InputMode::Normal;
                self.debug.action("close_filters");
            }
            KeyCode::Char('q') => return Some(AppEvent::Exit),
            KeyCode::Down | KeyCode::Char('j') => self.filter_panel.next(count),
            KeyCode::Up | KeyCode::Char('k') => self.filter_panel.previous(),
            KeyCode::Char('c') => return Some(AppEvent::ClearFilters),
            KeyCode::Backspace | KeyCode::Delete => {
                if spec.kind == FilterKind::Search {
                    return Some(AppEvent::Search(String::new()));
                }
                return Some(AppEvent::Filter(spec.id, FilterValue::Single(String::new())));
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Char('h') | KeyCode::Char('l') => {
                let forward = matches!(event.code, KeyCode::Right | KeyCode::Char('l'));
                match spec.kind {
                    FilterKind::Select => {
                        self.view.cycle_select(&spec, forward);
                        self.recompute();
                    }
                    FilterKind::MultiSelect if forward => {
                        self.filter_panel.next_option(spec.options.len())
                    }
                    FilterKind::MultiSelect => self.filter_panel.previous_option(),
                    FilterKind::Search | FilterKind::Date => {}
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => match spec.kind {
                FilterKind::MultiSelect => {
                    if let Some(option) = spec.options.get(self.filter_panel.option) {
                        self.view.toggle_multi(&spec.id, &option.value);
                        self.recompute();
                    }
                }
                FilterKind::Select => {
                    self.view.cycle_select(&spec, true);
                    self.recompute();
                }
                FilterKind::Search => self.start_search(),
                FilterKind::Date => {}
            },
            _ => {}
        }
        None
    }

    fn summary_line(&self) -> Line<'static> {
        let rows = self.derived.rows(&self.dataset.tickets);
        let mut spans = Vec::new();
        if !self.display.summary_by.is_empty() {
            let counts = summary::count_by(rows.iter().copied(), &self.display.summary_by);
            let text = counts
                .iter()
                .map(|(value, n)| format!("{} {}", value, n))
                .collect::<Vec<_>>()
                .join(" · ");
            spans.push(Span::styled(
                text,
                Style::default().fg(self.color("text_primary")),
            ));
        }
        if !self.display.summary_sum.is_empty() {
            let total = summary::sum_by(rows.iter().copied(), &self.display.summary_sum);
            let kind = CellKind::Currency {
                symbol: self.display.currency_symbol.clone(),
                decimals: self.display.currency_decimals,
            };
            let text = cell::render(Some(&CellValue::Number(total)), &kind).text;
            if !spans.is_empty() {
                spans.push(Span::raw("   "));
            }
            spans.push(Span::styled(
                format!("Σ {}: {}", self.display.summary_sum, text),
                Style::default()
                    .fg(self.color("secondary"))
                    .add_modifier(Modifier::BOLD),
            ));
        }
        Line::from(spans)
    }

    fn render_tabs(&self, area: Rect, buf: &mut Buffer) {
        let title = if self.dataset.title.is_empty() {
            "ROI Cockpit".to_string()
        } else {
            self.dataset.title.clone()
        };
        let title_width = u16::try_from(title.chars().count())
            .unwrap_or(u16::MAX)
            .saturating_add(1);
        let [tabs_area, title_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(title_width)]).areas(area);
        Tabs::new(vec![
            format!("Deviations ({})", self.derived.shown()),
            format!("Heatmap ({})", self.matrix.lookup.len()),
        ])
        .select(self.tab.index())
        .style(Style::default().fg(self.color("dimmed")))
        .highlight_style(
            Style::default()
                .fg(self.color("primary"))
                .add_modifier(Modifier::BOLD),
        )
        .render(tabs_area, buf);
        Paragraph::new(title)
            .right_aligned()
            .style(Style::default().add_modifier(Modifier::BOLD))
            .render(title_area, buf);
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;
        self.debug.rows_at_render = format!("{}/{}", self.derived.shown(), self.derived.total);

        let mut constraints = vec![Constraint::Length(1), Constraint::Fill(1)];
        if self.input_mode == InputMode::Searching {
            constraints.push(Constraint::Length(3));
        }
        constraints.push(Constraint::Length(1)); // Controls
        if self.debug.enabled {
            constraints.push(Constraint::Length(1));
        }
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        self.render_tabs(layout[0], buf);
        let main_area = layout[1];

        match self.tab {
            Tab::Deviations => {
                let mut table_area = main_area;
                if self.input_mode == InputMode::Filtering {
                    let chunks = Layout::default()
                        .direction(Direction::Horizontal)
                        .constraints([Constraint::Min(0), Constraint::Length(42)])
                        .split(main_area);
                    table_area = chunks[0];
                    FilterPanel::new(&self.specs, &self.view.filters, &self.view.search, self.filter_panel)
                        .with_active_count(self.derived.active_filters)
                        .with_colors(
                            self.color("modal_border_active"),
                            self.color("primary"),
                            self.color("dimmed"),
                        )
                        .render(chunks[1], buf);
                }

                let [summary_area, table_area] =
                    Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(table_area);
                Paragraph::new(self.summary_line()).render(summary_area, buf);

                let rendered = self.rendered_table();
                let view = TableView::new(&rendered).with_colors(
                    self.color("table_header"),
                    self.color("table_border"),
                    self.color("dimmed"),
                    self.color("table_selected"),
                );
                StatefulWidget::render(view, table_area, buf, &mut self.table_state);
            }
            Tab::Heatmap => {
                HeatmapView::new(&self.matrix, &self.palette)
                    .with_cursor(self.heatmap_cursor)
                    .with_legend(self.display.show_legend)
                    .with_colors(self.color("table_border"), self.color("dimmed"))
                    .render(main_area, buf);
            }
        }

        if let Some(row) = &self.record {
            let title = row.text("id").unwrap_or_else(|| "Record".to_string());
            RecordView::new(row, &title)
                .with_colors(self.color("modal_border"), self.color("secondary"))
                .render(popup_area(main_area, 60, 70), buf);
        }

        let mut next = 2;
        if self.input_mode == InputMode::Searching {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(self.color("modal_border_active")))
                .title(" Search ");
            let inner = block.inner(layout[next]);
            block.render(layout[next], buf);
            (&self.search_input).render(inner, buf);
            next += 1;
        }

        let hints: &[(&str, &str)] = match (self.input_mode, self.tab) {
            (InputMode::Searching, _) => &SEARCH_CONTROLS,
            (InputMode::Filtering, _) => &FILTER_CONTROLS,
            (InputMode::Normal, Tab::Deviations) => &TABLE_CONTROLS,
            (InputMode::Normal, Tab::Heatmap) => &HEATMAP_CONTROLS,
        };
        let controls = Controls::new(hints)
            .with_counts(self.derived.shown(), self.derived.total, self.derived.active_filters)
            .with_dimmed(self.record.is_some())
            .with_colors(self.color("keybind_hints"), self.color("controls_bg"));
        (&controls).render(layout[next], buf);
        next += 1;

        if self.debug.enabled {
            (&self.debug).render(layout[next], buf);
        }
    }
}
