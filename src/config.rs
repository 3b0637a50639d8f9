use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use supports_color::Stream;
use tracing_subscriber::EnvFilter;

use crate::cell::{Align, BadgeConfig, CellKind};
use crate::drilldown::{ColumnDefinition, DrilldownTable, Subtitle};
use crate::filter::{FilterKind, FilterOption, FilterSpec};
use crate::heatmap::{HeatmapPalette, Severity};

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    pub fn generate_default_config(&self) -> String {
        DEFAULT_CONFIG_TEMPLATE.to_string()
    }

    /// Write default configuration to config file
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path("config.toml");

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;

        Ok(config_path)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub display: DisplayConfig,
    pub performance: PerformanceConfig,
    pub theme: ThemeConfig,
    pub table: TableConfig,
    pub logging: LoggingConfig,
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub default_tab: String,
    pub show_legend: bool,
    pub date_format: String,
    pub currency_symbol: String,
    pub currency_decimals: usize,
    /// Field whose values are counted in the summary line; empty hides the counts
    pub summary_by: String,
    /// Numeric field totalled in the summary line; empty hides the total
    pub summary_sum: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub event_poll_interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub color_mode: String,
    pub colors: ColorConfig,
}

macro_rules! color_config {
    ($($field:ident => $default:expr),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct ColorConfig {
            $(pub $field: String,)*
        }

        impl Default for ColorConfig {
            fn default() -> Self {
                Self {
                    $($field: $default.to_string(),)*
                }
            }
        }

        impl ColorConfig {
            /// (name, value) for every color, in declaration order
            pub fn entries(&self) -> Vec<(&'static str, &str)> {
                vec![$((stringify!($field), self.$field.as_str()),)*]
            }

            pub fn merge(&mut self, other: Self) {
                let default = ColorConfig::default();
                $(
                    if other.$field != default.$field {
                        self.$field = other.$field;
                    }
                )*
            }
        }
    };
}

color_config! {
    primary => "cyan",
    secondary => "yellow",
    success => "green",
    error => "red",
    warning => "yellow",
    dimmed => "dark_gray",
    controls_bg => "indexed(236)",
    text_primary => "white",
    text_secondary => "dark_gray",
    table_header => "white",
    table_border => "cyan",
    table_selected => "reversed",
    modal_border => "cyan",
    modal_border_active => "yellow",
    modal_border_error => "red",
    keybind_hints => "cyan",
    severity_critical => "red",
    severity_high => "indexed(208)",
    severity_medium => "yellow",
    severity_low => "green",
    heatmap_empty => "dark_gray",
    badge_default => "gray",
}

/// Drilldown table layout: columns, filters and empty state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub title: String,
    /// `{shown}` and `{total}` are replaced on every render. Empty for no subtitle.
    pub subtitle: String,
    pub empty_message: String,
    pub empty_description: String,
    pub columns: Vec<ColumnConfig>,
    pub filters: Vec<FilterSpec>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    #[default]
    Text,
    Number,
    Badge,
    Currency,
    Percentage,
    Date,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConfig {
    pub key: String,
    pub header: String,
    /// Row field to read; defaults to `key`
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub kind: ColumnKind,
    #[serde(default)]
    pub align: Align,
    #[serde(default)]
    pub width: Option<u16>,
    #[serde(default)]
    pub decimals: Option<usize>,
    /// Badge value -> color (a theme color name such as "severity_high", or any parseable color)
    #[serde(default)]
    pub badge_colors: HashMap<String, String>,
}

impl ColumnConfig {
    fn new(key: &str, header: &str, kind: ColumnKind) -> Self {
        Self {
            key: key.to_string(),
            header: header.to_string(),
            field: None,
            kind,
            align: Align::Left,
            width: None,
            decimals: None,
            badge_colors: HashMap::new(),
        }
    }

    fn with_width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    fn with_badge(mut self, value: &str, color: &str) -> Self {
        self.badge_colors
            .insert(value.to_string(), color.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive, e.g. "info" or "warn,roi_cockpit=debug"
    pub level: String,
    /// Log file; logging is off when unset (the terminal belongs to the UI)
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub enabled: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            display: DisplayConfig::default(),
            performance: PerformanceConfig::default(),
            theme: ThemeConfig::default(),
            table: TableConfig::default(),
            logging: LoggingConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            default_tab: "deviations".to_string(),
            show_legend: true,
            date_format: "%Y-%m-%d".to_string(),
            currency_symbol: "€".to_string(),
            currency_decimals: 2,
            summary_by: "severity".to_string(),
            summary_sum: "amount".to_string(),
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            event_poll_interval_ms: 25,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            color_mode: "auto".to_string(),
            colors: ColorConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        let severity_options = Severity::ALL
            .iter()
            .map(|s| FilterOption::new(s.as_str()))
            .collect();
        Self {
            title: "Deviation Tickets".to_string(),
            subtitle: "{shown} of {total} items shown".to_string(),
            empty_message: "No deviations found".to_string(),
            empty_description: "No ticket matches the current search and filters.".to_string(),
            columns: vec![
                ColumnConfig::new("id", "Ticket", ColumnKind::Text).with_width(8),
                ColumnConfig::new("title", "Deviation", ColumnKind::Text),
                ColumnConfig::new("sub_process", "Sub-process", ColumnKind::Text),
                ColumnConfig::new("root_cause", "Root cause", ColumnKind::Text),
                ColumnConfig::new("severity", "Severity", ColumnKind::Badge)
                    .with_width(10)
                    .with_badge("Critical", "severity_critical")
                    .with_badge("High", "severity_high")
                    .with_badge("Medium", "severity_medium")
                    .with_badge("Low", "severity_low"),
                ColumnConfig::new("status", "Status", ColumnKind::Badge)
                    .with_width(12)
                    .with_badge("Open", "warning")
                    .with_badge("In Progress", "primary")
                    .with_badge("Closed", "success"),
                ColumnConfig::new("amount", "Amount", ColumnKind::Currency)
                    .with_width(14)
                    .with_align(Align::Right),
                ColumnConfig::new("created", "Created", ColumnKind::Date).with_width(10),
            ],
            filters: vec![
                FilterSpec::search("search", &["id", "title", "owner"]).with_label("Search"),
                FilterSpec::new("severity", FilterKind::Select)
                    .with_label("Severity")
                    .with_options(severity_options),
                FilterSpec::new("status", FilterKind::MultiSelect).with_label("Status"),
                FilterSpec::new("sub_process", FilterKind::Select).with_label("Sub-process"),
                FilterSpec::new("root_cause", FilterKind::Select).with_label("Root cause"),
                FilterSpec::new("created", FilterKind::Date).with_label("Created"),
            ],
        }
    }
}

// Configuration loading and merging
impl AppConfig {
    /// Load configuration from all layers (default → user file). An explicit
    /// `path` must exist; the per-user file is optional.
    pub fn load(app_name: &str, path: Option<&Path>) -> Result<Self> {
        let mut config = AppConfig::default();

        let user_config = match path {
            Some(path) => Some(Self::load_file(path)?),
            None => Self::load_user_config(app_name)?,
        };
        if let Some(user_config) = user_config {
            config.merge(user_config);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load ~/.config/<app>/config.toml if present
    fn load_user_config(app_name: &str) -> Result<Option<AppConfig>> {
        let config_manager = ConfigManager::new(app_name)?;
        let config_path = config_manager.config_path("config.toml");
        if !config_path.exists() {
            return Ok(None);
        }
        Self::load_file(&config_path).map(Some)
    }

    pub fn load_file(config_path: &Path) -> Result<AppConfig> {
        let content = std::fs::read_to_string(config_path).map_err(|e| {
            eyre!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            )
        })?;

        toml::from_str(&content).map_err(|e| {
            eyre!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            )
        })
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.display.merge(other.display);
        self.performance.merge(other.performance);
        self.theme.merge(other.theme);
        self.table.merge(other.table);
        self.logging.merge(other.logging);
        self.debug.merge(other.debug);
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        if self.performance.event_poll_interval_ms == 0 {
            return Err(eyre!("event_poll_interval_ms must be greater than 0"));
        }

        match self.theme.color_mode.as_str() {
            "light" | "dark" | "auto" => {}
            _ => {
                return Err(eyre!(
                    "Invalid color_mode: {}. Must be 'light', 'dark', or 'auto'",
                    self.theme.color_mode
                ))
            }
        }

        match self.display.default_tab.as_str() {
            "deviations" | "heatmap" => {}
            _ => {
                return Err(eyre!(
                    "Invalid default_tab: {}. Must be 'deviations' or 'heatmap'",
                    self.display.default_tab
                ))
            }
        }

        EnvFilter::try_new(&self.logging.level)
            .map_err(|e| eyre!("Invalid logging level '{}': {}", self.logging.level, e))?;

        let parser = ColorParser::new();
        self.theme.colors.validate(&parser)?;
        self.table.validate(&self.theme.colors, &parser)?;

        Ok(())
    }
}

impl DisplayConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DisplayConfig::default();
        if other.default_tab != default.default_tab {
            self.default_tab = other.default_tab;
        }
        if other.show_legend != default.show_legend {
            self.show_legend = other.show_legend;
        }
        if other.date_format != default.date_format {
            self.date_format = other.date_format;
        }
        if other.currency_symbol != default.currency_symbol {
            self.currency_symbol = other.currency_symbol;
        }
        if other.currency_decimals != default.currency_decimals {
            self.currency_decimals = other.currency_decimals;
        }
        if other.summary_by != default.summary_by {
            self.summary_by = other.summary_by;
        }
        if other.summary_sum != default.summary_sum {
            self.summary_sum = other.summary_sum;
        }
    }
}

impl PerformanceConfig {
    pub fn merge(&mut self, other: Self) {
        let default = PerformanceConfig::default();
        if other.event_poll_interval_ms != default.event_poll_interval_ms {
            self.event_poll_interval_ms = other.event_poll_interval_ms;
        }
    }
}

impl ThemeConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ThemeConfig::default();
        if other.color_mode != default.color_mode {
            self.color_mode = other.color_mode;
        }
        self.colors.merge(other.colors);
    }
}

impl ColorConfig {
    /// Validate all color strings can be parsed
    fn validate(&self, parser: &ColorParser) -> Result<()> {
        for (name, value) in self.entries() {
            parser
                .parse(value)
                .map_err(|e| eyre!("Invalid color value for '{}': {}", name, e))?;
        }
        Ok(())
    }

    fn has(&self, name: &str) -> bool {
        self.entries().iter().any(|(n, _)| *n == name)
    }
}

impl TableConfig {
    pub fn merge(&mut self, other: Self) {
        let default = TableConfig::default();
        if other.title != default.title {
            self.title = other.title;
        }
        if other.subtitle != default.subtitle {
            self.subtitle = other.subtitle;
        }
        if other.empty_message != default.empty_message {
            self.empty_message = other.empty_message;
        }
        if other.empty_description != default.empty_description {
            self.empty_description = other.empty_description;
        }
        if other.columns != default.columns {
            self.columns = other.columns;
        }
        if other.filters != default.filters {
            self.filters = other.filters;
        }
    }

    fn validate(&self, colors: &ColorConfig, parser: &ColorParser) -> Result<()> {
        let mut keys = HashSet::new();
        for column in &self.columns {
            if !keys.insert(column.key.as_str()) {
                return Err(eyre!("Duplicate column key '{}' in [table]", column.key));
            }
            for (value, color) in &column.badge_colors {
                if !colors.has(color) {
                    parser.parse(color).map_err(|e| {
                        eyre!(
                            "Invalid badge color for '{}' in column '{}': {}",
                            value,
                            column.key,
                            e
                        )
                    })?;
                }
            }
        }
        let mut ids = HashSet::new();
        for filter in &self.filters {
            if !ids.insert(filter.id.as_str()) {
                return Err(eyre!("Duplicate filter id '{}' in [table]", filter.id));
            }
        }
        Ok(())
    }

    /// Build the drilldown table from this layout with colors from `theme`.
    pub fn build(&self, theme: &Theme, display: &DisplayConfig) -> Result<DrilldownTable> {
        let parser = ColorParser::new();
        let columns = self
            .columns
            .iter()
            .map(|c| c.build(theme, &parser, display))
            .collect::<Result<Vec<_>>>()?;

        let subtitle = if self.subtitle.is_empty() {
            Subtitle::None
        } else if self.subtitle.contains("{shown}") || self.subtitle.contains("{total}") {
            let template = self.subtitle.clone();
            Subtitle::dynamic(move |shown, total| {
                template
                    .replace("{shown}", &shown.to_string())
                    .replace("{total}", &total.to_string())
            })
        } else {
            Subtitle::Static(self.subtitle.clone())
        };

        Ok(DrilldownTable::new(&self.title, columns)?
            .with_subtitle(subtitle)
            .with_empty_state(&self.empty_message, &self.empty_description))
    }
}

impl ColumnConfig {
    fn build(
        &self,
        theme: &Theme,
        parser: &ColorParser,
        display: &DisplayConfig,
    ) -> Result<ColumnDefinition> {
        let kind = match self.kind {
            ColumnKind::Text => CellKind::Text,
            ColumnKind::Number => CellKind::Number {
                decimals: self.decimals.unwrap_or(0),
            },
            ColumnKind::Percentage => CellKind::Percentage {
                decimals: self.decimals.unwrap_or(1),
            },
            ColumnKind::Currency => CellKind::Currency {
                symbol: display.currency_symbol.clone(),
                decimals: self.decimals.unwrap_or(display.currency_decimals),
            },
            ColumnKind::Date => CellKind::Date {
                format: display.date_format.clone(),
            },
            ColumnKind::Badge => {
                let mut badge = BadgeConfig::new(theme.get("badge_default"));
                for (value, color) in &self.badge_colors {
                    let color = match theme.get_optional(color) {
                        Some(c) => c,
                        None => parser.parse(color)?,
                    };
                    badge = badge.with_color(value, color);
                }
                CellKind::Badge(badge)
            }
        };

        let field = self.field.as_deref().unwrap_or(&self.key);
        let mut column = ColumnDefinition::field(field, &self.header)
            .with_kind(kind)
            .with_align(self.align);
        column.key = self.key.clone();
        if let Some(width) = self.width {
            column = column.with_width(width);
        }
        Ok(column)
    }
}

impl LoggingConfig {
    pub fn merge(&mut self, other: Self) {
        let default = LoggingConfig::default();
        if other.level != default.level {
            self.level = other.level;
        }
        if other.file.is_some() {
            self.file = other.file;
        }
    }
}

impl DebugConfig {
    pub fn merge(&mut self, other: Self) {
        if other.enabled {
            self.enabled = true;
        }
    }
}

/// Color parser with terminal capability detection
pub struct ColorParser {
    supports_true_color: bool,
    supports_256: bool,
    no_color: bool,
}

impl ColorParser {
    /// Create a new ColorParser with automatic terminal capability detection
    pub fn new() -> Self {
        let no_color = std::env::var("NO_COLOR").is_ok();
        let support = supports_color::on(Stream::Stdout);

        Self {
            supports_true_color: support.as_ref().map(|s| s.has_16m).unwrap_or(false),
            supports_256: support.as_ref().map(|s| s.has_256).unwrap_or(false),
            no_color,
        }
    }

    /// Parse a color string (hex, indexed or named) into a terminal color
    pub fn parse(&self, s: &str) -> Result<Color> {
        if self.no_color {
            return Ok(Color::Reset);
        }

        let trimmed = s.trim();

        if trimmed.starts_with('#') && trimmed.len() == 7 {
            let (r, g, b) = parse_hex(trimmed)?;
            return Ok(self.convert_rgb_to_terminal_color(r, g, b));
        }

        let lower = trimmed.to_lowercase();
        if let Some(num_str) = lower
            .strip_prefix("indexed(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let num = num_str.trim().parse::<u8>().map_err(|_| {
                eyre!(
                    "Invalid indexed color: '{}'. Expected format: indexed(0-255)",
                    trimmed
                )
            })?;
            return Ok(Color::Indexed(num));
        }

        match lower.as_str() {
            "black" => Ok(Color::Black),
            "red" => Ok(Color::Red),
            "green" => Ok(Color::Green),
            "yellow" => Ok(Color::Yellow),
            "blue" => Ok(Color::Blue),
            "magenta" => Ok(Color::Magenta),
            "cyan" => Ok(Color::Cyan),
            "white" => Ok(Color::White),
            "orange" => Ok(Color::Indexed(208)),
            "amber" => Ok(Color::Indexed(214)),

            "bright_black" | "bright black" => Ok(Color::Indexed(8)),
            "bright_red" | "bright red" => Ok(Color::Indexed(9)),
            "bright_green" | "bright green" => Ok(Color::Indexed(10)),
            "bright_yellow" | "bright yellow" => Ok(Color::Indexed(11)),
            "bright_blue" | "bright blue" => Ok(Color::Indexed(12)),
            "bright_magenta" | "bright magenta" => Ok(Color::Indexed(13)),
            "bright_cyan" | "bright cyan" => Ok(Color::Indexed(14)),
            "bright_white" | "bright white" => Ok(Color::Indexed(15)),

            "gray" | "grey" => Ok(Color::Indexed(8)),
            "dark_gray" | "dark gray" | "dark_grey" | "dark grey" => Ok(Color::Indexed(8)),
            "light_gray" | "light gray" | "light_grey" | "light grey" => Ok(Color::Indexed(7)),

            // Modifiers pass through as Reset and are handled when rendering
            "reset" | "reversed" | "default" | "none" => Ok(Color::Reset),

            _ => Err(eyre!(
                "Unknown color name: '{}'. Supported: basic ANSI colors (red, blue, etc.), \
                 bright variants (bright_red, etc.), indexed(0-255), or hex colors (#ff0000)",
                trimmed
            )),
        }
    }

    fn convert_rgb_to_terminal_color(&self, r: u8, g: u8, b: u8) -> Color {
        if self.supports_true_color {
            Color::Rgb(r, g, b)
        } else if self.supports_256 {
            Color::Indexed(rgb_to_256_color(r, g, b))
        } else {
            rgb_to_basic_ansi(r, g, b)
        }
    }
}

impl Default for ColorParser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_hex(s: &str) -> Result<(u8, u8, u8)> {
    let digits = s.strip_prefix('#').unwrap_or_default();
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(eyre!(
            "Invalid hex color format: '{}'. Expected format: #rrggbb",
            s
        ));
    }

    let component = |range: std::ops::Range<usize>, name: &str| {
        digits
            .get(range)
            .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            .ok_or_else(|| eyre!("Invalid {} component in hex color: {}", name, s))
    };
    Ok((
        component(0..2, "red")?,
        component(2..4, "green")?,
        component(4..6, "blue")?,
    ))
}

/// Convert RGB to nearest xterm 256-color palette index
pub fn rgb_to_256_color(r: u8, g: u8, b: u8) -> u8 {
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 10 {
        // Grayscale ramp (232-255)
        let gray = (r as u16 + g as u16 + b as u16) / 3;
        if gray < 8 {
            return 16;
        } else if gray > 247 {
            return 231;
        } else {
            return 232 + ((gray - 8) * 24 / 240) as u8;
        }
    }

    // 6x6x6 color cube (16-231)
    let r_idx = (r as u16 * 5 / 255) as u8;
    let g_idx = (g as u16 * 5 / 255) as u8;
    let b_idx = (b as u16 * 5 / 255) as u8;

    16 + 36 * r_idx + 6 * g_idx + b_idx
}

/// Convert RGB to nearest basic ANSI color (8 colors)
pub fn rgb_to_basic_ansi(r: u8, g: u8, b: u8) -> Color {
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 30 {
        let avg = (r as u16 + g as u16 + b as u16) / 3;
        return if avg < 64 { Color::Black } else { Color::White };
    }

    match (r > 128, g > 128, b > 128) {
        (false, false, false) => Color::Black,
        (true, false, false) => Color::Red,
        (false, true, false) => Color::Green,
        (true, true, false) => Color::Yellow,
        (false, false, true) => Color::Blue,
        (true, false, true) => Color::Magenta,
        (false, true, true) => Color::Cyan,
        (true, true, true) => Color::White,
    }
}

/// Theme containing parsed colors ready for use
#[derive(Debug, Clone)]
pub struct Theme {
    pub colors: HashMap<String, Color>,
}

impl Theme {
    /// Create a Theme from a ThemeConfig by parsing all color strings
    pub fn from_config(config: &ThemeConfig) -> Result<Self> {
        let parser = ColorParser::new();
        let colors = config
            .colors
            .entries()
            .into_iter()
            .map(|(name, value)| Ok((name.to_string(), parser.parse(value)?)))
            .collect::<Result<HashMap<_, _>>>()?;
        Ok(Self { colors })
    }

    /// Get a color by name, returns Reset if not found
    pub fn get(&self, name: &str) -> Color {
        self.colors.get(name).copied().unwrap_or(Color::Reset)
    }

    /// Get a color by name, returns None if not found
    pub fn get_optional(&self, name: &str) -> Option<Color> {
        self.colors.get(name).copied()
    }

    pub fn heatmap_palette(&self) -> HeatmapPalette {
        let default = HeatmapPalette::default();
        HeatmapPalette {
            critical: self.get_optional("severity_critical").unwrap_or(default.critical),
            high: self.get_optional("severity_high").unwrap_or(default.high),
            medium: self.get_optional("severity_medium").unwrap_or(default.medium),
            low: self.get_optional("severity_low").unwrap_or(default.low),
            empty: self.get_optional("heatmap_empty").unwrap_or(default.empty),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::from_config(&ThemeConfig::default()).unwrap_or_else(|_| Theme {
            colors: HashMap::new(),
        })
    }
}

const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../config/default.toml");
