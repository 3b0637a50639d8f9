use ratatui::style::Color;
use roi_cockpit::cell::{CellKind, PLACEHOLDER};
use roi_cockpit::config::{AppConfig, ColumnKind, ConfigManager, Theme};
use roi_cockpit::drilldown::TableBody;
use roi_cockpit::filter::FilterKind;
use roi_cockpit::Row;
use std::fs;
use tempfile::TempDir;

// Helper to create a temporary config directory for testing
fn setup_test_config_dir() -> (TempDir, ConfigManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_manager = ConfigManager::with_dir(temp_dir.path().to_path_buf());
    (temp_dir, config_manager)
}

fn ensure_colors_enabled() {
    std::env::remove_var("NO_COLOR");
}

#[test]
fn test_default_config() {
    let config = AppConfig::default();

    assert_eq!(config.version, "0.1");

    assert_eq!(config.display.default_tab, "deviations");
    assert!(config.display.show_legend);
    assert_eq!(config.display.currency_symbol, "€");
    assert_eq!(config.performance.event_poll_interval_ms, 25);

    assert_eq!(config.theme.color_mode, "auto");
    assert_eq!(config.theme.colors.severity_critical, "red");
    assert_eq!(config.theme.colors.severity_high, "indexed(208)");

    assert_eq!(config.table.title, "Deviation Tickets");
    assert_eq!(config.table.columns.len(), 8);
    assert_eq!(config.table.filters[0].kind, FilterKind::Search);

    assert_eq!(config.logging.level, "info");
    assert!(config.logging.file.is_none());
    assert!(!config.debug.enabled);
}

#[test]
fn test_generate_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let template = config_manager.generate_default_config();

    assert!(template.contains("[display]"));
    assert!(template.contains("[performance]"));
    assert!(template.contains("[theme.colors]"));
    assert!(template.contains("[logging]"));
    assert!(template.contains("[debug]"));
    assert!(template.contains("version = \"0.1\""));
}

#[test]
fn test_default_template_parses_to_defaults() {
    ensure_colors_enabled();
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let template = config_manager.generate_default_config();
    let parsed: AppConfig = toml::from_str(&template).expect("Template should parse");
    assert_eq!(parsed, AppConfig::default());
    assert!(parsed.validate().is_ok());
}

#[test]
fn test_write_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let config_path = config_manager
        .write_default_config(false)
        .expect("Failed to write config");

    assert!(config_path.exists());
    let content = fs::read_to_string(&config_path).expect("Failed to read config");
    assert!(content.contains("[display]"));
}

#[test]
fn test_write_config_without_force_fails_if_exists() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    config_manager
        .write_default_config(false)
        .expect("First write should succeed");

    let result = config_manager.write_default_config(false);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("already exists"));
}

#[test]
fn test_write_config_with_force_overwrites() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let first_path = config_manager
        .write_default_config(false)
        .expect("First write should succeed");
    let second_path = config_manager
        .write_default_config(true)
        .expect("Second write with force should succeed");

    assert_eq!(first_path, second_path);
}

#[test]
fn test_load_explicit_file_merges_over_defaults() {
    ensure_colors_enabled();
    let (_temp_dir, config_manager) = setup_test_config_dir();
    config_manager.ensure_config_dir().unwrap();
    let config_path = config_manager.config_path("custom.toml");

    fs::write(
        &config_path,
        r#"
[display]
default_tab = "heatmap"
currency_symbol = "$"

[theme.colors]
severity_critical = "magenta"

[table]
title = "Open Deviations"
"#,
    )
    .unwrap();

    let config = AppConfig::load("cockpit_test_unused", Some(&config_path))
        .expect("Config should load");
    assert_eq!(config.display.default_tab, "heatmap");
    assert_eq!(config.display.currency_symbol, "$");
    assert_eq!(config.theme.colors.severity_critical, "magenta");
    assert_eq!(config.table.title, "Open Deviations");

    // Untouched values stay default
    assert_eq!(config.theme.colors.severity_high, "indexed(208)");
    assert_eq!(config.table.columns.len(), 8);
}

#[test]
fn test_load_missing_explicit_file_fails() {
    let result = AppConfig::load("cockpit_test_unused", Some(std::path::Path::new("nope.toml")));
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Failed to read config file"));
}

#[test]
fn test_load_reports_parse_errors() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    config_manager.ensure_config_dir().unwrap();
    let config_path = config_manager.config_path("config.toml");
    fs::write(&config_path, "[display\nbroken").unwrap();

    let result = AppConfig::load_file(&config_path);
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Failed to parse config file"));
}

#[test]
fn test_merge_configs() {
    let mut base = AppConfig::default();
    let mut override_config = AppConfig::default();

    override_config.display.show_legend = false;
    override_config.performance.event_poll_interval_ms = 50;
    override_config.theme.colors.keybind_hints = "blue".to_string();
    override_config.logging.level = "debug".to_string();

    base.merge(override_config);

    assert!(!base.display.show_legend);
    assert_eq!(base.performance.event_poll_interval_ms, 50);
    assert_eq!(base.theme.colors.keybind_hints, "blue");
    assert_eq!(base.logging.level, "debug");
    assert_eq!(base.display.date_format, "%Y-%m-%d");
}

#[test]
fn test_validate_config_valid() {
    ensure_colors_enabled();
    assert!(AppConfig::default().validate().is_ok());
}

#[test]
fn test_validate_config_invalid_version() {
    let config = AppConfig {
        version: "1.0".to_string(),
        ..Default::default()
    };
    assert!(config
        .validate()
        .unwrap_err()
        .to_string()
        .contains("Unsupported config version"));
}

#[test]
fn test_validate_config_zero_event_poll_interval() {
    let mut config = AppConfig::default();
    config.performance.event_poll_interval_ms = 0;
    assert!(config
        .validate()
        .unwrap_err()
        .to_string()
        .contains("event_poll_interval_ms must be greater than 0"));
}

#[test]
fn test_validate_rejects_bad_values() {
    ensure_colors_enabled();

    let mut config = AppConfig::default();
    config.theme.color_mode = "sepia".to_string();
    assert!(config.validate().unwrap_err().to_string().contains("color_mode"));

    let mut config = AppConfig::default();
    config.display.default_tab = "charts".to_string();
    assert!(config.validate().unwrap_err().to_string().contains("default_tab"));

    let mut config = AppConfig::default();
    config.theme.colors.severity_low = "chartreuse".to_string();
    assert!(config
        .validate()
        .unwrap_err()
        .to_string()
        .contains("severity_low"));

    let mut config = AppConfig::default();
    let duplicate = config.table.columns[0].clone();
    config.table.columns.push(duplicate);
    assert!(config
        .validate()
        .unwrap_err()
        .to_string()
        .contains("Duplicate column key 'id'"));

    let mut config = AppConfig::default();
    config.table.columns[4]
        .badge_colors
        .insert("Critical".to_string(), "not-a-color".to_string());
    assert!(config
        .validate()
        .unwrap_err()
        .to_string()
        .contains("Invalid badge color"));
}

#[test]
fn test_parse_table_columns_and_filters() {
    ensure_colors_enabled();
    let config: AppConfig = toml::from_str(
        r##"
[[table.columns]]
key = "ref"
field = "id"
header = "Ref"
width = 6

[[table.columns]]
key = "rate"
header = "Rate"
kind = "percentage"
decimals = 0
align = "right"

[[table.columns]]
key = "severity"
header = "Severity"
kind = "badge"
badge_colors = { High = "severity_high", Low = "#00ff00" }

[[table.filters]]
id = "severity"
label = "Severity"
type = "multi_select"
"##,
    )
    .expect("Config should parse");

    assert_eq!(config.table.columns.len(), 3);
    assert_eq!(config.table.columns[1].kind, ColumnKind::Percentage);
    assert_eq!(config.table.filters[0].kind, FilterKind::MultiSelect);
    assert!(config.validate().is_ok());

    let theme = Theme::from_config(&config.theme).unwrap();
    let table = config.table.build(&theme, &config.display).unwrap();
    assert_eq!(table.columns()[0].key, "ref");
    assert!(matches!(table.columns()[1].kind, CellKind::Percentage { decimals: 0 }));

    let row = Row::new().with("id", "T9").with("rate", 12.4).with("severity", "High");
    let rendered = table.render(&[&row], 1);
    let TableBody::Rows(body) = rendered.body else {
        panic!("expected rows");
    };
    assert_eq!(body[0][0].text, "T9");
    assert_eq!(body[0][1].text, "12%");
    assert_eq!(body[0][2].color, Some(Color::Indexed(208)));
}

#[test]
fn test_default_table_renders_tickets() {
    ensure_colors_enabled();
    let config = AppConfig::default();
    let theme = Theme::from_config(&config.theme).unwrap();
    let table = config.table.build(&theme, &config.display).unwrap();

    let row = Row::new()
        .with("id", "DEV-1")
        .with("severity", "Critical")
        .with("amount", 48250.0)
        .with("created", "2024-01-08");
    let rendered = table.render(&[&row], 12);
    assert_eq!(rendered.subtitle.as_deref(), Some("1 of 12 items shown"));

    let TableBody::Rows(body) = rendered.body else {
        panic!("expected rows");
    };
    let cells: Vec<&str> = body[0].iter().map(|c| c.text.as_str()).collect();
    assert_eq!(
        cells,
        vec![
            "DEV-1",
            PLACEHOLDER,
            PLACEHOLDER,
            PLACEHOLDER,
            "Critical",
            PLACEHOLDER,
            "€48,250.00",
            "2024-01-08"
        ]
    );
    assert_eq!(body[0][4].color, Some(Color::Red));
}

#[test]
fn test_empty_subtitle_and_static_subtitle() {
    ensure_colors_enabled();
    let mut config = AppConfig::default();
    let theme = Theme::from_config(&config.theme).unwrap();

    config.table.subtitle = String::new();
    let table = config.table.build(&theme, &config.display).unwrap();
    assert_eq!(table.render(&[], 0).subtitle, None);

    config.table.subtitle = "Q1 2024".to_string();
    let table = config.table.build(&theme, &config.display).unwrap();
    assert_eq!(table.render(&[], 0).subtitle.as_deref(), Some("Q1 2024"));
}
