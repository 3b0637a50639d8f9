//! Shared CLI definitions for the ROI cockpit.
//!
//! Used by the main application and by the build script (manpage).

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Top-level view shown on start
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum StartTab {
    /// Deviation ticket drilldown table
    Deviations,
    /// Sub-process by root-cause heatmap
    Heatmap,
}

impl StartTab {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deviations => "deviations",
            Self::Heatmap => "heatmap",
        }
    }
}

/// Command-line arguments for the cockpit
#[derive(Clone, Parser, Debug)]
#[command(
    name = "cockpit",
    version,
    about = "Financial-controls ROI cockpit in the terminal"
)]
pub struct Args {
    /// Path to the dataset (JSON with "tickets" and "heatmap" arrays).
    /// Not required with --generate-config.
    #[arg(required_unless_present = "generate_config", value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Read configuration from this file instead of ~/.config/cockpit/config.toml
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Tab to open on start (overrides config [display] default_tab)
    #[arg(long = "tab", value_enum)]
    pub tab: Option<StartTab>,

    /// Initial free-text search applied to the deviation table
    #[arg(long = "search", value_name = "TEXT")]
    pub search: Option<String>,

    /// Initial filter as ID=VALUE. Repeat the same ID to select several values of a multiselect filter.
    /// Example: --filter severity=High --filter status=Open
    #[arg(long = "filter", value_name = "ID=VALUE")]
    pub filter: Vec<String>,

    /// Write logs to this file (overrides config [logging] file)
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Enable debug mode to show operational information
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Generate default configuration file at ~/.config/cockpit/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}

impl Args {
    /// Split `--filter` arguments into (id, value) pairs. Malformed entries are returned as errors.
    pub fn filter_pairs(&self) -> Result<Vec<(String, String)>, String> {
        self.filter
            .iter()
            .map(|raw| match raw.split_once('=') {
                Some((id, value)) if !id.trim().is_empty() => {
                    Ok((id.trim().to_string(), value.trim().to_string()))
                }
                _ => Err(format!("Invalid --filter '{}': expected ID=VALUE", raw)),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_args_command_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_filter_pairs() {
        let args = Args::parse_from([
            "cockpit",
            "data.json",
            "--filter",
            "severity=High",
            "--filter",
            "status = Open",
        ]);
        assert_eq!(
            args.filter_pairs().unwrap(),
            vec![
                ("severity".to_string(), "High".to_string()),
                ("status".to_string(), "Open".to_string()),
            ]
        );
    }

    #[test]
    fn test_filter_pairs_rejects_missing_separator() {
        let args = Args::parse_from(["cockpit", "data.json", "--filter", "severity"]);
        assert!(args.filter_pairs().is_err());
    }

    #[test]
    fn test_path_optional_with_generate_config() {
        let args = Args::parse_from(["cockpit", "--generate-config", "--force"]);
        assert!(args.path.is_none());
        assert!(args.generate_config);
        assert!(args.force);
    }

    #[test]
    fn test_tab_value() {
        let args = Args::parse_from(["cockpit", "data.json", "--tab", "heatmap"]);
        assert_eq!(args.tab, Some(StartTab::Heatmap));
        assert_eq!(StartTab::Heatmap.as_str(), "heatmap");
    }
}
