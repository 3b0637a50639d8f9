use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::heatmap::HeatmapCell;
use crate::value::Row;

/// Rows and heatmap cells shown by the cockpit. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub title: String,
    pub tickets: Vec<Row>,
    pub heatmap: Vec<HeatmapCell>,
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| eyre!("Failed to read dataset at {}: {}", path.display(), e))?;
        let dataset = Self::from_json(&content)
            .map_err(|e| eyre!("Failed to parse dataset at {}: {}", path.display(), e))?;
        info!(
            "Loaded dataset {}: {} tickets, {} heatmap cells",
            path.display(),
            dataset.tickets.len(),
            dataset.heatmap.len()
        );
        Ok(dataset)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty() && self.heatmap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heatmap::Severity;
    use std::io::Write;

    #[test]
    fn test_load_dataset() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "title": "Q1 controls",
                "tickets": [{{"id": "T1", "severity": "High"}}],
                "heatmap": [{{"subProcess": "Vendor Onboarding", "rootCause": "Capacity", "count": 8, "severity": "Critical"}}]
            }}"#
        )
        .unwrap();
        let dataset = Dataset::load(file.path()).unwrap();
        assert_eq!(dataset.title, "Q1 controls");
        assert_eq!(dataset.tickets.len(), 1);
        assert_eq!(dataset.heatmap[0].severity, Some(Severity::Critical));
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let dataset = Dataset::from_json(r#"{"tickets": []}"#).unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_load_reports_path_on_error() {
        let err = Dataset::load(Path::new("does/not/exist.json")).unwrap_err();
        assert!(err.to_string().contains("does/not/exist.json"));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = Dataset::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse dataset"));
    }
}
