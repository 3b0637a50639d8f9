use roi_cockpit::heatmap::{build_matrix, cell_visual, legend, HeatmapPalette, SizeTier};
use roi_cockpit::{Dataset, HeatmapCell, Severity};

mod common;

fn demo_dataset() -> Dataset {
    Dataset::load(&common::demo_dataset_path()).expect("demo dataset should load")
}

#[test]
fn test_first_seen_order_differs_from_alphabetical() {
    let cells = vec![
        HeatmapCell::new("B", "Y", 1, Some(Severity::Low)),
        HeatmapCell::new("A", "X", 2, Some(Severity::Medium)),
        HeatmapCell::new("B", "X", 3, Some(Severity::Medium)),
    ];
    let matrix = build_matrix(&cells);
    assert_eq!(matrix.rows, vec!["B", "A"]);
    assert_eq!(matrix.cols, vec!["Y", "X"]);
    assert_eq!(matrix.cell("A", "Y").count, 0);
}

#[test]
fn test_demo_heatmap_dimensions() {
    let matrix = build_matrix(&demo_dataset().heatmap);
    assert_eq!(
        matrix.rows,
        vec![
            "Vendor Onboarding",
            "Invoice Processing",
            "Payment Run",
            "Period Close"
        ]
    );
    assert_eq!(
        matrix.cols,
        vec![
            "Insufficient Process Capacity",
            "Manual Entry Error",
            "Missing Approval",
            "System Interface Failure"
        ]
    );
    assert_eq!(matrix.row_total("Vendor Onboarding"), 15);
    assert_eq!(matrix.col_total("Insufficient Process Capacity"), 14);
}

#[test]
fn test_lookup_present_and_missing_coordinates() {
    let palette = HeatmapPalette::default();
    let matrix = build_matrix(&demo_dataset().heatmap);

    let hot = matrix.cell("Vendor Onboarding", "Insufficient Process Capacity");
    assert_eq!(hot.count, 8);
    assert_eq!(hot.severity, Some(Severity::Critical));
    let visual = cell_visual(hot.count, hot.severity, &palette);
    assert_eq!(visual.tier, SizeTier::Largest);
    assert_eq!(visual.fill, Some(palette.critical));

    // Vendor Onboarding never failed on an interface
    let missing = matrix.cell("Vendor Onboarding", "System Interface Failure");
    assert_eq!(missing.count, 0);
    assert_eq!(missing.severity, None);
    let visual = cell_visual(missing.count, missing.severity, &palette);
    assert!(visual.is_empty());
    assert_eq!(visual.outline, palette.empty);
}

#[test]
fn test_build_matrix_is_idempotent() {
    let cells = demo_dataset().heatmap;
    assert_eq!(build_matrix(&cells), build_matrix(&cells));
}

#[test]
fn test_duplicate_coordinates_keep_last() {
    let cells = vec![
        HeatmapCell::new("A", "X", 2, Some(Severity::Medium)),
        HeatmapCell::new("A", "X", 9, Some(Severity::Critical)),
    ];
    let matrix = build_matrix(&cells);
    assert_eq!(matrix.rows.len(), 1);
    assert_eq!(matrix.cell("A", "X").count, 9);
    assert_eq!(matrix.cell("A", "X").severity, Some(Severity::Critical));
}

#[test]
fn test_unknown_severity_deserializes_to_none() {
    let dataset = Dataset::from_json(
        r#"{"heatmap": [
            {"subProcess": "A", "rootCause": "X", "count": 3, "severity": "Catastrophic"},
            {"sub_process": "B", "root_cause": "Y", "count": 1}
        ]}"#,
    )
    .expect("dataset should parse");
    assert_eq!(dataset.heatmap[0].severity, None);
    assert_eq!(dataset.heatmap[1].dim_a, "B");

    let matrix = build_matrix(&dataset.heatmap);
    let cell = matrix.cell("A", "X");
    assert_eq!(cell.count, 3);
    assert!(cell_visual(cell.count, cell.severity, &HeatmapPalette::default()).is_empty());
}

#[test]
fn test_legend_is_static() {
    let palette = HeatmapPalette::default();
    let entries = legend(&palette);
    let severities: Vec<Severity> = entries.iter().map(|e| e.severity).collect();
    assert_eq!(severities, Severity::ALL.to_vec());
    for entry in &entries {
        assert_eq!(entry.color, palette.color(entry.severity));
    }
}
