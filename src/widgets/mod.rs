pub mod controls;
pub mod debug;
pub mod drilldown_table;
pub mod filter_panel;
pub mod heatmap;
pub mod record;
pub mod text_input;
