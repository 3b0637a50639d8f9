use std::path::{Path, PathBuf};

pub fn demo_dataset_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/deviations.json")
}
