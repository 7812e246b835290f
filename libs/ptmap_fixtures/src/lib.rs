//! Configuration fixtures shared by the `ptmap` tests and benchmarks.

use std::path::{Path, PathBuf};

pub const MAPPING_TOML: &str = "mapping.toml";
pub const MAPPING_JSON: &str = "mapping.json";
pub const PLAUSIBILITY_TOML: &str = "plausibility.toml";
pub const PLAUSIBILITY_INCOMPLETE_TOML: &str = "plausibility_incomplete.toml";
pub const UNSUPPORTED_YAML: &str = "mapping.yaml";

/// Resolves a fixture name to its absolute location within this crate's `resources/`.
pub fn fixture_path(file: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("resources")
        .join(file)
}
