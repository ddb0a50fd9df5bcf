// Loader Configuration
// The input directory and output file are fixed by convention; the binary
// only ever overrides them when given explicit paths.

use crate::builders::LoaderConfigBuilder;
use std::path::{Path, PathBuf};

/// Directory scanned for `<day>/.../*.bz2` benchmark logs
pub const DEFAULT_INPUT_DIR: &str = "data";

/// File the JSON report is written to
pub const DEFAULT_OUTPUT_FILE: &str = "data.js";

/// Settings for one loader run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    pub input_dir: PathBuf,
    pub output_file: PathBuf,
    /// Parse files on the rayon pool; the report is identical either way
    pub parallel: bool,
}

impl LoaderConfig {
    pub fn builder() -> LoaderConfigBuilder {
        LoaderConfigBuilder::new()
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn output_file(&self) -> &Path {
        &self.output_file
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            parallel: false,
        }
    }
}
