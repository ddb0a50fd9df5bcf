// Builder Patterns
// Fluent construction of loader settings with the fixed defaults filled in.

use crate::config::{LoaderConfig, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_FILE};
use anyhow::{ensure, Result};
use std::path::PathBuf;

/// Fluent builder for [`LoaderConfig`]
pub struct LoaderConfigBuilder {
    input_dir: PathBuf,
    output_file: PathBuf,
    parallel: bool,
}

impl LoaderConfigBuilder {
    /// Create a builder preloaded with the default paths
    pub fn new() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            parallel: false,
        }
    }

    /// Set the directory scanned for benchmark logs
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = dir.into();
        self
    }

    /// Set the report destination
    pub fn output_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.output_file = file.into();
        self
    }

    /// Enable/disable parallel file parsing
    pub fn parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<LoaderConfig> {
        ensure!(
            !self.input_dir.as_os_str().is_empty(),
            "Input directory cannot be empty"
        );
        ensure!(
            !self.output_file.as_os_str().is_empty(),
            "Output file cannot be empty"
        );
        ensure!(
            self.output_file.file_name().is_some(),
            "Output file must name a file: {}",
            self.output_file.display()
        );

        Ok(LoaderConfig {
            input_dir: self.input_dir,
            output_file: self.output_file,
            parallel: self.parallel,
        })
    }
}

impl Default for LoaderConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_builder_defaults() {
        let config = LoaderConfigBuilder::new().build().unwrap();
        assert_eq!(config, LoaderConfig::default());
    }

    #[test]
    fn test_builder_overrides() {
        let config = LoaderConfig::builder()
            .input_dir("/tmp/bench")
            .output_file("/tmp/out.js")
            .parallel(true)
            .build()
            .unwrap();
        assert_eq!(config.input_dir(), Path::new("/tmp/bench"));
        assert_eq!(config.output_file(), Path::new("/tmp/out.js"));
        assert!(config.parallel);
    }

    #[test]
    fn test_builder_rejects_empty_paths() {
        assert!(LoaderConfigBuilder::new().input_dir("").build().is_err());
        assert!(LoaderConfigBuilder::new().output_file("").build().is_err());
        assert!(LoaderConfigBuilder::new().output_file("out/..").build().is_err());
    }
}
