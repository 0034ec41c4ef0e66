pub mod batch;
pub mod config;
pub mod process;
pub mod summary;

use std::path::{Path, PathBuf};

use tracing::debug;

use remb_core::models::config::RembConfig;
use remb_core::{ExtractionPipeline, SourceDecoder};

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("remb")
        .join("config.json")
}

/// Load the config given on the command line, else the default config file
/// if one has been created, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<RembConfig> {
    let path = match config_path {
        Some(path) => PathBuf::from(path),
        None => default_config_path(),
    };
    resolve_config(&path, config_path.is_some())
}

fn resolve_config(path: &Path, explicit: bool) -> anyhow::Result<RembConfig> {
    if explicit || path.exists() {
        debug!("Loading config from {}", path.display());
        Ok(RembConfig::from_file(path)?)
    } else {
        Ok(RembConfig::default())
    }
}

/// Build the extraction pipeline described by `config`.
pub fn build_pipeline(config: &RembConfig) -> anyhow::Result<ExtractionPipeline> {
    let decoder = SourceDecoder::new().with_min_pdf_text_length(config.pdf.min_text_length);
    Ok(ExtractionPipeline::new()
        .with_marker(config.extraction.marker()?)
        .with_decoder(decoder))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existing_default_file_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut saved = RembConfig::default();
        saved.extraction.marker = "*".to_string();
        saved.save(&path).unwrap();

        let config = resolve_config(&path, false).unwrap();
        assert_eq!(config.extraction.marker, "*");
    }

    #[test]
    fn test_missing_default_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = resolve_config(&path, false).unwrap();
        assert_eq!(config.extraction.marker, "any");

        // An explicit path must exist
        assert!(resolve_config(&path, true).is_err());
    }
}
