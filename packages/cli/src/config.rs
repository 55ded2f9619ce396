//! Runtime configuration.
//!
//! A TOML file names the three boundary collections, the report form's
//! entry IDs, and the OCR languages. When no file is given, the copy embedded at
//! compile time from `config/default.toml` is used.

use std::path::Path;

use geostamp_ocr::TesseractRecognizer;
use geostamp_prefill::FormConfig;
use geostamp_spatial_models::LayerPaths;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_CONFIG: &str = include_str!("../config/default.toml");

/// Errors from reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration is not valid TOML or is missing fields.
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub layers: LayerPaths,
    pub form: FormConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
}

/// Text recognition settings (`[ocr]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract `-l` value: `eng`, `hin`, or `eng+hin`.
    pub languages: String,
    /// Retried with when the first attempt fails. Empty disables the
    /// retry.
    pub fallback_languages: String,
    pub page_segmentation_mode: u8,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: geostamp_ocr::DEFAULT_LANGUAGES.to_string(),
            fallback_languages: geostamp_ocr::FALLBACK_LANGUAGES.to_string(),
            page_segmentation_mode: 6,
        }
    }
}

impl OcrConfig {
    #[must_use]
    pub fn recognizer(&self) -> TesseractRecognizer {
        let fallback = Some(self.fallback_languages.as_str()).filter(|l| !l.is_empty());
        TesseractRecognizer::default()
            .with_languages(&self.languages)
            .with_fallback_languages(fallback)
            .with_page_segmentation_mode(self.page_segmentation_mode)
    }
}

impl Config {
    /// Loads `path`, or the embedded default when `path` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            log::debug!("Using embedded default config");
            return Self::from_toml(DEFAULT_CONFIG);
        };

        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        log::debug!("Using config from {}", path.display());

        Self::from_toml(&contents)
    }

    /// Parses configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the text is not a valid config.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}
