#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Image acquisition and text recognition.
//!
//! Photos arrive as a local path or an http(s) URL ([`ImageSource`]).
//! Their bytes are handed to a [`TextRecognizer`]; the default one runs
//! the `tesseract` command-line tool, which must be on `PATH`.

pub mod source;
pub mod tesseract;

use thiserror::Error;

pub use source::ImageSource;
pub use tesseract::{DEFAULT_LANGUAGES, FALLBACK_LANGUAGES, TesseractRecognizer, TextRecognizer};

/// Errors from loading an image or recognizing its text.
#[derive(Debug, Error)]
pub enum OcrError {
    /// A local file could not be read, or the recognizer process could
    /// not be started or fed.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// File path or program name involved.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The image download did not finish in time.
    #[error("Timed out after {seconds}s fetching {url}")]
    Timeout {
        /// Requested URL.
        url: String,
        /// Timeout that was exceeded.
        seconds: u64,
    },

    /// The image server answered with a non-success status.
    #[error("Fetching {url} failed with status {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The recognizer ran but reported failure.
    #[error("Text recognition failed: {message}")]
    Recognizer {
        /// Description of what went wrong.
        message: String,
    },
}
