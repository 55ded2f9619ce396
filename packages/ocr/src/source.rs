//! Where a photo comes from.

use std::path::PathBuf;
use std::time::Duration;

use crate::OcrError;

/// Upper bound on a whole image download, connect through last byte.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// A photo to read, either on disk or behind a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    Url(String),
}

impl ImageSource {
    /// Interprets a command-line argument. Anything starting with `http`
    /// is treated as a URL; everything else is a file path.
    #[must_use]
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http") {
            Self::Url(source.to_string())
        } else {
            Self::Path(PathBuf::from(source))
        }
    }

    /// Reads the image bytes.
    ///
    /// # Errors
    ///
    /// * [`OcrError::Io`] if a local file cannot be read.
    /// * [`OcrError::Timeout`] if a download exceeds [`FETCH_TIMEOUT`].
    /// * [`OcrError::Status`] if the server answers with an error status.
    /// * [`OcrError::Http`] for any other request failure.
    pub async fn load(&self) -> Result<Vec<u8>, OcrError> {
        match self {
            Self::Path(path) => tokio::fs::read(path).await.map_err(|e| OcrError::Io {
                path: path.display().to_string(),
                source: e,
            }),
            Self::Url(url) => fetch(url, FETCH_TIMEOUT).await,
        }
    }
}

impl std::fmt::Display for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

async fn fetch(url: &str, timeout: Duration) -> Result<Vec<u8>, OcrError> {
    let client = reqwest::Client::builder().timeout(timeout).build()?;

    log::info!("Downloading image from {url}");
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify(url, timeout, e))?;

    if !resp.status().is_success() {
        return Err(OcrError::Status {
            url: url.to_string(),
            status: resp.status().as_u16(),
        });
    }

    let bytes = resp.bytes().await.map_err(|e| classify(url, timeout, e))?;
    log::debug!("Downloaded {} bytes from {url}", bytes.len());

    Ok(bytes.to_vec())
}

/// Separates timeouts from other request failures.
fn classify(url: &str, timeout: Duration, e: reqwest::Error) -> OcrError {
    if e.is_timeout() {
        OcrError::Timeout {
            url: url.to_string(),
            seconds: timeout.as_secs(),
        }
    } else {
        OcrError::Http(e)
    }
}
