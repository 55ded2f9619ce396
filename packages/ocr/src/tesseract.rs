//! Text recognition through the `tesseract` CLI.

use std::io::Write as _;
use std::process::{Command, Stdio};

use crate::OcrError;

/// Languages used unless configured otherwise. Camera stamps from Indian
/// GPS apps mix Latin and Devanagari script.
pub const DEFAULT_LANGUAGES: &str = "eng+hin";

/// Languages retried with when the first attempt fails, e.g. because the
/// Hindi traineddata is not installed.
pub const FALLBACK_LANGUAGES: &str = "eng";

/// Turns image bytes into recognized text.
pub trait TextRecognizer: Send + Sync {
    /// Recognizes all text in an encoded image (JPEG, PNG, ...).
    ///
    /// # Errors
    ///
    /// Returns [`OcrError`] if recognition cannot be performed.
    fn recognize(&self, image: &[u8]) -> Result<String, OcrError>;
}

/// Runs `tesseract stdin stdout -l <languages> --psm <mode>`.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    program: String,
    leading_args: Vec<String>,
    languages: String,
    fallback_languages: Option<String>,
    page_segmentation_mode: u8,
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        // Mode 6 treats the image as one uniform block of text, which
        // suits a stamped caption better than full page layout analysis.
        Self {
            program: "tesseract".to_string(),
            leading_args: Vec::new(),
            languages: DEFAULT_LANGUAGES.to_string(),
            fallback_languages: Some(FALLBACK_LANGUAGES.to_string()),
            page_segmentation_mode: 6,
        }
    }
}

impl TesseractRecognizer {
    /// Uses a different executable, e.g. an absolute path.
    #[must_use]
    pub fn with_program(mut self, program: &str) -> Self {
        program.clone_into(&mut self.program);
        self
    }

    /// Runs tesseract through a wrapper, e.g. `docker run ... tesseract`.
    /// `leading_args` go before the recognizer's own arguments.
    #[must_use]
    pub fn with_command(mut self, program: &str, leading_args: &[&str]) -> Self {
        program.clone_into(&mut self.program);
        self.leading_args = leading_args.iter().map(ToString::to_string).collect();
        self
    }

    /// Sets the `-l` language list, e.g. `eng`, `hin`, or `eng+hin`.
    #[must_use]
    pub fn with_languages(mut self, languages: &str) -> Self {
        languages.clone_into(&mut self.languages);
        self
    }

    /// Sets the languages retried with after a failed first attempt.
    /// `None` disables the retry.
    #[must_use]
    pub fn with_fallback_languages(mut self, languages: Option<&str>) -> Self {
        self.fallback_languages = languages.map(ToString::to_string);
        self
    }

    #[must_use]
    pub const fn with_page_segmentation_mode(mut self, mode: u8) -> Self {
        self.page_segmentation_mode = mode;
        self
    }

    #[must_use]
    pub fn languages(&self) -> &str {
        &self.languages
    }

    /// Full argument list for one run with `languages`.
    fn args(&self, languages: &str) -> Vec<String> {
        let mut args = self.leading_args.clone();
        args.extend([
            "stdin".to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            languages.to_string(),
            "--psm".to_string(),
            self.page_segmentation_mode.to_string(),
        ]);
        args
    }

    fn run(&self, image: &[u8], languages: &str) -> Result<String, OcrError> {
        let io_error = |source: std::io::Error| OcrError::Io {
            path: self.program.clone(),
            source,
        };

        log::debug!(
            "Running {} on {} bytes (languages {languages}, psm {})",
            self.program,
            image.len(),
            self.page_segmentation_mode
        );

        let mut child = Command::new(&self.program)
            .args(self.args(languages))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(io_error)?;

        // tesseract reads the whole image before writing anything, so
        // feeding stdin before collecting stdout cannot deadlock.
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(image).map_err(io_error)?;
        }

        let output = child.wait_with_output().map_err(io_error)?;

        if !output.status.success() {
            return Err(OcrError::Recognizer {
                message: format!(
                    "{} exited with {}: {}",
                    self.program,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        log::info!("Recognized {} characters of text", text.len());

        Ok(text)
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, image: &[u8]) -> Result<String, OcrError> {
        let err = match self.run(image, &self.languages) {
            Ok(text) => return Ok(text),
            Err(e) => e,
        };

        match self.fallback_languages.as_deref() {
            Some(fallback) if fallback != self.languages => {
                log::warn!(
                    "Recognition with {} failed ({err}), retrying with {fallback}",
                    self.languages
                );
                self.run(image, fallback)
            }
            _ => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Script that fails unless asked for English only. Under `sh -c`
    /// the recognizer's arguments start at `$0`, so `$3` is the `-l`
    /// value.
    const ENGLISH_ONLY: &str =
        r#"cat >/dev/null; if [ "$3" = eng ]; then echo fallback; else echo "no $3 data" >&2; exit 1; fi"#;

    #[test]
    fn args_carry_languages_and_mode() {
        let recognizer = TesseractRecognizer::default();
        assert_eq!(recognizer.languages(), "eng+hin");
        assert_eq!(
            recognizer.args("eng+hin"),
            ["stdin", "stdout", "-l", "eng+hin", "--psm", "6"]
        );

        let recognizer = TesseractRecognizer::default()
            .with_command("docker", &["run", "-i", "tesseract"])
            .with_page_segmentation_mode(7);
        assert_eq!(
            recognizer.args("hin"),
            ["run", "-i", "tesseract", "stdin", "stdout", "-l", "hin", "--psm", "7"]
        );
    }

    #[test]
    fn missing_program_is_io_error() {
        let recognizer =
            TesseractRecognizer::default().with_program("geostamp-no-such-tesseract-binary");
        let err = recognizer.recognize(b"not an image").unwrap_err();
        assert!(matches!(err, OcrError::Io { .. }), "{err}");
    }

    #[cfg(unix)]
    #[test]
    fn failing_program_is_recognizer_error() {
        let recognizer = TesseractRecognizer::default()
            .with_command("sh", &["-c", "cat >/dev/null; exit 3"]);
        match recognizer.recognize(b"jpeg") {
            Err(OcrError::Recognizer { message }) => {
                assert!(message.contains("exit status: 3"), "{message}");
            }
            other => panic!("expected recognizer error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn first_attempt_uses_configured_languages() {
        let recognizer = TesseractRecognizer::default()
            .with_command("sh", &["-c", r#"cat >/dev/null; echo "$2 $3""#]);
        let text = recognizer.recognize(b"jpeg").unwrap();
        assert_eq!(text.trim(), "-l eng+hin");
    }

    #[cfg(unix)]
    #[test]
    fn failed_attempt_is_retried_in_english() {
        let recognizer = TesseractRecognizer::default().with_command("sh", &["-c", ENGLISH_ONLY]);
        let text = recognizer.recognize(b"jpeg").unwrap();
        assert_eq!(text.trim(), "fallback");
    }

    #[cfg(unix)]
    #[test]
    fn retry_can_be_disabled() {
        let recognizer = TesseractRecognizer::default()
            .with_command("sh", &["-c", ENGLISH_ONLY])
            .with_fallback_languages(None);
        match recognizer.recognize(b"jpeg") {
            Err(OcrError::Recognizer { message }) => {
                assert!(message.contains("no eng+hin data"), "{message}");
            }
            other => panic!("expected recognizer error, got {other:?}"),
        }
    }
}
