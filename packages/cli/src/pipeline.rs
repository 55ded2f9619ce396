//! Photo -> text -> fields -> boundaries -> form link.
//!
//! The boundary index is only built once coordinates have been found,
//! since loading full boundary collections is the expensive step. A
//! photo without usable coordinates still produces a complete report,
//! just with empty boundary fields.
//!
//! Recognition and index loading block, so both run on tokio's blocking
//! pool.

use std::path::Path;
use std::sync::Arc;

use geostamp_extract::ExtractedFields;
use geostamp_ocr::{ImageSource, OcrError, TextRecognizer};
use geostamp_prefill::PrefillError;
use geostamp_spatial::{GeoIndex, SpatialError};
use geostamp_spatial_models::LookupResult;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

/// Errors that stop the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Neither an image nor a text file was given.
    #[error("No input: pass an image path or URL, or --text")]
    NoInput,

    /// Reading a text file failed.
    #[error("Failed to read text {path}: {source}")]
    Io {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Image loading or recognition failed.
    #[error(transparent)]
    Ocr(#[from] OcrError),

    /// Boundary layers could not be loaded.
    #[error(transparent)]
    Spatial(#[from] SpatialError),

    /// The form link could not be built.
    #[error(transparent)]
    Prefill(#[from] PrefillError),

    /// A blocking task panicked or was cancelled.
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Everything learned about one photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub extracted: ExtractedFields,
    pub geo: LookupResult,
    pub prefill_url: String,
}

/// Gets overlay text, either from an already-recognized text file or by
/// running `recognizer` over the image at `source`.
///
/// # Errors
///
/// Returns [`PipelineError`] if no input is given or it cannot be read
/// or recognized.
pub async fn acquire_text(
    source: Option<&str>,
    text_file: Option<&Path>,
    recognizer: Arc<dyn TextRecognizer>,
) -> Result<String, PipelineError> {
    if let Some(path) = text_file {
        log::info!("Reading recognized text from {}", path.display());
        return tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PipelineError::Io {
                path: path.display().to_string(),
                source: e,
            });
    }

    let source = ImageSource::parse(source.ok_or(PipelineError::NoInput)?);
    log::info!("Recognizing text in {source}");
    let image = source.load().await?;

    let text = tokio::task::spawn_blocking(move || recognizer.recognize(&image)).await??;

    Ok(text)
}

/// Resolves extracted coordinates against the boundary layers.
///
/// `load_index` is only called when both coordinates are present and
/// numeric. Out-of-range coordinates are reported and treated like
/// missing ones.
///
/// # Errors
///
/// Returns [`SpatialError`] if the index cannot be loaded.
pub fn resolve_geo<F>(fields: &ExtractedFields, load_index: F) -> Result<LookupResult, SpatialError>
where
    F: FnOnce() -> Result<GeoIndex, SpatialError>,
{
    let Some((lat, lon)) = fields.coordinates() else {
        log::warn!(
            "No usable coordinates found (lat={:?}, lon={:?}), skipping boundary lookup",
            fields.lat,
            fields.lon
        );
        return Ok(LookupResult::default());
    };

    if let Err(e) = geostamp_spatial::validate_coordinates(lat, lon) {
        log::warn!("{e}, skipping boundary lookup");
        return Ok(LookupResult::default());
    }

    load_index()?.lookup(lat, lon)
}

/// Builds the report for a block of recognized overlay text.
///
/// # Errors
///
/// Returns [`PipelineError`] if the boundary layers cannot be loaded or
/// the form link cannot be built.
pub async fn build_report(text: &str, config: &Config) -> Result<Report, PipelineError> {
    let extracted = geostamp_extract::extract_all(text);

    let fields = extracted.clone();
    let layers = config.layers.clone();
    let geo = tokio::task::spawn_blocking(move || {
        resolve_geo(&fields, || GeoIndex::load(&layers))
    })
    .await??;
    let prefill_url = geostamp_prefill::build_prefill_url(&config.form, &extracted, &geo)?;

    Ok(Report {
        extracted,
        geo,
        prefill_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn square_layer(dir: &Path, name: &str, properties: &serde_json::Value) -> std::path::PathBuf {
        let path = dir.join(name);
        let json = serde_json::json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[72.8, 19.0], [72.9, 19.0], [72.9, 19.1], [72.8, 19.1], [72.8, 19.0]]]
                },
                "properties": properties
            }]
        });
        fs::write(&path, json.to_string()).unwrap();
        path
    }

    fn config_for(dir: &Path) -> Config {
        let mut config = Config::load(None).unwrap();
        config.layers.wards = square_layer(dir, "wards.geojson", &serde_json::json!({"WARD": "A"}));
        config.layers.beats = square_layer(dir, "beats.geojson", &serde_json::json!({"BEAT_NO": "12"}));
        config.layers.jurisdiction =
            square_layer(dir, "ps.geojson", &serde_json::json!({"PS_NAME": "Central"}));
        config
    }

    fn fields(lat: &str, lon: &str) -> ExtractedFields {
        ExtractedFields {
            lat: lat.to_string(),
            lon: lon.to_string(),
            ..ExtractedFields::default()
        }
    }

    #[test]
    fn index_is_not_loaded_without_coordinates() {
        let result = resolve_geo(&fields("", "72.85"), || {
            panic!("index must not be loaded without coordinates")
        })
        .unwrap();
        assert_eq!(result, LookupResult::default());
    }

    #[test]
    fn index_is_not_loaded_for_out_of_range_coordinates() {
        let result = resolve_geo(&fields("200.0", "72.85"), || {
            panic!("index must not be loaded for invalid coordinates")
        })
        .unwrap();
        assert_eq!(result, LookupResult::default());
    }

    #[test]
    fn index_load_errors_propagate() {
        let err = resolve_geo(&fields("19.05", "72.85"), || {
            Err(SpatialError::Format {
                origin: "wards.geojson".to_string(),
                message: "no features array".to_string(),
            })
        })
        .unwrap_err();
        assert!(matches!(err, SpatialError::Format { .. }));
    }

    #[tokio::test]
    async fn full_report_from_overlay_text() {
        let tmp = std::env::temp_dir().join("geostamp_cli_pipeline_report");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();
        let config = config_for(&tmp);

        let text = "Fort, Mumbai, Maharashtra, India\nLat 19.05 Long 72.85\n12/03/2024 10:15 am";
        let report = build_report(text, &config).await.unwrap();

        assert_eq!(report.extracted.lat, "19.05");
        assert_eq!(report.extracted.address, "Fort, Mumbai, Maharashtra, India");
        assert_eq!(report.geo.ward, "A");
        assert_eq!(report.geo.beat_no, "12");
        assert_eq!(report.geo.ps_name, "Central");
        assert!(report.prefill_url.contains("entry.1625337207=A"));
        assert!(report.prefill_url.contains("entry.1555105834=Central"));
        assert!(report.prefill_url.ends_with("usp=pp_url"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["geo"]["BEAT_NO"], "12");
        assert!(json.get("prefill_url").is_some());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn report_without_coordinates_skips_geo() {
        let mut config = Config::load(None).unwrap();
        config.layers.wards = "/nonexistent/geostamp/wards.geojson".into();

        let report = build_report("no stamp here", &config).await.unwrap();
        assert_eq!(report.geo, LookupResult::default());
        assert!(report.prefill_url.contains("entry.1625337207=&"));
    }

    #[tokio::test]
    async fn missing_layer_file_fails_the_report() {
        let mut config = Config::load(None).unwrap();
        config.layers.wards = "/nonexistent/geostamp/wards.geojson".into();

        let err = build_report("Lat 19.05 Long 72.85", &config).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Spatial(SpatialError::Resource { .. })
        ));
    }

    struct FixedText(&'static str);

    impl TextRecognizer for FixedText {
        fn recognize(&self, _image: &[u8]) -> Result<String, OcrError> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn text_file_skips_recognition() {
        let tmp = std::env::temp_dir().join("geostamp_cli_pipeline_text");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();
        let path = tmp.join("overlay.txt");
        fs::write(&path, "Lat 19.05 Long 72.85").unwrap();

        let text = acquire_text(Some("ignored.jpg"), Some(&path), Arc::new(FixedText("from ocr")))
            .await
            .unwrap();
        assert_eq!(text, "Lat 19.05 Long 72.85");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn image_is_passed_to_recognizer() {
        let tmp = std::env::temp_dir().join("geostamp_cli_pipeline_image");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();
        let path = tmp.join("photo.jpg");
        fs::write(&path, b"jpeg").unwrap();

        let text = acquire_text(path.to_str(), None, Arc::new(FixedText("from ocr")))
            .await
            .unwrap();
        assert_eq!(text, "from ocr");

        let _ = fs::remove_dir_all(&tmp);
    }

    struct Failing;

    impl TextRecognizer for Failing {
        fn recognize(&self, _image: &[u8]) -> Result<String, OcrError> {
            Err(OcrError::Recognizer {
                message: "exit status: 1".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn recognizer_failure_propagates() {
        let tmp = std::env::temp_dir().join("geostamp_cli_pipeline_failing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();
        let path = tmp.join("photo.jpg");
        fs::write(&path, b"jpeg").unwrap();

        let err = acquire_text(path.to_str(), None, Arc::new(Failing))
            .await
            .unwrap_err();
        assert!(
            matches!(err, PipelineError::Ocr(OcrError::Recognizer { .. })),
            "{err}"
        );

        let _ = fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn no_input_is_an_error() {
        let err = acquire_text(None, None, Arc::new(FixedText("")))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::NoInput));
    }
}
