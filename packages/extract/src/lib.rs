#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Field extraction from GPS camera overlay text.
//!
//! "GPS Map Camera" style apps stamp each photo with a caption block:
//!
//! ```text
//! Bandra West, Mumbai, Maharashtra, India
//! Lat 19.070000° Long 72.870000°
//! 12/03/2024 10:15 AM GMT +05:30
//! ```
//!
//! After OCR the text is noisy, so every pattern here is lenient and
//! every field defaults to an empty string when nothing matches.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Labelled coordinates: `Lat 19.07 ... Long 72.87` (or `Latitude:` /
/// `Longitude=`).
static LAT_LON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)Lat(?:itude)?\s*[:=]?\s*([+-]?\d{1,2}\.\d+)[^\d\-+]+Long(?:itude)?\s*[:=]?\s*([+-]?\d{1,3}\.\d+)",
    )
    .expect("valid regex")
});

/// Date followed by a time, e.g. `12/03/2024 10:15 am`.
static DATE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2}[/-]\d{1,2}[/-]\d{2,4})\s+(\d{1,2}:\d{2}\s*(?:AM|PM)?)")
        .expect("valid regex")
});

/// A comma-separated address line ending in `India`.
static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([A-Za-z0-9 .,\-()]+,\s*[A-Za-z .]+,\s*India)").expect("valid regex")
});

/// Bare `lat, lon` decimal pair, used when the labelled form is missing.
static DECIMAL_PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([+-]?\d{1,2}\.\d+)[,\s]+([+-]?\d{1,3}\.\d+)").expect("valid regex")
});

/// Fields recognized in an overlay. Unrecognized fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub date: String,
    pub time: String,
    /// Latitude exactly as it appeared in the text.
    pub lat: String,
    /// Longitude exactly as it appeared in the text.
    pub lon: String,
    pub address: String,
}

impl ExtractedFields {
    /// Returns `(latitude, longitude)` when both were found and parse as
    /// numbers.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        if self.lat.is_empty() || self.lon.is_empty() {
            return None;
        }

        let lat = self.lat.parse::<f64>().ok()?;
        let lon = self.lon.parse::<f64>().ok()?;
        Some((lat, lon))
    }
}

/// Extracts all known fields from recognized text.
#[must_use]
pub fn extract_all(text: &str) -> ExtractedFields {
    let mut out = ExtractedFields::default();

    if let Some(caps) = LAT_LON_RE.captures(text) {
        out.lat = caps[1].to_string();
        out.lon = caps[2].to_string();
    }

    if let Some(caps) = DATE_TIME_RE.captures(text) {
        out.date = caps[1].to_string();
        out.time = caps[2].to_uppercase().replace("  ", " ");
    }

    // Captions often include a short place line above the full address;
    // the last match is the most complete one.
    if let Some(m) = ADDRESS_RE.find_iter(text).last() {
        out.address = m.as_str().trim().to_string();
    }

    if (out.lat.is_empty() || out.lon.is_empty())
        && let Some(caps) = DECIMAL_PAIR_RE.captures(text)
    {
        out.lat = caps[1].to_string();
        out.lon = caps[2].to_string();
    }

    log::debug!(
        "Extracted date={:?} time={:?} lat={:?} lon={:?} address={:?}",
        out.date,
        out.time,
        out.lat,
        out.lon,
        out.address
    );

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const OVERLAY: &str = "Mumbai, Maharashtra, India\n\
        Shop 4, Linking Road, Bandra West, Mumbai, Maharashtra, India\n\
        Lat 19.070000° Long 72.870000°\n\
        12/03/2024 10:15 am GMT +05:30\n";

    #[test]
    fn extracts_full_overlay() {
        let fields = extract_all(OVERLAY);
        assert_eq!(fields.lat, "19.070000");
        assert_eq!(fields.lon, "72.870000");
        assert_eq!(fields.date, "12/03/2024");
        assert_eq!(fields.time, "10:15 AM");
        assert_eq!(
            fields.address,
            "Shop 4, Linking Road, Bandra West, Mumbai, Maharashtra, India"
        );
        assert_eq!(fields.coordinates(), Some((19.07, 72.87)));
    }

    #[test]
    fn accepts_long_labels_and_separators() {
        let fields = extract_all("LATITUDE: -12.5 , LONGITUDE= +130.25");
        assert_eq!(fields.lat, "-12.5");
        assert_eq!(fields.lon, "+130.25");
        assert_eq!(fields.coordinates(), Some((-12.5, 130.25)));
    }

    #[test]
    fn falls_back_to_bare_decimal_pair() {
        let fields = extract_all("Pin 19.0760, 72.8777 near station");
        assert_eq!(fields.lat, "19.0760");
        assert_eq!(fields.lon, "72.8777");
    }

    #[test]
    fn time_is_uppercased_with_single_spaces() {
        let fields = extract_all("05-11-24 7:05  pm");
        assert_eq!(fields.date, "05-11-24");
        assert_eq!(fields.time, "7:05 PM");
    }

    #[test]
    fn time_without_meridiem() {
        let fields = extract_all("1/2/2025 23:59");
        assert_eq!(fields.date, "1/2/2025");
        assert_eq!(fields.time, "23:59");
    }

    #[test]
    fn empty_text_yields_empty_fields() {
        let fields = extract_all("");
        assert_eq!(fields, ExtractedFields::default());
        assert_eq!(fields.coordinates(), None);
    }

    #[test]
    fn coordinates_need_both_values() {
        let fields = ExtractedFields {
            lat: "19.07".to_string(),
            ..ExtractedFields::default()
        };
        assert_eq!(fields.coordinates(), None);
    }

    #[test]
    fn unparseable_coordinates_are_none() {
        let fields = ExtractedFields {
            lat: "19.0.7".to_string(),
            lon: "72.87".to_string(),
            ..ExtractedFields::default()
        };
        assert_eq!(fields.coordinates(), None);
    }

    #[test]
    fn serializes_with_lowercase_keys() {
        let json = serde_json::to_value(extract_all(OVERLAY)).unwrap();
        for key in ["date", "time", "lat", "lon", "address"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
