#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Prefilled report form links.
//!
//! The incident report form is an external web form that accepts
//! initial answers as query parameters keyed by opaque entry IDs
//! (`entry.1911996449=...`). The form's schema is owned by someone else
//! and changes, so the entry IDs are configuration ([`FormConfig`]) and
//! this crate only knows which value goes with which [`FormField`].

use geostamp_extract::ExtractedFields;
use geostamp_spatial_models::LookupResult;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default form URL template. `{form_id}` is replaced with
/// [`FormConfig::form_id`].
pub const DEFAULT_BASE_URL: &str = "https://docs.google.com/forms/d/e/{form_id}/viewform";

/// Errors from building a form link.
#[derive(Debug, Error)]
pub enum PrefillError {
    /// The configured base URL is not a valid absolute URL.
    #[error("Invalid form URL {url}: {message}")]
    Url {
        /// URL after `{form_id}` substitution.
        url: String,
        /// Parser error description.
        message: String,
    },
}

/// A question on the report form, in the order parameters are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Date,
    Time,
    Longitude,
    Latitude,
    Ward,
    Beat,
    Address,
    PoliceStation,
}

impl FormField {
    pub const ALL: &[Self] = &[
        Self::Date,
        Self::Time,
        Self::Longitude,
        Self::Latitude,
        Self::Ward,
        Self::Beat,
        Self::Address,
        Self::PoliceStation,
    ];

    /// Picks this field's answer from the extracted overlay fields or
    /// the boundary lookup.
    #[must_use]
    pub fn value<'a>(self, fields: &'a ExtractedFields, geo: &'a LookupResult) -> &'a str {
        match self {
            Self::Date => &fields.date,
            Self::Time => &fields.time,
            Self::Longitude => &fields.lon,
            Self::Latitude => &fields.lat,
            Self::Ward => &geo.ward,
            Self::Beat => &geo.beat_no,
            Self::Address => &fields.address,
            Self::PoliceStation => &geo.ps_name,
        }
    }
}

/// Entry ID for each form question. Missing or empty IDs are skipped
/// when building the link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormEntries {
    pub date: Option<String>,
    pub time: Option<String>,
    pub lon: Option<String>,
    pub lat: Option<String>,
    pub ward: Option<String>,
    pub beat: Option<String>,
    pub address: Option<String>,
    pub police: Option<String>,
}

impl FormEntries {
    /// Returns the configured entry ID for `field`, if any.
    #[must_use]
    pub fn get(&self, field: FormField) -> Option<&str> {
        let entry = match field {
            FormField::Date => &self.date,
            FormField::Time => &self.time,
            FormField::Longitude => &self.lon,
            FormField::Latitude => &self.lat,
            FormField::Ward => &self.ward,
            FormField::Beat => &self.beat,
            FormField::Address => &self.address,
            FormField::PoliceStation => &self.police,
        };
        entry.as_deref().filter(|id| !id.is_empty())
    }
}

/// Target form and its entry ID mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormConfig {
    /// URL template for the form's view page.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Published form identifier.
    pub form_id: String,
    #[serde(default)]
    pub entries: FormEntries,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl FormConfig {
    /// The form's view URL with the form ID filled in.
    #[must_use]
    pub fn form_url(&self) -> String {
        self.base_url.replace("{form_id}", &self.form_id)
    }
}

/// Builds the prefilled form link.
///
/// Parameters follow [`FormField::ALL`] order and end with
/// `usp=pp_url`, the flag that tells the form to show prefilled answers.
/// Values are form-urlencoded, so spaces become `+`.
///
/// # Errors
///
/// Returns [`PrefillError::Url`] if the configured form URL cannot be
/// parsed.
pub fn build_prefill_url(
    config: &FormConfig,
    fields: &ExtractedFields,
    geo: &LookupResult,
) -> Result<String, PrefillError> {
    let form_url = config.form_url();
    let mut url = reqwest::Url::parse(&form_url).map_err(|e| PrefillError::Url {
        url: form_url.clone(),
        message: e.to_string(),
    })?;

    {
        let mut query = url.query_pairs_mut();
        for &field in FormField::ALL {
            let Some(entry) = config.entries.get(field) else {
                log::warn!("No form entry configured for {field:?}, leaving it out of the link");
                continue;
            };
            query.append_pair(entry, field.value(fields, geo));
        }
        query.append_pair("usp", "pp_url");
    }

    Ok(url.into())
}
