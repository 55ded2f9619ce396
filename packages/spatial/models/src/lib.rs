#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Administrative boundary layer types.
//!
//! Three independent partitioning schemes cover the same area: municipal
//! wards, police beats, and police-station jurisdictions. Each is loaded
//! as its own layer, and a point lookup produces one [`LookupResult`]
//! with a field per layer.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Which administrative layer a boundary belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// Municipal ward boundaries.
    Ward,
    /// Police beat boundaries.
    Beat,
    /// Police-station jurisdiction boundaries.
    Jurisdiction,
}

impl LayerKind {
    /// All layer kinds, in lookup order.
    pub const ALL: &[Self] = &[Self::Ward, Self::Beat, Self::Jurisdiction];

    /// Feature property keys tried, in order, when reading this layer's
    /// value from a matched boundary. The first present key wins.
    #[must_use]
    pub const fn attribute_keys(self) -> &'static [&'static str] {
        match self {
            Self::Ward => &["WARD", "name"],
            Self::Beat => &["BEAT_NO", "name"],
            Self::Jurisdiction => &["PS_NAME", "name"],
        }
    }

    /// Key this layer populates in a serialized [`LookupResult`].
    #[must_use]
    pub const fn output_key(self) -> &'static str {
        match self {
            Self::Ward => "WARD",
            Self::Beat => "BEAT_NO",
            Self::Jurisdiction => "PS_NAME",
        }
    }
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Ward => "ward",
            Self::Beat => "beat",
            Self::Jurisdiction => "jurisdiction",
        })
    }
}

/// The fixed-shape result of resolving one point against all three
/// layers.
///
/// A layer with no containing boundary leaves its field as an empty
/// string; fields are never absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LookupResult {
    /// Ward name or number.
    #[serde(rename = "WARD")]
    pub ward: String,
    /// Police beat number.
    #[serde(rename = "BEAT_NO")]
    pub beat_no: String,
    /// Police station name.
    #[serde(rename = "PS_NAME")]
    pub ps_name: String,
}

impl LookupResult {
    /// Returns the field populated by `kind`.
    #[must_use]
    pub fn get(&self, kind: LayerKind) -> &str {
        match kind {
            LayerKind::Ward => &self.ward,
            LayerKind::Beat => &self.beat_no,
            LayerKind::Jurisdiction => &self.ps_name,
        }
    }

    /// Sets the field populated by `kind`.
    pub fn set(&mut self, kind: LayerKind, value: String) {
        match kind {
            LayerKind::Ward => self.ward = value,
            LayerKind::Beat => self.beat_no = value,
            LayerKind::Jurisdiction => self.ps_name = value,
        }
    }
}

/// Locations of the three boundary-collection files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerPaths {
    /// Ward `FeatureCollection`.
    pub wards: PathBuf,
    /// Beat `FeatureCollection`.
    pub beats: PathBuf,
    /// Police-station jurisdiction `FeatureCollection`.
    pub jurisdiction: PathBuf,
}

impl LayerPaths {
    /// Returns the path configured for `kind`.
    #[must_use]
    pub fn path(&self, kind: LayerKind) -> &std::path::Path {
        match kind {
            LayerKind::Ward => self.wards.as_path(),
            LayerKind::Beat => self.beats.as_path(),
            LayerKind::Jurisdiction => self.jurisdiction.as_path(),
        }
    }
}
