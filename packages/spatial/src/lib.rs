#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! In-memory spatial index for administrative boundary attribution.
//!
//! Loads the ward, police beat, and police-station jurisdiction polygon
//! layers from `GeoJSON` files and resolves a point to the containing
//! boundary in each. Layers are read-only once built, so a [`GeoIndex`]
//! can be shared across threads without locking.

pub mod geometry;
pub mod layer;

use geostamp_spatial_models::{LayerKind, LayerPaths, LookupResult};
use thiserror::Error;

pub use geometry::BoundaryGeometry;
pub use layer::{Attributes, Boundary, Layer};

/// Errors from loading boundary layers or querying the index.
#[derive(Debug, Error)]
pub enum SpatialError {
    /// The boundary collection file could not be read.
    #[error("Failed to read boundary collection {path}: {source}")]
    Resource {
        /// Path that caused the error.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The document is not a feature collection.
    #[error("Malformed boundary collection {origin}: {message}")]
    Format {
        /// File path or other name of the document.
        origin: String,
        /// Description of what went wrong.
        message: String,
    },

    /// A feature's geometry is not a usable polygon.
    #[error("Invalid geometry in {origin}, feature {index}: {message}")]
    Geometry {
        /// File path or other name of the document.
        origin: String,
        /// Zero-based position of the feature in the `features` array.
        index: usize,
        /// Description of what went wrong.
        message: String,
    },

    /// Latitude or longitude is out of range or not finite.
    #[error("Invalid coordinate: latitude {lat}, longitude {lon}")]
    InvalidCoordinate {
        /// Requested latitude.
        lat: f64,
        /// Requested longitude.
        lon: f64,
    },
}

/// Ward, beat, and jurisdiction layers queried together.
///
/// Each layer is scanned independently; a point outside every boundary
/// of a layer leaves that layer's field empty.
#[derive(Debug)]
pub struct GeoIndex {
    wards: Layer,
    beats: Layer,
    jurisdiction: Layer,
}

impl GeoIndex {
    /// Loads all three layers from disk.
    ///
    /// # Errors
    ///
    /// Returns the first layer's load error; the index is never built
    /// with a layer missing.
    pub fn load(paths: &LayerPaths) -> Result<Self, SpatialError> {
        let wards = Layer::load(paths.path(LayerKind::Ward))?;
        let beats = Layer::load(paths.path(LayerKind::Beat))?;
        let jurisdiction = Layer::load(paths.path(LayerKind::Jurisdiction))?;

        Ok(Self::from_layers(wards, beats, jurisdiction))
    }

    /// Builds an index from layers already in memory.
    #[must_use]
    pub const fn from_layers(wards: Layer, beats: Layer, jurisdiction: Layer) -> Self {
        Self {
            wards,
            beats,
            jurisdiction,
        }
    }

    #[must_use]
    pub const fn layer(&self, kind: LayerKind) -> &Layer {
        match kind {
            LayerKind::Ward => &self.wards,
            LayerKind::Beat => &self.beats,
            LayerKind::Jurisdiction => &self.jurisdiction,
        }
    }

    /// Resolves a point against every layer.
    ///
    /// Takes latitude first, as coordinates are usually written, but
    /// queries the point as (longitude, latitude).
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError::InvalidCoordinate`] if latitude is outside
    /// `[-90, 90]`, longitude is outside `[-180, 180]`, or either is not
    /// finite. No layer is scanned in that case.
    pub fn lookup(&self, lat: f64, lon: f64) -> Result<LookupResult, SpatialError> {
        validate_coordinates(lat, lon)?;

        let point = geo::Point::new(lon, lat);
        let mut result = LookupResult::default();

        for &kind in LayerKind::ALL {
            if let Some(boundary) = self.layer(kind).locate(point) {
                result.set(kind, boundary.attribute(kind.attribute_keys()));
            }
        }

        log::debug!(
            "Resolved ({lat}, {lon}) to ward={:?} beat={:?} ps={:?}",
            result.ward,
            result.beat_no,
            result.ps_name
        );

        Ok(result)
    }
}

/// Checks that a latitude/longitude pair is on the globe.
///
/// # Errors
///
/// Returns [`SpatialError::InvalidCoordinate`] if either value is out of
/// range or not finite.
pub fn validate_coordinates(lat: f64, lon: f64) -> Result<(), SpatialError> {
    if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) {
        Ok(())
    } else {
        Err(SpatialError::InvalidCoordinate { lat, lon })
    }
}
