//! Boundary layers loaded from `GeoJSON` `FeatureCollection` files.
//!
//! A [`Layer`] keeps its boundaries in document order and is never
//! mutated after loading. Lookups go through an R-tree of bounding
//! boxes first, then pick the earliest containing boundary, so the
//! answer is the same as scanning the list front to back.

use std::path::Path;

use geo::Point;
use rstar::{AABB, RTree, RTreeObject};

use crate::SpatialError;
use crate::geometry::BoundaryGeometry;

/// Feature properties attached to a boundary.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// One feature from a boundary collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    geometry: BoundaryGeometry,
    attributes: Attributes,
}

impl Boundary {
    #[must_use]
    pub const fn new(geometry: BoundaryGeometry, attributes: Attributes) -> Self {
        Self {
            geometry,
            attributes,
        }
    }

    #[must_use]
    pub const fn geometry(&self) -> &BoundaryGeometry {
        &self.geometry
    }

    #[must_use]
    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Returns the value of the first key in `keys` that is present,
    /// or an empty string if none are.
    ///
    /// Empty values fall through to the next key: `null`, `""`, `0`,
    /// and `false` are all treated as absent. Other numbers and `true`
    /// are rendered as their JSON text.
    #[must_use]
    pub fn attribute(&self, keys: &[&str]) -> String {
        keys.iter()
            .find_map(|key| self.attributes.get(*key).and_then(attribute_text))
            .unwrap_or_default()
    }
}

fn attribute_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        serde_json::Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// Bounding box of one boundary, tagged with its document position.
struct BoundaryEnvelope {
    position: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for BoundaryEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// An immutable, ordered collection of boundaries.
pub struct Layer {
    boundaries: Vec<Boundary>,
    envelopes: RTree<BoundaryEnvelope>,
}

impl std::fmt::Debug for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layer")
            .field("boundaries", &self.boundaries.len())
            .finish_non_exhaustive()
    }
}

impl Layer {
    /// Reads and parses a boundary collection file.
    ///
    /// The file is re-read on every call; nothing is cached.
    ///
    /// # Errors
    ///
    /// * [`SpatialError::Resource`] if the file cannot be read.
    /// * [`SpatialError::Format`] if it is not JSON or has no `features`
    ///   array.
    /// * [`SpatialError::Geometry`] if any feature's geometry is not a
    ///   usable polygon.
    pub fn load(path: &Path) -> Result<Self, SpatialError> {
        let origin = path.display().to_string();
        let contents = std::fs::read_to_string(path).map_err(|e| SpatialError::Resource {
            path: origin.clone(),
            source: e,
        })?;

        let layer = Self::from_geojson_str(&contents, &origin)?;
        log::info!("Loaded {} boundaries from {origin}", layer.len());

        Ok(layer)
    }

    /// Parses a boundary collection held in memory. `origin` names the
    /// document in error messages.
    ///
    /// # Errors
    ///
    /// Same as [`Layer::load`], minus [`SpatialError::Resource`].
    pub fn from_geojson_str(contents: &str, origin: &str) -> Result<Self, SpatialError> {
        let json: serde_json::Value =
            serde_json::from_str(contents).map_err(|e| SpatialError::Format {
                origin: origin.to_string(),
                message: format!("invalid JSON: {e}"),
            })?;

        Self::from_geojson_value(&json, origin)
    }

    /// Builds a layer from an already-parsed `FeatureCollection`.
    ///
    /// # Errors
    ///
    /// Same as [`Layer::from_geojson_str`].
    pub fn from_geojson_value(json: &serde_json::Value, origin: &str) -> Result<Self, SpatialError> {
        let features = json
            .get("features")
            .and_then(serde_json::Value::as_array)
            .ok_or_else(|| SpatialError::Format {
                origin: origin.to_string(),
                message: "no features array".to_string(),
            })?;

        let boundaries = features
            .iter()
            .enumerate()
            .map(|(index, feature)| parse_feature(feature, index, origin))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_boundaries(boundaries))
    }

    /// Builds a layer from boundaries in precedence order.
    #[must_use]
    pub fn from_boundaries(boundaries: Vec<Boundary>) -> Self {
        let envelopes = boundaries
            .iter()
            .enumerate()
            .filter_map(|(position, boundary)| {
                boundary
                    .geometry
                    .envelope()
                    .map(|envelope| BoundaryEnvelope { position, envelope })
            })
            .collect();

        Self {
            boundaries,
            envelopes: RTree::bulk_load(envelopes),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    /// Boundaries in document order.
    #[must_use]
    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    /// Finds the boundary containing `point` (longitude, latitude).
    ///
    /// When boundaries overlap, the one earliest in the document wins.
    #[must_use]
    pub fn locate(&self, point: Point<f64>) -> Option<&Boundary> {
        let query = AABB::from_point([point.x(), point.y()]);

        self.envelopes
            .locate_in_envelope_intersecting(&query)
            .map(|entry| entry.position)
            .filter(|&position| self.boundaries[position].geometry.contains(&point))
            .min()
            .map(|position| &self.boundaries[position])
    }
}

fn parse_feature(
    feature: &serde_json::Value,
    index: usize,
    origin: &str,
) -> Result<Boundary, SpatialError> {
    let geometry_error = |message: String| SpatialError::Geometry {
        origin: origin.to_string(),
        index,
        message,
    };

    if !feature.is_object() {
        return Err(SpatialError::Format {
            origin: origin.to_string(),
            message: format!("feature {index} is not an object: {feature}"),
        });
    }

    let geometry = feature
        .get("geometry")
        .ok_or_else(|| geometry_error("feature has no geometry".to_string()))?;
    let geometry = BoundaryGeometry::from_geojson(geometry).map_err(geometry_error)?;

    let attributes = match feature.get("properties") {
        None | Some(serde_json::Value::Null) => Attributes::new(),
        Some(serde_json::Value::Object(map)) => map.clone(),
        Some(other) => {
            return Err(SpatialError::Format {
                origin: origin.to_string(),
                message: format!("feature {index} has non-object properties: {other}"),
            });
        }
    };

    Ok(Boundary::new(geometry, attributes))
}
