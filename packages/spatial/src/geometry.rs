//! Boundary geometry parsed from `GeoJSON`.
//!
//! Only areal geometries make sense as administrative boundaries, so a
//! [`BoundaryGeometry`] is either a single [`Polygon`] or a
//! [`MultiPolygon`]. Anything else is rejected at load time rather than
//! coerced into an empty shape.
//!
//! Containment is boundary-inclusive: a point exactly on an edge or a
//! vertex counts as inside. Administrative lines often run down the
//! middle of a street, and the owning layer's first-match rule then
//! decides which of the two neighbours gets the point.

use geo::{Area, BoundingRect, Intersects, MultiPolygon, Point, Polygon, Rect};
use rstar::AABB;

/// Minimum number of positions in a closed linear ring.
const MIN_RING_POSITIONS: usize = 4;

/// A polygonal boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryGeometry {
    /// One exterior ring, optionally with holes.
    Polygon(Polygon<f64>),
    /// Several disjoint polygons treated as one boundary.
    MultiPolygon(MultiPolygon<f64>),
}

impl BoundaryGeometry {
    /// Parses a `GeoJSON` geometry object.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the value is not a
    /// well-formed, non-empty `Polygon` or `MultiPolygon`.
    pub fn from_geojson(value: &serde_json::Value) -> Result<Self, String> {
        if value.is_null() {
            return Err("geometry is null".to_string());
        }

        if let Some(kind) = value.get("type").and_then(serde_json::Value::as_str)
            && !matches!(kind, "Polygon" | "MultiPolygon")
        {
            return Err(format!("expected Polygon or MultiPolygon, found {kind}"));
        }

        let geometry = geojson::Geometry::from_json_value(value.clone())
            .map_err(|e| format!("not a GeoJSON geometry: {e}"))?;
        let geometry: geo::Geometry<f64> = geometry
            .try_into()
            .map_err(|e: geojson::Error| format!("unsupported geometry: {e}"))?;

        Self::try_from(geometry)
    }

    /// Returns `true` if `point` lies inside the boundary or on its edge.
    ///
    /// `point` must be in (longitude, latitude) order.
    #[must_use]
    pub fn contains(&self, point: &Point<f64>) -> bool {
        match self {
            Self::Polygon(polygon) => polygon.intersects(point),
            Self::MultiPolygon(multi) => multi.intersects(point),
        }
    }

    /// Axis-aligned bounding box of the boundary.
    #[must_use]
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        match self {
            Self::Polygon(polygon) => polygon.bounding_rect(),
            Self::MultiPolygon(multi) => multi.bounding_rect(),
        }
    }

    /// Bounding box as an R-tree envelope.
    pub(crate) fn envelope(&self) -> Option<AABB<[f64; 2]>> {
        self.bounding_rect().map(|rect| {
            AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y])
        })
    }
}

impl TryFrom<geo::Geometry<f64>> for BoundaryGeometry {
    type Error = String;

    fn try_from(geometry: geo::Geometry<f64>) -> Result<Self, Self::Error> {
        let boundary = match geometry {
            geo::Geometry::Polygon(polygon) => {
                validate_polygon(&polygon)?;
                Self::Polygon(polygon)
            }
            geo::Geometry::MultiPolygon(multi) => {
                if multi.0.is_empty() {
                    return Err("MultiPolygon has no polygons".to_string());
                }
                for polygon in &multi.0 {
                    validate_polygon(polygon)?;
                }
                Self::MultiPolygon(multi)
            }
            _ => return Err("expected Polygon or MultiPolygon".to_string()),
        };

        Ok(boundary)
    }
}

/// Rejects polygons whose rings are too short to enclose any area, or
/// that enclose none (collinear or repeated positions).
fn validate_polygon(polygon: &Polygon<f64>) -> Result<(), String> {
    let exterior = polygon.exterior().0.len();
    if exterior < MIN_RING_POSITIONS {
        return Err(format!(
            "exterior ring has {exterior} positions, need at least {MIN_RING_POSITIONS}"
        ));
    }

    for (i, hole) in polygon.interiors().iter().enumerate() {
        if hole.0.len() < MIN_RING_POSITIONS {
            return Err(format!(
                "interior ring {i} has {} positions, need at least {MIN_RING_POSITIONS}",
                hole.0.len()
            ));
        }
    }

    let area = polygon.unsigned_area();
    if !area.is_finite() || area <= 0.0 {
        return Err(format!("polygon encloses no area (area {area})"));
    }

    Ok(())
}
