use serde::Deserialize;
use serde::de::IgnoredAny;
use thiserror::Error;

/// Geographic position (longitude, latitude-like), always finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

pub type Ring = Vec<Point>;

/// One polygon: ring 0 is the outer boundary, any further rings are drawn as
/// extra sub-paths of the same fill.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub rings: Vec<Ring>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
}

impl Geometry {
    pub fn polygons(&self) -> &[Polygon] {
        match self {
            Self::Polygon(polygon) => std::slice::from_ref(polygon),
            Self::MultiPolygon(polygons) => polygons,
        }
    }

    pub fn rings(&self) -> impl Iterator<Item = &Ring> {
        self.polygons().iter().flat_map(|polygon| polygon.rings.iter())
    }

    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.rings().flat_map(|ring| ring.iter())
    }
}

/// One municipality's named geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub name: String,
    pub area_code: Option<u64>,
    pub geometry: Geometry,
}

impl Feature {
    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.geometry.points()
    }
}

/// Ordered features. Order fixes fill colors and click precedence.
///
/// Deserializes straight from a GeoJSON `FeatureCollection`; malformed
/// geometry is rejected here rather than during projection or rendering.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(try_from = "RawFeatureCollection")]
pub struct FeatureCollection {
    features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn from_geojson_str(json: &str) -> Result<Self, DataError> {
        let raw: RawFeatureCollection =
            serde_json::from_str(json).map_err(|e| DataError::Json(e.to_string()))?;
        Self::try_from(raw)
    }

    pub fn from_geojson_slice(json: &[u8]) -> Result<Self, DataError> {
        let raw: RawFeatureCollection =
            serde_json::from_slice(json).map_err(|e| DataError::Json(e.to_string()))?;
        Self::try_from(raw)
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn get(&self, index: usize) -> Option<&Feature> {
        self.features.get(index)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.features.iter()
    }

    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.features.iter().flat_map(Feature::points)
    }
}

impl<'a> IntoIterator for &'a FeatureCollection {
    type Item = &'a Feature;
    type IntoIter = std::slice::Iter<'a, Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    #[error("invalid JSON: {0}")]
    Json(String),
    #[error("feature {index} ({name:?}) has no geometry")]
    MissingGeometry { index: usize, name: String },
    #[error("feature {index} ({name:?}): {reason}")]
    MalformedGeometry {
        index: usize,
        name: String,
        reason: String,
    },
}

// Wire shapes. Positions stay as plain number arrays until validated so that
// altitude components and bad lengths produce a readable error.

#[derive(Debug, Deserialize)]
struct RawFeatureCollection {
    features: Vec<RawFeature>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    properties: RawProperties,
    #[serde(default)]
    geometry: Option<RawGeometry>,
}

#[derive(Debug, Deserialize)]
struct RawProperties {
    name: String,
    #[serde(default)]
    codarea: Option<RawAreaCode>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAreaCode {
    Number(u64),
    Text(String),
    Other(IgnoredAny),
}

impl RawAreaCode {
    fn parse(self) -> Option<u64> {
        match self {
            Self::Number(code) => Some(code),
            Self::Text(text) => text.trim().parse().ok(),
            Self::Other(_) => None,
        }
    }
}

type RawRing = Vec<Vec<f64>>;

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum RawGeometry {
    Polygon { coordinates: Vec<RawRing> },
    MultiPolygon { coordinates: Vec<Vec<RawRing>> },
}

impl TryFrom<RawFeatureCollection> for FeatureCollection {
    type Error = DataError;

    fn try_from(raw: RawFeatureCollection) -> Result<Self, Self::Error> {
        let features = raw
            .features
            .into_iter()
            .enumerate()
            .map(|(index, feature)| validate_feature(index, feature))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { features })
    }
}

fn validate_feature(index: usize, raw: RawFeature) -> Result<Feature, DataError> {
    let name = raw.properties.name;
    let area_code = raw.properties.codarea.and_then(RawAreaCode::parse);
    let Some(geometry) = raw.geometry else {
        return Err(DataError::MissingGeometry { index, name });
    };

    let malformed = |reason: String| DataError::MalformedGeometry {
        index,
        name: name.clone(),
        reason,
    };

    let geometry = match geometry {
        RawGeometry::Polygon { coordinates } => {
            Geometry::Polygon(validate_polygon(coordinates).map_err(malformed)?)
        }
        RawGeometry::MultiPolygon { coordinates } => {
            if coordinates.is_empty() {
                return Err(malformed("MultiPolygon has no polygons".into()));
            }
            let polygons = coordinates
                .into_iter()
                .enumerate()
                .map(|(i, rings)| {
                    validate_polygon(rings).map_err(|reason| malformed(format!("polygon {i}: {reason}")))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Geometry::MultiPolygon(polygons)
        }
    };

    Ok(Feature {
        name,
        area_code,
        geometry,
    })
}

fn validate_polygon(rings: Vec<RawRing>) -> Result<Polygon, String> {
    if rings.is_empty() {
        return Err("polygon has no rings".into());
    }
    let rings = rings
        .into_iter()
        .enumerate()
        .map(|(i, ring)| validate_ring(ring).map_err(|reason| format!("ring {i}: {reason}")))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon { rings })
}

fn validate_ring(ring: RawRing) -> Result<Ring, String> {
    if ring.len() < 3 {
        return Err(format!("ring has {} positions, need at least 3", ring.len()));
    }
    ring.into_iter()
        .enumerate()
        .map(|(i, position)| match position.as_slice() {
            [x, y, ..] if x.is_finite() && y.is_finite() => Ok(Point::new(*x, *y)),
            [_, _, ..] => Err(format!("position {i} is not finite")),
            _ => Err(format!("position {i} has {} components", position.len())),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{DataError, FeatureCollection, Geometry, Point};

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "name": "São Luís", "codarea": 2111300 },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-44.3, -2.5], [-44.1, -2.5], [-44.1, -2.7], [-44.3, -2.5]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "name": "Alcântara", "codarea": "2100204" },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[-44.5, -2.3], [-44.4, -2.3], [-44.4, -2.4], [-44.5, -2.3]]],
                        [[[-44.6, -2.2, 12.0], [-44.55, -2.2, 12.0], [-44.55, -2.25, 12.0]]]
                    ]
                }
            }
        ]
    }"#;

    fn feature_json(geometry: &str) -> String {
        format!(
            r#"{{"features":[{{"properties":{{"name":"Bad"}},"geometry":{geometry}}}]}}"#
        )
    }

    #[test]
    fn parses_polygon_and_multipolygon_features_in_order() {
        let collection = FeatureCollection::from_geojson_str(SAMPLE).expect("valid sample");
        assert_eq!(collection.len(), 2);

        let first = &collection.features()[0];
        assert_eq!(first.name, "São Luís");
        assert_eq!(first.area_code, Some(2_111_300));
        assert!(matches!(first.geometry, Geometry::Polygon(_)));
        assert_eq!(first.geometry.polygons().len(), 1);

        let second = &collection.features()[1];
        assert_eq!(second.name, "Alcântara");
        assert_eq!(second.area_code, Some(2_100_204));
        assert_eq!(second.geometry.polygons().len(), 2);
        assert!(matches!(second.geometry, Geometry::MultiPolygon(_)));
    }

    #[test]
    fn altitude_components_are_dropped() {
        let collection = FeatureCollection::from_geojson_str(SAMPLE).expect("valid sample");
        let island = &collection.features()[1].geometry.polygons()[1].rings[0];
        assert_eq!(island[0], Point::new(-44.6, -2.2));
    }

    #[test]
    fn points_walk_every_ring_of_every_feature() {
        let collection = FeatureCollection::from_geojson_str(SAMPLE).expect("valid sample");
        assert_eq!(collection.points().count(), 4 + 4 + 3);
    }

    #[test]
    fn missing_area_code_is_none() {
        let json = feature_json(r#"{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1]]]}"#);
        let collection = FeatureCollection::from_geojson_str(&json).expect("valid");
        assert_eq!(collection.features()[0].area_code, None);
    }

    #[test]
    fn unusual_area_code_shapes_are_ignored() {
        let json = r#"{"features":[{"properties":{"name":"Odd","codarea":{"id":[1,2]}},
            "geometry":{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1]]]}}]}"#;
        let collection = FeatureCollection::from_geojson_str(json).expect("valid");
        assert_eq!(collection.features()[0].area_code, None);
    }

    #[test]
    fn rejects_unsupported_geometry_type() {
        let json = feature_json(r#"{"type":"Point","coordinates":[0,0]}"#);
        let err = FeatureCollection::from_geojson_str(&json).unwrap_err();
        assert!(matches!(err, DataError::Json(_)), "got {err:?}");
    }

    #[test]
    fn rejects_missing_geometry() {
        let json = r#"{"features":[{"properties":{"name":"Nowhere"},"geometry":null}]}"#;
        let err = FeatureCollection::from_geojson_str(json).unwrap_err();
        assert_eq!(
            err,
            DataError::MissingGeometry {
                index: 0,
                name: "Nowhere".into()
            }
        );
    }

    #[test]
    fn rejects_short_ring() {
        let json = feature_json(r#"{"type":"Polygon","coordinates":[[[0,0],[1,1]]]}"#);
        let err = FeatureCollection::from_geojson_str(&json).unwrap_err();
        let DataError::MalformedGeometry { reason, .. } = err else {
            panic!("expected malformed geometry, got {err:?}");
        };
        assert!(reason.contains("need at least 3"), "{reason}");
    }

    #[test]
    fn rejects_one_dimensional_position() {
        let json = feature_json(r#"{"type":"Polygon","coordinates":[[[0,0],[1],[1,1]]]}"#);
        let err = FeatureCollection::from_geojson_str(&json).unwrap_err();
        assert!(err.to_string().contains("position 1 has 1 components"), "{err}");
    }

    #[test]
    fn rejects_empty_multipolygon() {
        let json = feature_json(r#"{"type":"MultiPolygon","coordinates":[]}"#);
        let err = FeatureCollection::from_geojson_str(&json).unwrap_err();
        assert!(err.to_string().contains("no polygons"), "{err}");
    }

    #[test]
    fn serde_deserialize_runs_validation() {
        let json = feature_json(r#"{"type":"Polygon","coordinates":[]}"#);
        let result: Result<FeatureCollection, _> = serde_json::from_str(&json);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("polygon has no rings"), "{err}");
    }
}
