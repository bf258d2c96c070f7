use serde::{Deserialize, Serialize};

use crate::geometry::{Feature, FeatureCollection};

/// Metadata shown when a municipality is clicked. `name` is the join key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MunicipalityRecord {
    pub name: String,
    pub population: u64,
    pub infos: String,
}

/// Record whose name equals the feature's name exactly (case- and
/// accent-sensitive, no normalization). Duplicate names: first one wins.
pub fn resolve<'a>(
    feature: &Feature,
    records: &'a [MunicipalityRecord],
) -> Option<&'a MunicipalityRecord> {
    resolve_index(feature, records).map(|index| &records[index])
}

pub fn resolve_index(feature: &Feature, records: &[MunicipalityRecord]) -> Option<usize> {
    records.iter().position(|record| record.name == feature.name)
}

/// Names of features that no record binds to, in collection order.
pub fn unmatched_features<'a>(
    features: &'a FeatureCollection,
    records: &[MunicipalityRecord],
) -> Vec<&'a str> {
    features
        .iter()
        .filter(|feature| resolve_index(feature, records).is_none())
        .map(|feature| feature.name.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{MunicipalityRecord, resolve, resolve_index, unmatched_features};
    use crate::geometry::{Feature, FeatureCollection, Geometry, Point, Polygon};

    fn feature(name: &str) -> Feature {
        Feature {
            name: name.into(),
            area_code: None,
            geometry: Geometry::Polygon(Polygon {
                rings: vec![vec![
                    Point::new(0.0, 0.0),
                    Point::new(1.0, 0.0),
                    Point::new(1.0, 1.0),
                ]],
            }),
        }
    }

    fn record(name: &str, population: u64, infos: &str) -> MunicipalityRecord {
        MunicipalityRecord {
            name: name.into(),
            population,
            infos: infos.into(),
        }
    }

    #[test]
    fn resolves_exact_name() {
        let records = vec![
            record("São Luís", 1_000_000, "capital"),
            record("Imperatriz", 259_000, "segunda maior cidade"),
        ];
        let found = resolve(&feature("São Luís"), &records).expect("match");
        assert_eq!(found, &records[0]);
        assert_eq!(found.population, 1_000_000);
        assert_eq!(found.infos, "capital");
    }

    #[test]
    fn missing_name_resolves_to_none() {
        let records = vec![record("São Luís", 1_000_000, "capital")];
        assert!(resolve(&feature("Caxias"), &records).is_none());
    }

    #[test]
    fn comparison_is_case_and_accent_sensitive() {
        let records = vec![record("São Luís", 1_000_000, "capital")];
        assert!(resolve(&feature("são luís"), &records).is_none());
        assert!(resolve(&feature("Sao Luis"), &records).is_none());
        assert!(resolve(&feature("São Luís "), &records).is_none());
    }

    #[test]
    fn duplicate_names_first_wins() {
        let records = vec![
            record("Bacabal", 1, "first"),
            record("Bacabal", 2, "second"),
        ];
        assert_eq!(resolve_index(&feature("Bacabal"), &records), Some(0));
        assert_eq!(resolve(&feature("Bacabal"), &records).map(|r| r.population), Some(1));
    }

    #[test]
    fn unmatched_features_keeps_collection_order() {
        let features = FeatureCollection::new(vec![
            feature("Caxias"),
            feature("São Luís"),
            feature("Codó"),
        ]);
        let records = vec![record("São Luís", 1_000_000, "capital")];
        assert_eq!(unmatched_features(&features, &records), vec!["Caxias", "Codó"]);
    }

    #[test]
    fn parses_plain_record_array() {
        let json = r#"[
            {"name": "São Luís", "population": 1037775, "infos": "Capital do estado"},
            {"name": "Timon", "population": 174465, "infos": ""}
        ]"#;
        let records: Vec<MunicipalityRecord> = serde_json::from_str(json).expect("valid");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], record("Timon", 174_465, ""));
    }

    #[test]
    fn negative_population_is_rejected() {
        let json = r#"[{"name": "X", "population": -1, "infos": ""}]"#;
        assert!(serde_json::from_str::<Vec<MunicipalityRecord>>(json).is_err());
    }
}
