use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use muni_map_shared::{
    DEFAULT_CANVAS, DataError, FeatureCollection, MunicipalityRecord, ProjectionError,
    compute_transform, unmatched_features,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid municipality geometry: {0}")]
    Features(#[from] DataError),
    #[error("invalid municipality records: {0}")]
    Records(#[from] serde_json::Error),
    #[error("municipality geometry cannot be drawn: {0}")]
    Projection(#[from] ProjectionError),
}

/// A served JSON document and its strong validator.
#[derive(Debug, Clone)]
pub struct JsonDocument {
    pub body: Bytes,
    pub etag: String,
}

impl JsonDocument {
    pub fn new(body: Bytes) -> Self {
        let etag = format!("\"{:08x}\"", crc32fast::hash(&body));
        Self { body, etag }
    }
}

/// Both documents as read from disk, checked once at startup.
///
/// Bodies are served byte-for-byte as they were read; parsing is only used
/// to reject data the client could not draw.
#[derive(Debug, Clone)]
pub struct Datasets {
    pub geojson: JsonDocument,
    pub municipalities: JsonDocument,
    pub feature_count: usize,
    pub municipality_count: usize,
    /// Feature names with no record, in collection order.
    pub unmatched: Vec<String>,
    pub loaded_at: DateTime<Utc>,
}

impl Datasets {
    pub fn from_bytes(geojson: Bytes, municipalities: Bytes) -> Result<Self, DatasetError> {
        let features = FeatureCollection::from_geojson_slice(&geojson)?;
        let records: Vec<MunicipalityRecord> = serde_json::from_slice(&municipalities)?;
        compute_transform(&features, DEFAULT_CANVAS)?;

        let unmatched = unmatched_features(&features, &records)
            .into_iter()
            .map(str::to_owned)
            .collect();

        Ok(Self {
            feature_count: features.len(),
            municipality_count: records.len(),
            unmatched,
            geojson: JsonDocument::new(geojson),
            municipalities: JsonDocument::new(municipalities),
            loaded_at: Utc::now(),
        })
    }

    pub async fn load(geojson_path: &Path, municipalities_path: &Path) -> Result<Self, DatasetError> {
        let geojson = read(geojson_path).await?;
        let municipalities = read(municipalities_path).await?;
        Self::from_bytes(geojson, municipalities)
    }
}

async fn read(path: &Path) -> Result<Bytes, DatasetError> {
    tokio::fs::read(path)
        .await
        .map(Bytes::from)
        .map_err(|source| DatasetError::Read {
            path: path.to_owned(),
            source,
        })
}

#[derive(Clone)]
pub struct AppState {
    pub datasets: Arc<Datasets>,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(datasets: Datasets, static_dir: PathBuf) -> Self {
        Self {
            datasets: Arc::new(datasets),
            static_dir,
        }
    }
}
