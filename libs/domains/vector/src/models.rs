use serde::{Deserialize, Serialize};

/// Name of the single vector field every lyrics collection carries.
pub const TEXT_VECTOR_NAME: &str = "text";

/// Payload key holding the record text.
pub const PAYLOAD_TEXT_KEY: &str = "text";

/// Payload key holding the record's own identifier.
pub const PAYLOAD_ID_KEY: &str = "id";

/// A dense embedding as returned by the embedding provider.
pub type Embedding = Vec<f32>;

/// Source unit to be indexed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub text: String,
}

impl Record {
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// Distance metric for similarity calculations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceMetric {
    #[default]
    Cosine,
    Euclidean,
    DotProduct,
    Manhattan,
}

/// Configuration of the named vector field of a collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorConfig {
    pub vector_name: String,
    pub dimension: u64,
    pub distance: DistanceMetric,
}

impl VectorConfig {
    /// Cosine-distance config for the `"text"` vector field.
    pub fn text(dimension: u64) -> Self {
        Self {
            vector_name: TEXT_VECTOR_NAME.to_string(),
            dimension,
            distance: DistanceMetric::Cosine,
        }
    }
}

/// Payload stored alongside each point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointPayload {
    pub text: String,
    pub id: i64,
}

impl PointPayload {
    pub fn to_json(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut map = serde_json::Map::new();
        map.insert(
            PAYLOAD_TEXT_KEY.to_string(),
            serde_json::Value::String(self.text.clone()),
        );
        map.insert(PAYLOAD_ID_KEY.to_string(), serde_json::Value::from(self.id));
        map
    }
}

impl From<&Record> for PointPayload {
    fn from(record: &Record) -> Self {
        Self {
            text: record.text.clone(),
            id: record.id,
        }
    }
}

/// One point written to the store: identifier, named vector and payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPoint {
    pub id: u64,
    pub vector_name: String,
    pub vector: Embedding,
    pub payload: PointPayload,
}

impl StoredPoint {
    pub fn new(id: u64, vector: Embedding, payload: PointPayload) -> Self {
        Self {
            id,
            vector_name: TEXT_VECTOR_NAME.to_string(),
            vector,
            payload,
        }
    }
}

/// Nearest-neighbour query against one named vector field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub vector_name: String,
    pub vector: Embedding,
    pub limit: u64,
    pub with_vectors: bool,
    pub with_payload: bool,
}

impl SearchQuery {
    /// Query the `"text"` field, payload on, vectors off.
    pub fn text(vector: Embedding, limit: u64) -> Self {
        Self {
            vector_name: TEXT_VECTOR_NAME.to_string(),
            vector,
            limit,
            with_vectors: false,
            with_payload: true,
        }
    }
}

/// Raw similarity hit as reported by the store
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoredHit {
    pub point_id: Option<u64>,
    pub score: f32,
    pub payload: serde_json::Map<String, serde_json::Value>,
}

/// Simplified search result shown to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub lyric: String,
    pub id: Option<i64>,
    pub score: f32,
}

impl From<ScoredHit> for QueryResult {
    fn from(hit: ScoredHit) -> Self {
        let lyric = hit
            .payload
            .get(PAYLOAD_TEXT_KEY)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();
        let id = hit.payload.get(PAYLOAD_ID_KEY).and_then(|v| v.as_i64());

        Self {
            lyric,
            id,
            score: hit.score,
        }
    }
}
