use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use qdrant_client::qdrant::{
    self, CreateCollectionBuilder, Distance, PointId, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder, VectorsConfigBuilder,
};
use qdrant_client::Qdrant;
use tracing::{debug, instrument};

use super::QdrantConfig;
use crate::error::{VectorError, VectorResult};
use crate::models::{
    DistanceMetric, PointPayload, ScoredHit, SearchQuery, StoredPoint, VectorConfig,
};
use crate::repository::VectorRepository;

/// Qdrant-backed implementation of VectorRepository
pub struct QdrantRepository {
    client: Qdrant,
}

impl QdrantRepository {
    pub fn new(config: QdrantConfig) -> VectorResult<Self> {
        let mut builder = Qdrant::from_url(&config.url);

        if let Some(api_key) = config.api_key {
            builder = builder.api_key(api_key);
        }

        builder = builder.timeout(Duration::from_secs(config.timeout_secs));

        let client = builder
            .build()
            .map_err(|e| VectorError::Qdrant(format!("Failed to build client: {}", e)))?;

        Ok(Self { client })
    }

    fn to_qdrant_distance(metric: DistanceMetric) -> Distance {
        match metric {
            DistanceMetric::Cosine => Distance::Cosine,
            DistanceMetric::Euclidean => Distance::Euclid,
            DistanceMetric::DotProduct => Distance::Dot,
            DistanceMetric::Manhattan => Distance::Manhattan,
        }
    }

    fn point_id_to_u64(point_id: &PointId) -> Option<u64> {
        match &point_id.point_id_options {
            Some(qdrant::point_id::PointIdOptions::Num(num)) => Some(*num),
            _ => None,
        }
    }

    fn payload_to_qdrant(payload: &PointPayload) -> HashMap<String, QdrantValue> {
        payload
            .to_json()
            .into_iter()
            .filter_map(|(key, val)| json_to_qdrant_value(val).map(|v| (key, v)))
            .collect()
    }

    fn qdrant_to_payload(
        payload: HashMap<String, QdrantValue>,
    ) -> serde_json::Map<String, serde_json::Value> {
        payload
            .into_iter()
            .filter_map(|(key, val)| qdrant_value_to_json(val).map(|v| (key, v)))
            .collect()
    }

    fn to_point_struct(point: StoredPoint) -> PointStruct {
        let payload = Self::payload_to_qdrant(&point.payload);
        let vectors: HashMap<String, Vec<f32>> = HashMap::from([(point.vector_name, point.vector)]);
        PointStruct::new(PointId::from(point.id), vectors, payload)
    }
}

fn json_to_qdrant_value(val: serde_json::Value) -> Option<QdrantValue> {
    match val {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(b) => Some(QdrantValue::from(b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(QdrantValue::from(i))
            } else {
                n.as_f64().map(QdrantValue::from)
            }
        }
        serde_json::Value::String(s) => Some(QdrantValue::from(s)),
        // Nested values are stored as their JSON text
        _ => Some(QdrantValue::from(val.to_string())),
    }
}

fn qdrant_value_to_json(val: QdrantValue) -> Option<serde_json::Value> {
    use qdrant::value::Kind;

    match val.kind {
        Some(Kind::NullValue(_)) => Some(serde_json::Value::Null),
        Some(Kind::BoolValue(b)) => Some(serde_json::Value::Bool(b)),
        Some(Kind::IntegerValue(i)) => Some(serde_json::Value::Number(i.into())),
        Some(Kind::DoubleValue(f)) => {
            serde_json::Number::from_f64(f).map(serde_json::Value::Number)
        }
        Some(Kind::StringValue(s)) => Some(serde_json::Value::String(s)),
        _ => None,
    }
}

#[async_trait]
impl VectorRepository for QdrantRepository {
    async fn list_collections(&self) -> VectorResult<Vec<String>> {
        let response = self.client.list_collections().await?;
        Ok(response
            .collections
            .into_iter()
            .map(|collection| collection.name)
            .collect())
    }

    #[instrument(skip(self))]
    async fn delete_collection(&self, collection_name: &str) -> VectorResult<bool> {
        let response = self.client.delete_collection(collection_name).await?;
        debug!(deleted = response.result, "Delete collection acknowledged");
        Ok(response.result)
    }

    #[instrument(skip(self, config), fields(dimension = config.dimension))]
    async fn create_collection(
        &self,
        collection_name: &str,
        config: VectorConfig,
    ) -> VectorResult<()> {
        let mut vectors_config = VectorsConfigBuilder::default();
        vectors_config.add_named_vector_params(
            config.vector_name,
            VectorParamsBuilder::new(config.dimension, Self::to_qdrant_distance(config.distance)),
        );

        self.client
            .create_collection(
                CreateCollectionBuilder::new(collection_name).vectors_config(vectors_config),
            )
            .await?;

        Ok(())
    }

    #[instrument(skip(self, points), fields(points = points.len()))]
    async fn upsert(
        &self,
        collection_name: &str,
        points: Vec<StoredPoint>,
        wait: bool,
    ) -> VectorResult<usize> {
        let count = points.len();
        let points: Vec<PointStruct> = points.into_iter().map(Self::to_point_struct).collect();

        let mut builder = UpsertPointsBuilder::new(collection_name, points);
        if wait {
            builder = builder.wait(true);
        }

        self.client
            .upsert_points(builder)
            .await
            .map_err(|e| VectorError::StoreWrite(e.to_string()))?;

        Ok(count)
    }

    #[instrument(skip(self, query), fields(limit = query.limit))]
    async fn search(
        &self,
        collection_name: &str,
        query: SearchQuery,
    ) -> VectorResult<Vec<ScoredHit>> {
        let builder = SearchPointsBuilder::new(collection_name, query.vector, query.limit)
            .vector_name(query.vector_name)
            .with_vectors(query.with_vectors)
            .with_payload(query.with_payload);

        let response = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| VectorError::StoreQuery(e.to_string()))?;

        Ok(response
            .result
            .into_iter()
            .map(|point| ScoredHit {
                point_id: point.id.as_ref().and_then(Self::point_id_to_u64),
                score: point.score,
                payload: Self::qdrant_to_payload(point.payload),
            })
            .collect())
    }
}
