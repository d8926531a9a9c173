use std::sync::Arc;

use tracing::{info, instrument};

use crate::error::{VectorError, VectorResult};
use crate::models::{Embedding, PointPayload, Record, StoredPoint};
use crate::repository::VectorRepository;

/// How a record is keyed in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointIdStrategy {
    /// Zero-based position in the batch. Ids collide across batches.
    #[default]
    Position,
    /// The record's own id; must be non-negative.
    RecordId,
}

/// Writes records and their embeddings as points in one upsert
pub struct Ingestor<R: VectorRepository> {
    repository: Arc<R>,
    id_strategy: PointIdStrategy,
}

impl<R: VectorRepository> Ingestor<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            id_strategy: PointIdStrategy::default(),
        }
    }

    pub fn with_id_strategy(mut self, strategy: PointIdStrategy) -> Self {
        self.id_strategy = strategy;
        self
    }

    /// Upsert one point per record, waiting for the store to acknowledge.
    ///
    /// Returns the number of points written. An empty batch writes nothing.
    #[instrument(skip(self, records, embeddings), fields(records = records.len()))]
    pub async fn ingest(
        &self,
        collection_name: &str,
        records: &[Record],
        embeddings: Vec<Embedding>,
    ) -> VectorResult<usize> {
        let points = self.build_points(records, embeddings)?;
        if points.is_empty() {
            return Ok(0);
        }

        let written = self.repository.upsert(collection_name, points, true).await?;
        info!("Uploaded {} points to collection '{}'", written, collection_name);
        Ok(written)
    }

    fn build_points(
        &self,
        records: &[Record],
        embeddings: Vec<Embedding>,
    ) -> VectorResult<Vec<StoredPoint>> {
        if records.len() != embeddings.len() {
            return Err(VectorError::Validation(format!(
                "got {} records but {} embeddings",
                records.len(),
                embeddings.len()
            )));
        }

        let dimension = embeddings.first().map(Vec::len).unwrap_or_default();
        if let Some(position) = embeddings.iter().position(|e| e.len() != dimension) {
            return Err(VectorError::Validation(format!(
                "embedding at position {} has dimension {}, expected {}",
                position,
                embeddings[position].len(),
                dimension
            )));
        }

        records
            .iter()
            .zip(embeddings)
            .enumerate()
            .map(|(position, (record, embedding))| {
                let id = self.point_id(position, record)?;
                Ok(StoredPoint::new(id, embedding, PointPayload::from(record)))
            })
            .collect()
    }

    fn point_id(&self, position: usize, record: &Record) -> VectorResult<u64> {
        match self.id_strategy {
            PointIdStrategy::Position => Ok(position as u64),
            PointIdStrategy::RecordId => u64::try_from(record.id).map_err(|_| {
                VectorError::Validation(format!(
                    "record id {} cannot be used as a point id",
                    record.id
                ))
            }),
        }
    }
}
