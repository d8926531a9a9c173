//! End-to-end demo flow and console rendering

use std::sync::Arc;

use domain_vector::{
    EmbeddingProvider, LocalStorageCleanup, ProvisionerConfig, QueryResult, Record,
    VectorRepository, VectorResult, VectorService,
};
use tracing::info;

use crate::settings::DemoSettings;

const SEPARATOR_WIDTH: usize = 80;

/// The two lyrics indexed by the demo
pub fn sample_records() -> Vec<Record> {
    vec![
        Record::new(1, "說了再見，才發現再也見不到"),
        Record::new(2, "天涼了，雨下了，妳走了"),
    ]
}

/// Wire a [`VectorService`] from already-built client handles.
///
/// Local storage cleanup is installed only when `settings.local_storage` is set.
pub fn build_service<R: VectorRepository>(
    repository: Arc<R>,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    model: impl Into<String>,
    settings: &DemoSettings,
) -> VectorService<R> {
    let provisioner_config = ProvisionerConfig::default().with_max_retries(settings.max_retries);
    let service = VectorService::new(repository, embedding_provider, model, provisioner_config);

    match &settings.local_storage {
        Some(root) => {
            info!(storage_root = %root.display(), "Local storage cleanup enabled");
            service.with_exhaustion_hook(Arc::new(LocalStorageCleanup::new(root.clone())))
        }
        None => service,
    }
}

/// Index `records`, then search for `settings.query`.
pub async fn run_demo<R: VectorRepository>(
    service: &VectorService<R>,
    settings: &DemoSettings,
    records: &[Record],
) -> VectorResult<Vec<QueryResult>> {
    service
        .index_records(&settings.collection_name, records)
        .await?;

    info!("Performing similarity search...");
    service
        .search_text(&settings.collection_name, &settings.query, settings.limit)
        .await
}

pub fn render_results(query: &str, results: &[QueryResult]) -> String {
    let separator = "-".repeat(SEPARATOR_WIDTH);
    let mut out = format!("Query: {}\n\nSearch Results:\n{}\n", query, separator);

    for (i, result) in results.iter().enumerate() {
        let id = result
            .id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "None".to_string());
        out.push_str(&format!(
            "Result {} (Score: {:.4}):\nID: {}\nLyric: {}\n{}\n",
            i + 1,
            result.score,
            id,
            result.lyric,
            separator
        ));
    }
    out
}

pub fn troubleshooting_tips(collection_name: &str) -> String {
    format!(
        "Troubleshooting tips:\n\
         1. Make sure the AZURE_OPENAI_* variables point at a deployed embedding model\n\
         2. Check your network connection and that Qdrant is reachable at QDRANT_URL\n\
         3. Verify the collection '{}' exists in Qdrant",
        collection_name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_vector::VectorError;
    use test_utils::{assertions::*, InMemoryVectorRepository, StubEmbeddingProvider};

    fn result(lyric: &str, id: Option<i64>, score: f32) -> QueryResult {
        QueryResult {
            lyric: lyric.to_string(),
            id,
            score,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_demo_returns_ranked_sample_lyrics() {
        let repo = Arc::new(InMemoryVectorRepository::new());
        let settings = DemoSettings::default();
        let service = build_service(
            Arc::clone(&repo),
            Arc::new(StubEmbeddingProvider::default()),
            "text-embedding-3-small",
            &settings,
        );

        let results = run_demo(&service, &settings, &sample_records()).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_scores_descending(&results, "demo");
        assert_cosine_scores(&results, "demo");
        assert_eq!(repo.points("lyrics").len(), 2);
        assert_eq!(repo.upsert_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_demo_with_no_records_fails_validation() {
        let repo = Arc::new(InMemoryVectorRepository::new());
        let settings = DemoSettings::default();
        let service = build_service(
            Arc::clone(&repo),
            Arc::new(StubEmbeddingProvider::new(4)),
            "m",
            &settings,
        );

        let err = run_demo(&service, &settings, &[]).await.unwrap_err();
        assert!(matches!(err, VectorError::Validation(_)));
        assert!(repo.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_local_storage_cleanup_installed_from_settings() {
        let storage = tempfile::tempdir().unwrap();
        let collection_dir = storage.path().join("collections").join("lyrics");
        std::fs::create_dir_all(&collection_dir).unwrap();

        let settings = DemoSettings::default()
            .with_max_retries(1)
            .with_local_storage(storage.path());
        let service = build_service(
            Arc::new(InMemoryVectorRepository::new().failing_creates(u32::MAX)),
            Arc::new(StubEmbeddingProvider::new(4)),
            "m",
            &settings,
        );

        let err = run_demo(&service, &settings, &sample_records()).await.unwrap_err();
        assert!(matches!(err, VectorError::Provisioning { attempts: 1, .. }));
        assert!(!collection_dir.exists());
    }

    #[test]
    fn test_render_results() {
        let rendered = render_results(
            "我說再見",
            &[result("說了再見", Some(1), 0.87654), result("天涼了", None, 0.5)],
        );
        let separator = "-".repeat(80);
        let expected = format!(
            "Query: 我說再見\n\nSearch Results:\n{sep}\n\
             Result 1 (Score: 0.8765):\nID: 1\nLyric: 說了再見\n{sep}\n\
             Result 2 (Score: 0.5000):\nID: None\nLyric: 天涼了\n{sep}\n",
            sep = separator
        );
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_render_empty_results() {
        let rendered = render_results("q", &[]);
        assert!(rendered.starts_with("Query: q\n"));
        assert!(!rendered.contains("Result 1"));
    }

    #[test]
    fn test_troubleshooting_names_collection() {
        assert!(troubleshooting_tips("songs").contains("Verify the collection 'songs' exists"));
    }
}
