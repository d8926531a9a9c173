//! Azure OpenAI embedding provider
//!
//! Talks to a deployment-scoped embeddings endpoint:
//! `POST {endpoint}/openai/deployments/{deployment}/embeddings?api-version={version}`
//! authenticated with the `api-key` header.

use async_trait::async_trait;
use core_config::env_required;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::EmbeddingProvider;
use crate::error::{VectorError, VectorResult};
use crate::models::Embedding;

/// Azure OpenAI provider configuration
#[derive(Debug, Clone)]
pub struct AzureOpenAIConfig {
    pub api_key: String,
    pub api_version: String,
    /// Resource endpoint, stored without a trailing slash
    pub endpoint: String,
    pub deployment: String,
    pub model: String,
}

impl AzureOpenAIConfig {
    pub fn new(
        api_key: impl Into<String>,
        api_version: impl Into<String>,
        endpoint: impl Into<String>,
        deployment: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            api_version: api_version.into(),
            endpoint: normalize_endpoint(&endpoint.into()),
            deployment: deployment.into(),
            model: model.into(),
        }
    }

    /// Every variable is required; the first missing one is reported.
    pub fn from_env() -> VectorResult<Self> {
        Ok(Self::new(
            env_required("AZURE_OPENAI_API_KEY")?,
            env_required("AZURE_OPENAI_API_VERSION")?,
            env_required("AZURE_OPENAI_ENDPOINT")?,
            env_required("AZURE_OPENAI_DEPLOYMENT")?,
            env_required("AZURE_OPENAI_MODEL")?,
        ))
    }

    fn embeddings_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/embeddings",
            self.endpoint, self.deployment
        )
    }
}

fn normalize_endpoint(endpoint: &str) -> String {
    endpoint.trim().trim_end_matches('/').to_string()
}

/// Azure OpenAI embeddings provider
pub struct AzureOpenAIProvider {
    client: Client,
    config: AzureOpenAIConfig,
}

impl AzureOpenAIProvider {
    pub fn new(config: AzureOpenAIConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn from_env() -> VectorResult<Self> {
        Ok(Self::new(AzureOpenAIConfig::from_env()?))
    }

    pub fn config(&self) -> &AzureOpenAIConfig {
        &self.config
    }

    async fn request_embedding(&self, model: &str, text: &str) -> VectorResult<Embedding> {
        let request = EmbeddingRequest { input: text, model };

        let response = self
            .client
            .post(self.config.embeddings_url())
            .query(&[("api-version", self.config.api_version.as_str())])
            .header("api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(VectorError::EmbeddingProvider(format!(
                "Azure OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let embedding_response: EmbeddingResponse = response.json().await?;

        embedding_response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| VectorError::EmbeddingProvider("No embedding returned".to_string()))
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for AzureOpenAIProvider {
    #[instrument(
        skip(self, text),
        fields(deployment = %self.config.deployment, chars = text.chars().count())
    )]
    async fn embed(&self, model: &str, text: &str) -> VectorResult<Embedding> {
        match self.request_embedding(model, text).await {
            Ok(embedding) => {
                debug!(dimension = embedding.len(), "Embedding generated");
                Ok(embedding)
            }
            Err(err) => {
                error!(error = %err, "Error getting embedding");
                Err(err)
            }
        }
    }
}
