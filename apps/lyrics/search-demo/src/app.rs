//! Demo initialization and top-level error reporting
//!
//! This module handles all setup:
//! - color-eyre and tracing initialization
//! - Demo, Azure OpenAI and Qdrant configuration
//! - Client construction and service wiring
//!
//! Configuration problems fail startup. Failures inside the demo flow are
//! reported with troubleshooting tips instead.

use std::sync::Arc;

use core_config::{Environment, FromEnv};
use domain_vector::{
    AzureOpenAIProvider, QdrantConfig, QdrantRepository, VectorError, VectorService,
};
use eyre::{Result, WrapErr};
use tracing::{error, info};

use crate::demo::{build_service, render_results, run_demo, sample_records, troubleshooting_tips};
use crate::settings::DemoSettings;

/// Run the lyrics search demo
///
/// # Errors
///
/// Returns an error if:
/// - Demo settings cannot be parsed
/// - Any `AZURE_OPENAI_*` variable is missing
/// - Qdrant configuration is invalid or the client cannot be built
///
/// Errors from embedding, provisioning, ingestion or search are logged and
/// do not fail the process.
pub async fn run() -> Result<()> {
    core_config::tracing::install_color_eyre();
    let environment = Environment::from_env();
    core_config::tracing::init_tracing(&environment);

    let settings = DemoSettings::from_env().wrap_err("Failed to load demo settings")?;
    let service = connect(&settings)?;

    match run_demo(&service, &settings, &sample_records()).await {
        Ok(results) => println!("\n{}", render_results(&settings.query, &results)),
        Err(err) => report_failure(&settings, &err),
    }

    Ok(())
}

/// Load client configuration and wire the service.
///
/// Azure OpenAI settings are checked before any Qdrant client is built.
pub fn connect(settings: &DemoSettings) -> Result<VectorService<QdrantRepository>> {
    let provider =
        AzureOpenAIProvider::from_env().wrap_err("Failed to load Azure OpenAI configuration")?;
    let model = provider.config().model.clone();
    info!(model = %model, "Azure OpenAI embedding provider configured");

    let qdrant_config = QdrantConfig::from_env().wrap_err("Failed to load Qdrant configuration")?;
    info!("Connecting to Qdrant at {}...", qdrant_config.url);
    let repository =
        QdrantRepository::new(qdrant_config).wrap_err("Failed to create Qdrant client")?;

    Ok(build_service(
        Arc::new(repository),
        Arc::new(provider),
        model,
        settings,
    ))
}

fn report_failure(settings: &DemoSettings, err: &VectorError) {
    error!(error.kind = err.kind(), error = %err, "Lyrics search demo failed");
    println!("\nError: {}", err);
    println!("\n{}", troubleshooting_tips(&settings.collection_name));
}

#[cfg(test)]
mod tests {
    use super::*;

    const AZURE_VARS: [(&str, Option<&str>); 5] = [
        ("AZURE_OPENAI_API_KEY", Some("secret")),
        ("AZURE_OPENAI_API_VERSION", Some("2024-02-01")),
        ("AZURE_OPENAI_ENDPOINT", Some("https://example.openai.azure.com/")),
        ("AZURE_OPENAI_DEPLOYMENT", Some("embed-deploy")),
        ("AZURE_OPENAI_MODEL", Some("text-embedding-3-small")),
    ];

    #[test]
    fn test_connect_fails_when_azure_key_missing() {
        let mut vars = AZURE_VARS.to_vec();
        vars[0] = ("AZURE_OPENAI_API_KEY", None);

        temp_env::with_vars(vars, || {
            let err = connect(&DemoSettings::default()).err().unwrap();
            let message = format!("{:#}", err);
            assert!(message.contains("Failed to load Azure OpenAI configuration"));
            assert!(message.contains("AZURE_OPENAI_API_KEY"));
        });
    }

    #[test]
    fn test_connect_fails_on_invalid_qdrant_timeout() {
        let mut vars = AZURE_VARS.to_vec();
        vars.push(("QDRANT_TIMEOUT_SECS", Some("soon")));

        temp_env::with_vars(vars, || {
            let err = connect(&DemoSettings::default()).err().unwrap();
            assert!(format!("{:#}", err).contains("Failed to load Qdrant configuration"));
        });
    }
}
