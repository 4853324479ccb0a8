//! Wiring configuration into a ready-to-use client, store and renderer.

use lakshya_error::LakshyaResult;
use lakshya_flows::{CounselorChat, FlowRunner, StudentProfile, TemplateRenderer};
use lakshya_interface::{DocumentStore, ModelBackend};
use lakshya_rate_limit::{LakshyaConfig, ResilientGenerationClient, StorageConfig};
use lakshya_storage::{FileDocumentStore, InMemoryDocumentStore};
use std::sync::Arc;
use tracing::{info, instrument};

/// Everything a chat or flow needs, built once from configuration.
#[derive(Clone)]
pub struct AppContext {
    config: LakshyaConfig,
    client: ResilientGenerationClient,
    store: Arc<dyn DocumentStore>,
    renderer: Arc<TemplateRenderer>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Context around an explicit backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured store cannot be opened.
    #[instrument(skip_all, fields(provider = backend.provider_name(), model = backend.model_name()))]
    pub fn new(config: LakshyaConfig, backend: Arc<dyn ModelBackend>) -> LakshyaResult<Self> {
        let store = open_store(&config.storage)?;
        let client = ResilientGenerationClient::new(backend).with_policy(config.retry.clone());
        let renderer = Arc::new(TemplateRenderer::from_config(&config));
        info!(templates = config.templates.len(), "Application context ready");

        Ok(Self {
            config,
            client,
            store,
            renderer,
        })
    }

    /// Context using the Gemini backend described by `[model]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key variable is unset or the store
    /// cannot be opened.
    #[cfg(feature = "gemini")]
    pub fn from_config(config: LakshyaConfig) -> LakshyaResult<Self> {
        let model = &config.model;
        let backend = lakshya_models::GeminiBackend::from_env(model.api_key_env(), model.name())?
            .with_endpoint(model.endpoint())
            .with_temperature(*model.temperature())
            .with_max_output_tokens(*model.max_output_tokens());
        Self::new(config, Arc::new(backend))
    }

    pub fn config(&self) -> &LakshyaConfig {
        &self.config
    }

    pub fn client(&self) -> &ResilientGenerationClient {
        &self.client
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Runner for structured flows.
    pub fn flow_runner(&self) -> FlowRunner {
        FlowRunner::new(
            self.client.clone(),
            self.renderer.clone(),
            Arc::clone(&self.store),
        )
        .with_max_tool_rounds(*self.config.chat.max_tool_rounds())
    }

    /// Counselor chat for `session_id`, resumed from the store when saved.
    ///
    /// # Errors
    ///
    /// Returns an error if a saved session cannot be read.
    pub async fn chat(
        &self,
        profile: StudentProfile,
        session_id: &str,
    ) -> LakshyaResult<CounselorChat> {
        let chat = CounselorChat::resume(
            self.client.clone(),
            Arc::clone(&self.store),
            self.renderer.clone(),
            profile,
            session_id,
        )
        .await?;
        Ok(chat.with_config(self.config.chat.clone()))
    }
}

/// Open the store described by `[storage]`: on disk when a path is set,
/// in memory otherwise.
///
/// # Errors
///
/// Returns an error if the storage directory cannot be created.
pub fn open_store(config: &StorageConfig) -> LakshyaResult<Arc<dyn DocumentStore>> {
    Ok(match &config.path {
        Some(path) => {
            info!(path = %path.display(), "Using file document store");
            Arc::new(FileDocumentStore::new(path)?)
        }
        None => {
            info!("Using in-memory document store");
            Arc::new(InMemoryDocumentStore::new())
        }
    })
}
