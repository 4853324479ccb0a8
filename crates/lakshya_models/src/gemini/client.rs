//! Gemini REST client.

use super::conversion;
use super::dto::{GeminiGenerationConfig, GeminiResponse};
use super::sse::SseDecoder;
use async_trait::async_trait;
use futures_util::{Stream, StreamExt, stream};
use lakshya_core::{GenerationRequest, GenerationResponse};
use lakshya_error::{GenerationError, GenerationErrorKind, GenerationResult};
use lakshya_interface::{FragmentStream, ModelBackend};
use reqwest::Client;
use std::collections::VecDeque;
use std::pin::Pin;
use tracing::{debug, instrument, warn};

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

type ByteStream = Pin<Box<dyn Stream<Item = GenerationResult<Vec<u8>>> + Send>>;

/// Gemini backend over the public REST API.
///
/// Calls `models/{model}:generateContent` for complete responses and
/// `models/{model}:streamGenerateContent?alt=sse` for streams. HTTP 429 is
/// reported as rate limiting; every other failure is a backend error.
#[derive(Clone)]
pub struct GeminiBackend {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
    defaults: GeminiGenerationConfig,
}

impl std::fmt::Debug for GeminiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiBackend")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl GeminiBackend {
    /// Creates a backend with an explicit API key.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: model.into(),
            defaults: GeminiGenerationConfig::default(),
        }
    }

    /// Creates a backend reading the API key from `api_key_env`.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is unset or empty.
    #[instrument(skip_all, fields(api_key_env = %api_key_env))]
    pub fn from_env(api_key_env: &str, model: impl Into<String>) -> GenerationResult<Self> {
        let api_key = std::env::var(api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                GenerationError::new(GenerationErrorKind::InvalidRequest(format!(
                    "{} not set",
                    api_key_env
                )))
            })?;
        Ok(Self::new(api_key, model))
    }

    /// Overrides the API base URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Default sampling temperature for requests that do not set one.
    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.defaults.temperature = temperature;
        self
    }

    /// Default output token cap for requests that do not set one.
    pub fn with_max_output_tokens(mut self, max_output_tokens: Option<u32>) -> Self {
        self.defaults.max_output_tokens = max_output_tokens;
        self
    }

    fn url(&self, request: &GenerationRequest, method: &str) -> String {
        let model = request.model().as_deref().unwrap_or(self.model.as_str());
        format!("{}/models/{}:{}", self.endpoint, model, method)
    }

    async fn post(&self, url: &str, request: &GenerationRequest) -> GenerationResult<reqwest::Response> {
        let body = conversion::to_gemini_request(request, &self.defaults);

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                GenerationError::new(GenerationErrorKind::Backend {
                    status: e.status().map(|s| s.as_u16()),
                    message: format!("Request failed: {}", e),
                })
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let kind = conversion::error_from_status(status.as_u16(), &body);
            warn!(status = status.as_u16(), error = %kind, "Gemini API returned an error");
            return Err(GenerationError::new(kind));
        }

        Ok(response)
    }
}

#[async_trait]
impl ModelBackend for GeminiBackend {
    #[instrument(skip(self, req), fields(model = %self.model))]
    async fn generate(&self, req: &GenerationRequest) -> GenerationResult<GenerationResponse> {
        let url = self.url(req, "generateContent");
        debug!(url = %url, "Sending Gemini API request");

        let response = self.post(&url, req).await?;
        let body: GeminiResponse = response.json().await.map_err(|e| {
            GenerationError::backend(format!("Failed to parse response: {}", e))
        })?;

        conversion::from_gemini_response(&body)
    }

    #[instrument(skip(self, req), fields(model = %self.model))]
    async fn generate_stream(&self, req: &GenerationRequest) -> GenerationResult<FragmentStream> {
        let url = self.url(req, "streamGenerateContent?alt=sse");
        debug!(url = %url, "Opening Gemini stream");

        let response = self.post(&url, req).await?;
        let bytes: ByteStream = Box::pin(response.bytes_stream().map(|chunk| {
            chunk
                .map(|bytes| bytes.to_vec())
                .map_err(|e| GenerationError::backend(format!("Stream error: {}", e)))
        }));

        Ok(Box::pin(fragments(bytes)))
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

struct FragmentState {
    bytes: ByteStream,
    decoder: SseDecoder,
    pending: VecDeque<String>,
    done: bool,
}

/// Turn an SSE byte stream into text fragments, ending after the first error.
fn fragments(bytes: ByteStream) -> impl Stream<Item = GenerationResult<String>> + Send {
    let state = FragmentState {
        bytes,
        decoder: SseDecoder::default(),
        pending: VecDeque::new(),
        done: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.pending.pop_front() {
                match conversion::fragment_from_event(&event) {
                    Ok(Some(text)) => return Some((Ok(text), state)),
                    Ok(None) => continue,
                    Err(e) => {
                        state.pending.clear();
                        state.done = true;
                        return Some((Err(e), state));
                    }
                }
            }
            if state.done {
                return None;
            }
            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let events = state.decoder.push(&chunk);
                    state.pending.extend(events);
                }
                Some(Err(e)) => {
                    state.done = true;
                    return Some((Err(e), state));
                }
                None => {
                    state.done = true;
                    let events = state.decoder.finish();
                    state.pending.extend(events);
                }
            }
        }
    })
}
