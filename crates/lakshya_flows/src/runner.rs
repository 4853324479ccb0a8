//! Running structured flows against the model.

use crate::flows::{
    CollegeFinderFlow, DayInLifeFlow, Flow, FlowKind, FuturePathwaysFlow, QuizSuggestionsFlow,
    RecommendationsFlow,
};
use crate::{ToolRegistry, extract_json, run_with_tools};
use lakshya_core::{GenerationRequest, RetryPolicy};
use lakshya_error::{FlowError, FlowErrorKind, LakshyaResult};
use lakshya_interface::{DocumentStore, PromptRenderer};
use lakshya_rate_limit::ResilientGenerationClient;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Default bound on model/tool round trips.
const DEFAULT_MAX_TOOL_ROUNDS: usize = 4;

/// Runs [`Flow`]s: render, generate with retry, extract, parse, validate.
///
/// Flows that declare tools get a [`ToolRegistry`] over the runner's store
/// restricted to those tools.
#[derive(Clone)]
pub struct FlowRunner {
    client: ResilientGenerationClient,
    renderer: Arc<dyn PromptRenderer>,
    store: Arc<dyn DocumentStore>,
    policy: RetryPolicy,
    max_tool_rounds: usize,
}

impl std::fmt::Debug for FlowRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowRunner")
            .field("policy", &self.policy)
            .field("max_tool_rounds", &self.max_tool_rounds)
            .finish_non_exhaustive()
    }
}

impl FlowRunner {
    /// Runner using the client's default policy.
    pub fn new(
        client: ResilientGenerationClient,
        renderer: Arc<dyn PromptRenderer>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            policy: client.default_policy().clone(),
            client,
            renderer,
            store,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    /// Run `flow` on `input`.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` when the flow rejects the input; no model call is made
    /// - template and generation errors as produced
    /// - `MissingJson` when the reply holds no JSON
    /// - `InvalidOutput` when the JSON does not parse into the output type or
    ///   the flow rejects it
    #[instrument(skip(self, flow, input, cancel), fields(flow = flow.id()))]
    pub async fn run<F: Flow>(
        &self,
        flow: &F,
        input: &F::Input,
        cancel: &CancellationToken,
    ) -> LakshyaResult<F::Output> {
        let id = flow.id();
        flow.validate_input(input)
            .map_err(|reason| invalid_input(id, reason))?;

        let variables =
            serde_json::to_value(input).map_err(|e| invalid_input(id, e.to_string()))?;
        let prompt = self.renderer.render(id, &variables)?;
        let request = GenerationRequest::from_text(prompt);

        let reply = if flow.tools().is_empty() {
            self.client.execute(&request, &self.policy, cancel).await?.text()
        } else {
            let registry = ToolRegistry::with_tools(Arc::clone(&self.store), flow.tools());
            let outcome = run_with_tools(
                &self.client,
                &registry,
                &request,
                &self.policy,
                cancel,
                self.max_tool_rounds,
            )
            .await?;
            debug!(rounds = outcome.rounds, "Tool loop finished");
            outcome.response.text()
        };

        let json = extract_json(&reply).ok_or_else(|| {
            warn!(length = reply.len(), "Reply contained no JSON");
            FlowError::new(FlowErrorKind::MissingJson {
                flow: id.to_string(),
                length: reply.len(),
            })
        })?;

        let output: F::Output =
            serde_json::from_str(json).map_err(|e| invalid_output(id, e.to_string()))?;
        flow.validate_output(&output)
            .map_err(|reason| invalid_output(id, reason))?;

        info!("Flow complete");
        Ok(output)
    }

    /// Run a flow chosen at runtime on untyped input.
    ///
    /// # Errors
    ///
    /// As [`run`](Self::run); input that does not match the flow's input
    /// type is `InvalidInput`.
    pub async fn run_named(
        &self,
        kind: FlowKind,
        input: Value,
        cancel: &CancellationToken,
    ) -> LakshyaResult<Value> {
        match kind {
            FlowKind::DayInLife => self.run_value(&DayInLifeFlow, input, cancel).await,
            FlowKind::FuturePathways => self.run_value(&FuturePathwaysFlow, input, cancel).await,
            FlowKind::CollegeFinder => self.run_value(&CollegeFinderFlow, input, cancel).await,
            FlowKind::Recommendations => {
                self.run_value(&RecommendationsFlow, input, cancel).await
            }
            FlowKind::QuizSuggestions => {
                self.run_value(&QuizSuggestionsFlow, input, cancel).await
            }
        }
    }

    async fn run_value<F>(
        &self,
        flow: &F,
        input: Value,
        cancel: &CancellationToken,
    ) -> LakshyaResult<Value>
    where
        F: Flow,
        F::Input: serde::de::DeserializeOwned,
    {
        let id = flow.id();
        let input: F::Input =
            serde_json::from_value(input).map_err(|e| invalid_input(id, e.to_string()))?;
        let output = self.run(flow, &input, cancel).await?;
        Ok(serde_json::to_value(output).map_err(|e| invalid_output(id, e.to_string()))?)
    }
}

fn invalid_input(flow: &str, reason: String) -> FlowError {
    FlowError::new(FlowErrorKind::InvalidInput {
        flow: flow.to_string(),
        reason,
    })
}

fn invalid_output(flow: &str, reason: String) -> FlowError {
    FlowError::new(FlowErrorKind::InvalidOutput {
        flow: flow.to_string(),
        reason,
    })
}
