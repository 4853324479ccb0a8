//! Content lookups the model can call while generating.
//!
//! The set of tools is closed: [`ToolName`] names every tool, each tool has
//! a typed argument struct that is validated before the document store is
//! touched, and [`ToolRegistry`] dispatches a model's [`ToolCall`] to the
//! matching handler.

use async_trait::async_trait;
use lakshya_core::{
    GenerationRequest, GenerationResponse, Message, Part, Prompt, RetryPolicy, Role, ToolCall,
    ToolDefinition,
};
use lakshya_error::{LakshyaResult, ToolError, ToolErrorKind};
use lakshya_interface::{DocumentStore, Filter, FilterOp, ToolInvoker};
use lakshya_rate_limit::ResilientGenerationClient;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::str::FromStr;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

/// Default number of records a lookup returns.
pub const DEFAULT_RESULT_LIMIT: usize = 10;

/// Largest number of records a lookup may request.
pub const MAX_RESULT_LIMIT: usize = 25;

/// Every tool the model may call.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ToolName {
    /// Search the `colleges` collection
    FindColleges,
    /// Search the `careers` collection
    FindCareers,
    /// Search the `exams` collection
    FindExams,
    /// Search the `scholarships` collection
    FindScholarships,
}

impl ToolName {
    /// Collection the tool reads.
    pub fn collection(self) -> &'static str {
        match self {
            ToolName::FindColleges => "colleges",
            ToolName::FindCareers => "careers",
            ToolName::FindExams => "exams",
            ToolName::FindScholarships => "scholarships",
        }
    }

    /// Declaration sent to the model.
    pub fn definition(self) -> ToolDefinition {
        let limit = json!({
            "type": "integer",
            "description": format!("Maximum results (1-{}, default {})", MAX_RESULT_LIMIT, DEFAULT_RESULT_LIMIT),
        });
        let (description, properties) = match self {
            ToolName::FindColleges => (
                "Find colleges, optionally by city, course offered and maximum annual fees.",
                json!({
                    "city": {"type": "string", "description": "City name, e.g. Pune"},
                    "course": {"type": "string", "description": "Course offered, e.g. B.Tech"},
                    "max_fees": {"type": "integer", "description": "Maximum annual fees in INR"},
                    "limit": limit,
                }),
            ),
            ToolName::FindCareers => (
                "Find careers, optionally by field and a keyword matched against career tags.",
                json!({
                    "field": {"type": "string", "description": "Field, e.g. Healthcare"},
                    "keyword": {"type": "string", "description": "Interest keyword, e.g. biology"},
                    "limit": limit,
                }),
            ),
            ToolName::FindExams => (
                "Find entrance exams, optionally by stream and level.",
                json!({
                    "stream": {"type": "string", "description": "Stream, e.g. Science"},
                    "level": {"type": "string", "description": "Level, e.g. undergraduate"},
                    "limit": limit,
                }),
            ),
            ToolName::FindScholarships => (
                "Find scholarships, optionally by category and the student's family income.",
                json!({
                    "category": {"type": "string", "description": "Category, e.g. merit"},
                    "family_income": {"type": "integer", "description": "Annual family income in INR"},
                    "limit": limit,
                }),
            ),
        };

        ToolDefinition {
            name: self.to_string(),
            description: description.to_string(),
            parameters: json!({"type": "object", "properties": properties}),
        }
    }
}

/// Arguments of one tool, validated before use.
pub trait ToolArgs: DeserializeOwned {
    /// Reject out-of-range or empty values.
    fn validate(&self) -> Result<(), String>;

    /// Store filters equivalent to the arguments.
    fn filters(&self) -> Vec<Filter>;

    /// Requested result limit.
    fn limit(&self) -> Option<usize>;
}

fn check_text(field: &str, value: &Option<String>) -> Result<(), String> {
    match value {
        Some(text) if text.trim().is_empty() => Err(format!("{} must not be empty", field)),
        _ => Ok(()),
    }
}

fn check_limit(limit: Option<usize>) -> Result<(), String> {
    match limit {
        Some(n) if n == 0 || n > MAX_RESULT_LIMIT => Err(format!(
            "limit must be between 1 and {}, got {}",
            MAX_RESULT_LIMIT, n
        )),
        _ => Ok(()),
    }
}

/// Arguments of [`ToolName::FindColleges`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FindCollegesArgs {
    /// Exact city match
    pub city: Option<String>,
    /// Course that must appear in the college's `courses`
    pub course: Option<String>,
    /// Upper bound on `fees`
    pub max_fees: Option<u64>,
    /// Result limit
    pub limit: Option<usize>,
}

impl ToolArgs for FindCollegesArgs {
    fn validate(&self) -> Result<(), String> {
        check_text("city", &self.city)?;
        check_text("course", &self.course)?;
        check_limit(self.limit)
    }

    fn filters(&self) -> Vec<Filter> {
        let mut filters = Vec::new();
        if let Some(city) = &self.city {
            filters.push(Filter::equals("city", city.trim()));
        }
        if let Some(course) = &self.course {
            filters.push(Filter::new("courses", FilterOp::Contains, course.trim()));
        }
        if let Some(max_fees) = self.max_fees {
            filters.push(Filter::new("fees", FilterOp::Le, max_fees));
        }
        filters
    }

    fn limit(&self) -> Option<usize> {
        self.limit
    }
}

/// Arguments of [`ToolName::FindCareers`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FindCareersArgs {
    /// Exact field match
    pub field: Option<String>,
    /// Keyword that must appear in the career's `tags`
    pub keyword: Option<String>,
    /// Result limit
    pub limit: Option<usize>,
}

impl ToolArgs for FindCareersArgs {
    fn validate(&self) -> Result<(), String> {
        check_text("field", &self.field)?;
        check_text("keyword", &self.keyword)?;
        check_limit(self.limit)
    }

    fn filters(&self) -> Vec<Filter> {
        let mut filters = Vec::new();
        if let Some(field) = &self.field {
            filters.push(Filter::equals("field", field.trim()));
        }
        if let Some(keyword) = &self.keyword {
            filters.push(Filter::new("tags", FilterOp::Contains, keyword.trim()));
        }
        filters
    }

    fn limit(&self) -> Option<usize> {
        self.limit
    }
}

/// Arguments of [`ToolName::FindExams`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FindExamsArgs {
    /// Stream that must appear in the exam's `streams`
    pub stream: Option<String>,
    /// Exact level match
    pub level: Option<String>,
    /// Result limit
    pub limit: Option<usize>,
}

impl ToolArgs for FindExamsArgs {
    fn validate(&self) -> Result<(), String> {
        check_text("stream", &self.stream)?;
        check_text("level", &self.level)?;
        check_limit(self.limit)
    }

    fn filters(&self) -> Vec<Filter> {
        let mut filters = Vec::new();
        if let Some(stream) = &self.stream {
            filters.push(Filter::new("streams", FilterOp::Contains, stream.trim()));
        }
        if let Some(level) = &self.level {
            filters.push(Filter::equals("level", level.trim()));
        }
        filters
    }

    fn limit(&self) -> Option<usize> {
        self.limit
    }
}

/// Arguments of [`ToolName::FindScholarships`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FindScholarshipsArgs {
    /// Category that must appear in the scholarship's `categories`
    pub category: Option<String>,
    /// Family income; scholarships with a lower `income_limit` are excluded
    pub family_income: Option<u64>,
    /// Result limit
    pub limit: Option<usize>,
}

impl ToolArgs for FindScholarshipsArgs {
    fn validate(&self) -> Result<(), String> {
        check_text("category", &self.category)?;
        check_limit(self.limit)
    }

    fn filters(&self) -> Vec<Filter> {
        let mut filters = Vec::new();
        if let Some(category) = &self.category {
            filters.push(Filter::new("categories", FilterOp::Contains, category.trim()));
        }
        if let Some(income) = self.family_income {
            filters.push(Filter::new("income_limit", FilterOp::Ge, income));
        }
        filters
    }

    fn limit(&self) -> Option<usize> {
        self.limit
    }
}

/// A parsed, validated tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInvocation {
    /// Colleges lookup
    FindColleges(FindCollegesArgs),
    /// Careers lookup
    FindCareers(FindCareersArgs),
    /// Exams lookup
    FindExams(FindExamsArgs),
    /// Scholarships lookup
    FindScholarships(FindScholarshipsArgs),
}

impl ToolInvocation {
    /// Parse and validate a model's tool call.
    ///
    /// # Errors
    ///
    /// Returns `UnknownTool` for names outside [`ToolName`] and
    /// `InvalidArguments` for malformed or out-of-range arguments.
    pub fn parse(call: &ToolCall) -> Result<Self, ToolError> {
        let name = ToolName::from_str(&call.name)
            .map_err(|_| ToolError::new(ToolErrorKind::UnknownTool(call.name.clone())))?;

        Ok(match name {
            ToolName::FindColleges => Self::FindColleges(parse_args(name, &call.arguments)?),
            ToolName::FindCareers => Self::FindCareers(parse_args(name, &call.arguments)?),
            ToolName::FindExams => Self::FindExams(parse_args(name, &call.arguments)?),
            ToolName::FindScholarships => {
                Self::FindScholarships(parse_args(name, &call.arguments)?)
            }
        })
    }

    /// Which tool this invokes.
    pub fn name(&self) -> ToolName {
        match self {
            Self::FindColleges(_) => ToolName::FindColleges,
            Self::FindCareers(_) => ToolName::FindCareers,
            Self::FindExams(_) => ToolName::FindExams,
            Self::FindScholarships(_) => ToolName::FindScholarships,
        }
    }

    fn args(&self) -> &dyn ArgsView {
        match self {
            Self::FindColleges(args) => args,
            Self::FindCareers(args) => args,
            Self::FindExams(args) => args,
            Self::FindScholarships(args) => args,
        }
    }
}

/// Object-safe view of [`ToolArgs`] used after parsing.
trait ArgsView {
    fn filters(&self) -> Vec<Filter>;
    fn limit(&self) -> Option<usize>;
}

impl<T: ToolArgs> ArgsView for T {
    fn filters(&self) -> Vec<Filter> {
        ToolArgs::filters(self)
    }

    fn limit(&self) -> Option<usize> {
        ToolArgs::limit(self)
    }
}

fn parse_args<T: ToolArgs>(name: ToolName, arguments: &Value) -> Result<T, ToolError> {
    let invalid = |reason: String| {
        ToolError::new(ToolErrorKind::InvalidArguments {
            tool: name.to_string(),
            reason,
        })
    };

    // Models send `{}` or nothing at all for "no filters"
    let arguments = match arguments {
        Value::Null => json!({}),
        other => other.clone(),
    };
    let args: T = serde_json::from_value(arguments).map_err(|e| invalid(e.to_string()))?;
    args.validate().map_err(invalid)?;
    Ok(args)
}

/// Typed result of a lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Tool that produced the results
    pub tool: ToolName,
    /// Number of results
    pub count: usize,
    /// Matching documents, each with its `id`
    pub results: Vec<Value>,
}

/// Dispatches tool calls to document store lookups.
#[derive(Clone)]
pub struct ToolRegistry {
    store: Arc<dyn DocumentStore>,
    enabled: Vec<ToolName>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl ToolRegistry {
    /// Registry offering every tool.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            enabled: ToolName::iter().collect(),
        }
    }

    /// Registry offering only `tools`.
    pub fn with_tools(store: Arc<dyn DocumentStore>, tools: &[ToolName]) -> Self {
        Self {
            store,
            enabled: tools.to_vec(),
        }
    }

    /// Tools this registry offers.
    pub fn enabled(&self) -> &[ToolName] {
        &self.enabled
    }

    /// Run a validated invocation.
    ///
    /// # Errors
    ///
    /// Returns `Execution` when the store query fails.
    #[instrument(skip(self), fields(tool = %invocation.name()))]
    pub async fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError> {
        let name = invocation.name();
        let args = invocation.args();
        let limit = args.limit().unwrap_or(DEFAULT_RESULT_LIMIT);

        let records = self
            .store
            .query(name.collection(), &args.filters(), Some(limit))
            .await
            .map_err(|e| {
                ToolError::new(ToolErrorKind::Execution {
                    tool: name.to_string(),
                    reason: e.kind.to_string(),
                })
            })?;

        let results: Vec<Value> = records
            .into_iter()
            .map(|record| match record.data {
                Value::Object(mut fields) => {
                    fields.insert("id".to_string(), Value::String(record.path.id));
                    Value::Object(fields)
                }
                other => json!({"id": record.path.id, "value": other}),
            })
            .collect();

        debug!(count = results.len(), "Tool lookup complete");
        Ok(ToolOutput {
            tool: name,
            count: results.len(),
            results,
        })
    }
}

#[async_trait]
impl ToolInvoker for ToolRegistry {
    fn definitions(&self) -> Vec<ToolDefinition> {
        self.enabled.iter().map(|tool| tool.definition()).collect()
    }

    async fn invoke(&self, call: &ToolCall) -> Result<Value, ToolError> {
        let invocation = ToolInvocation::parse(call)?;
        if !self.enabled.contains(&invocation.name()) {
            return Err(ToolError::new(ToolErrorKind::UnknownTool(call.name.clone())));
        }

        let output = self.run(&invocation).await?;
        serde_json::to_value(output).map_err(|e| {
            ToolError::new(ToolErrorKind::Execution {
                tool: call.name.clone(),
                reason: e.to_string(),
            })
        })
    }
}

/// Final state of a tool-calling conversation.
#[derive(Debug, Clone)]
pub struct ToolLoopOutcome {
    /// The model's final, tool-free response
    pub response: GenerationResponse,
    /// Every message exchanged, including tool calls and results
    pub messages: Vec<Message>,
    /// Number of tool rounds performed
    pub rounds: usize,
}

/// Alternate model calls and tool invocations until the model answers
/// without calling a tool.
///
/// Each model call goes through `client` with `policy`. Tool failures are
/// reported back to the model as `{"error": ...}` results so it can correct
/// its arguments.
///
/// # Errors
///
/// Returns the generation error of any model call, or `RoundLimit` when the
/// model still requests tools after `max_rounds` rounds.
#[instrument(skip_all, fields(max_rounds = max_rounds))]
pub async fn run_with_tools(
    client: &ResilientGenerationClient,
    invoker: &dyn ToolInvoker,
    request: &GenerationRequest,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    max_rounds: usize,
) -> LakshyaResult<ToolLoopOutcome> {
    let base = request.with_tools(invoker.definitions());
    let mut messages = request.messages();
    let mut rounds = 0;

    loop {
        let response = client
            .execute(&base.with_prompt(Prompt::Messages(messages.clone())), policy, cancel)
            .await?;

        let calls = response.tool_calls();
        if calls.is_empty() {
            debug!(rounds, "Model answered without tool calls");
            return Ok(ToolLoopOutcome {
                response,
                messages,
                rounds,
            });
        }
        if rounds == max_rounds {
            warn!(rounds, "Model kept requesting tools");
            return Err(ToolError::new(ToolErrorKind::RoundLimit(max_rounds)).into());
        }
        rounds += 1;

        messages.push(response.to_message());
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            let output = match invoker.invoke(&call).await {
                Ok(output) => output,
                Err(e) => {
                    warn!(tool = %call.name, error = %e.kind, "Tool call failed");
                    json!({"error": e.kind.to_string()})
                }
            };
            results.push(Part::ToolResult {
                id: call.id,
                name: call.name,
                output,
            });
        }
        messages.push(Message {
            role: Role::Tool,
            content: results,
        });
    }
}
