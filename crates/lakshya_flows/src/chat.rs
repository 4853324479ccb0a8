//! Counselor chat sessions.

use crate::StreamAccumulator;
use lakshya_core::{
    ConversationTranscript, GenerationRequest, Message, Prompt, RetryPolicy, Role,
};
use lakshya_error::{
    GenerationError, GenerationErrorKind, LakshyaResult, StorageError, StorageErrorKind,
};
use lakshya_interface::{DocumentPath, DocumentStore, PromptRenderer};
use lakshya_rate_limit::{ChatConfig, ResilientGenerationClient};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Collection holding one document per chat session.
pub const CHAT_SESSIONS_COLLECTION: &str = "chat_sessions";

/// Template rendered into the system message of every turn.
pub const COUNSELOR_TEMPLATE: &str = "counselor_system";

/// What the counselor knows about the student.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    /// Student's name
    pub name: String,
    /// Class or year, e.g. "Class 11"
    pub grade: String,
    /// Subjects and activities the student enjoys
    #[serde(default)]
    pub interests: Vec<String>,
    /// Home city, when known
    #[serde(default)]
    pub city: Option<String>,
}

/// Stored form of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSessionDocument {
    /// Student the session belongs to
    pub profile: StudentProfile,
    /// Messages so far
    pub transcript: ConversationTranscript,
}

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum TurnStatus {
    /// The reply streamed to completion
    Complete,
    /// The stream stopped early; the reply holds what arrived
    Interrupted,
    /// Nothing usable arrived; the reply is the fallback message
    Failed,
}

/// Result of one counselor turn.
#[derive(Debug)]
pub struct ChatTurn {
    /// Text appended to the transcript as the assistant message
    pub reply: String,
    /// How the turn ended
    pub status: TurnStatus,
    /// Underlying failure for interrupted and failed turns
    pub error: Option<GenerationError>,
    /// Background save of the session, started only for complete turns;
    /// resolves to whether it succeeded
    pub persistence: Option<JoinHandle<bool>>,
}

impl ChatTurn {
    /// Whether the reply stopped before the model finished.
    pub fn interrupted(&self) -> bool {
        self.status != TurnStatus::Complete
    }
}

/// A counselor conversation with one student.
///
/// Each call to [`send_turn`](Self::send_turn) streams one assistant reply.
/// A reply that streams to completion saves the whole session in the
/// background. Saving never blocks or changes the turn: failures are logged
/// and dropped.
pub struct CounselorChat {
    client: ResilientGenerationClient,
    store: Arc<dyn DocumentStore>,
    renderer: Arc<dyn PromptRenderer>,
    policy: RetryPolicy,
    config: ChatConfig,
    profile: StudentProfile,
    transcript: ConversationTranscript,
}

impl std::fmt::Debug for CounselorChat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CounselorChat")
            .field("session_id", &self.transcript.session_id())
            .field("messages", &self.transcript.len())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl CounselorChat {
    /// Start a new session.
    pub fn new(
        client: ResilientGenerationClient,
        store: Arc<dyn DocumentStore>,
        renderer: Arc<dyn PromptRenderer>,
        profile: StudentProfile,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            policy: client.default_policy().clone(),
            client,
            store,
            renderer,
            config: ChatConfig::default(),
            profile,
            transcript: ConversationTranscript::new(session_id),
        }
    }

    /// Continue a stored session, or start it fresh when none exists.
    ///
    /// A stored profile wins over `profile`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or the stored document
    /// is malformed.
    #[instrument(skip(client, store, renderer, profile))]
    pub async fn resume(
        client: ResilientGenerationClient,
        store: Arc<dyn DocumentStore>,
        renderer: Arc<dyn PromptRenderer>,
        profile: StudentProfile,
        session_id: &str,
    ) -> LakshyaResult<Self> {
        let path = DocumentPath::new(CHAT_SESSIONS_COLLECTION, session_id);
        let stored = store.get_record(&path).await?;

        let mut chat = Self::new(client, store, renderer, profile, session_id);
        if let Some(record) = stored {
            let document: ChatSessionDocument =
                serde_json::from_value(record.data).map_err(|e| {
                    StorageError::new(StorageErrorKind::Serialization(format!(
                        "{}: {}",
                        path, e
                    )))
                })?;
            info!(messages = document.transcript.len(), "Resumed chat session");
            chat.profile = document.profile;
            chat.transcript = document.transcript;
        }
        Ok(chat)
    }

    /// Retry policy for every turn.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// History length and fallback text.
    pub fn with_config(mut self, config: ChatConfig) -> Self {
        self.config = config;
        self
    }

    /// Messages so far.
    pub fn transcript(&self) -> &ConversationTranscript {
        &self.transcript
    }

    /// The student.
    pub fn profile(&self) -> &StudentProfile {
        &self.profile
    }

    /// Send the student's message and stream the counselor's reply.
    ///
    /// `on_snapshot` receives the reply-so-far once per fragment. The user
    /// message is always appended to the transcript. The assistant message
    /// is appended when the model produced text, complete or partial; a
    /// failed turn returns the fallback message without recording it. Only a
    /// complete turn is saved, once, in the background.
    #[instrument(skip(self, user_text, on_snapshot, cancel), fields(session_id = %self.transcript.session_id()))]
    pub async fn send_turn<F>(
        &mut self,
        user_text: &str,
        on_snapshot: F,
        cancel: &CancellationToken,
    ) -> ChatTurn
    where
        F: FnMut(&str) + Send,
    {
        let request = self.build_request(user_text);
        self.transcript
            .push(Message::with_text(Role::User, user_text));

        let mut accumulator = StreamAccumulator::new();
        let outcome = match request {
            Ok(request) => match self.client.execute_stream(&request, &self.policy, cancel).await {
                Ok(stream) => accumulator.consume(stream, cancel, on_snapshot).await,
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        };

        let (reply, status, error) = match outcome {
            Ok(text) => (text, TurnStatus::Complete, None),
            Err(e) if !accumulator.buffer().is_empty() => {
                warn!(error = %e.kind, "Keeping partial reply");
                (accumulator.buffer().to_string(), TurnStatus::Interrupted, Some(e))
            }
            Err(e) => {
                error!(error = %e.kind, "Counselor reply failed");
                (self.config.fallback_message().clone(), TurnStatus::Failed, Some(e))
            }
        };

        if status != TurnStatus::Failed {
            self.transcript
                .push(Message::with_text(Role::Assistant, reply.clone()));
        }
        let persistence = (status == TurnStatus::Complete).then(|| self.persist());

        ChatTurn {
            reply,
            status,
            error,
            persistence,
        }
    }

    fn build_request(&self, user_text: &str) -> Result<GenerationRequest, GenerationError> {
        let system = self
            .renderer
            .render(COUNSELOR_TEMPLATE, &json!({ "profile": self.profile }))
            .map_err(|e| {
                GenerationError::new(GenerationErrorKind::InvalidRequest(e.to_string()))
            })?;

        let mut messages = Vec::with_capacity(self.config.history_limit() + 2);
        messages.push(Message::with_text(Role::System, system));
        messages.extend(
            self.transcript
                .recent(*self.config.history_limit())
                .iter()
                .cloned(),
        );
        messages.push(Message::with_text(Role::User, user_text));

        Ok(GenerationRequest::from_text(user_text).with_prompt(Prompt::Messages(messages)))
    }

    /// Save a snapshot of the session without waiting for the write.
    fn persist(&self) -> JoinHandle<bool> {
        let store = Arc::clone(&self.store);
        let path = DocumentPath::new(CHAT_SESSIONS_COLLECTION, self.transcript.session_id());
        let document = ChatSessionDocument {
            profile: self.profile.clone(),
            transcript: self.transcript.snapshot(),
        };

        tokio::spawn(async move {
            let data = match serde_json::to_value(&document) {
                Ok(data) => data,
                Err(e) => {
                    error!(path = %path, error = %e, "Failed to serialize chat session");
                    return false;
                }
            };
            match store.set_record(&path, data).await {
                Ok(()) => {
                    debug!(path = %path, messages = document.transcript.len(), "Saved chat session");
                    true
                }
                Err(e) => {
                    error!(path = %path, error = %e.kind, "Failed to save chat session");
                    false
                }
            }
        })
    }
}
