//! Counselor chat turns: streaming, fallbacks and background persistence.

use async_trait::async_trait;
use lakshya_core::Role;
use lakshya_error::{GenerationErrorKind, StorageError, StorageErrorKind, StorageResult};
use lakshya_flows::{
    CHAT_SESSIONS_COLLECTION, ChatSessionDocument, ChatTurn, CounselorChat, StudentProfile,
    TemplateRenderer, TurnStatus,
};
use lakshya_interface::{DocumentPath, DocumentStore, Filter, Record};
use lakshya_models::{ScriptedBackend, ScriptedReply, StreamStep};
use lakshya_rate_limit::{CancellationToken, ChatConfig, ResilientGenerationClient};
use lakshya_storage::InMemoryDocumentStore;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory store that counts writes and can fail or stall them.
#[derive(Debug, Default)]
struct RecordingStore {
    inner: InMemoryDocumentStore,
    writes: AtomicUsize,
    fail_writes: bool,
    write_delay: Option<Duration>,
}

impl RecordingStore {
    fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    fn slow(delay: Duration) -> Self {
        Self {
            write_delay: Some(delay),
            ..Self::default()
        }
    }

    fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn query(
        &self,
        collection: &str,
        filters: &[Filter],
        limit: Option<usize>,
    ) -> StorageResult<Vec<Record>> {
        self.inner.query(collection, filters, limit).await
    }

    async fn get_record(&self, path: &DocumentPath) -> StorageResult<Option<Record>> {
        self.inner.get_record(path).await
    }

    async fn add_record(&self, collection: &str, data: Value) -> StorageResult<DocumentPath> {
        self.inner.add_record(collection, data).await
    }

    async fn set_record(&self, path: &DocumentPath, data: Value) -> StorageResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_writes {
            return Err(StorageError::new(StorageErrorKind::Unavailable(
                "permission denied".to_string(),
            )));
        }
        self.inner.set_record(path, data).await
    }

    async fn delete_record(&self, path: &DocumentPath) -> StorageResult<()> {
        self.inner.delete_record(path).await
    }
}

fn profile() -> StudentProfile {
    StudentProfile {
        name: "Asha".to_string(),
        grade: "Class 11".to_string(),
        interests: vec!["biology".to_string(), "art".to_string()],
        city: Some("Pune".to_string()),
    }
}

fn renderer() -> Arc<TemplateRenderer> {
    Arc::new(TemplateRenderer::new().with_template(
        "counselor_system",
        "You are Disha. Student {{profile.name}} in {{profile.grade}} likes {{profile.interests}}.",
    ))
}

fn chat(backend: &Arc<ScriptedBackend>, store: &Arc<RecordingStore>) -> CounselorChat {
    CounselorChat::new(
        ResilientGenerationClient::new(backend.clone()),
        store.clone(),
        renderer(),
        profile(),
        "session-1",
    )
}

async fn stored_session(store: &RecordingStore) -> anyhow::Result<Option<ChatSessionDocument>> {
    let record = store
        .get_record(&DocumentPath::new(CHAT_SESSIONS_COLLECTION, "session-1"))
        .await?;
    Ok(record
        .map(|record| serde_json::from_value(record.data))
        .transpose()?)
}

async fn saved(turn: ChatTurn) -> anyhow::Result<bool> {
    Ok(turn.persistence.expect("complete turns are saved").await?)
}

#[tokio::test]
async fn test_turn_streams_snapshots_and_persists_once() -> anyhow::Result<()> {
    let backend = Arc::new(ScriptedBackend::new([ScriptedReply::fragments([
        "Hello", " ", "world",
    ])]));
    let store = Arc::new(RecordingStore::default());
    let mut chat = chat(&backend, &store);

    let mut snapshots = Vec::new();
    let turn = chat
        .send_turn(
            "Hi",
            |snapshot| snapshots.push(snapshot.to_string()),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(snapshots, vec!["Hello", "Hello ", "Hello world"]);
    assert_eq!(turn.reply, "Hello world");
    assert_eq!(turn.status, TurnStatus::Complete);
    assert!(!turn.interrupted());
    assert!(turn.error.is_none());
    assert!(saved(turn).await?);
    assert_eq!(store.writes(), 1);

    let session = stored_session(&store).await?.expect("session saved");
    assert_eq!(session.profile, profile());
    assert_eq!(session.transcript.len(), 2);
    assert_eq!(session.transcript.messages()[0].role, Role::User);
    assert_eq!(session.transcript.messages()[1].text(), "Hello world");
    Ok(())
}

#[tokio::test]
async fn test_prompt_carries_system_message_and_history() -> anyhow::Result<()> {
    let backend = Arc::new(ScriptedBackend::new([
        ScriptedReply::text("Biology opens many doors."),
        ScriptedReply::text("Try NEET."),
    ]));
    let store = Arc::new(RecordingStore::default());
    let mut chat = chat(&backend, &store);
    let cancel = CancellationToken::new();

    saved(chat.send_turn("What can I study?", |_| {}, &cancel).await).await?;
    saved(chat.send_turn("Which exam?", |_| {}, &cancel).await).await?;

    let calls = backend.calls();
    assert!(calls.iter().all(|call| call.streaming));

    let first = calls[0].request.messages();
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].role, Role::System);
    assert_eq!(
        first[0].text(),
        "You are Disha. Student Asha in Class 11 likes biology, art."
    );

    // system, previous user + assistant, new user
    let second = calls[1].request.messages();
    assert_eq!(second.len(), 4);
    assert_eq!(second[2].text(), "Biology opens many doors.");
    assert_eq!(second[3].text(), "Which exam?");

    assert_eq!(chat.transcript().len(), 4);
    assert_eq!(store.writes(), 2);
    Ok(())
}

#[tokio::test]
async fn test_history_limit_trims_prompt() -> anyhow::Result<()> {
    let backend = Arc::new(ScriptedBackend::always(ScriptedReply::text("Ok.")));
    let store = Arc::new(RecordingStore::default());
    let config: ChatConfig = serde_json::from_value(json!({"history_limit": 1}))?;
    let mut chat = chat(&backend, &store).with_config(config);
    let cancel = CancellationToken::new();

    for text in ["one", "two", "three"] {
        chat.send_turn(text, |_| {}, &cancel).await;
    }

    let last = backend.calls().pop().expect("three calls");
    let messages = last.request.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].text(), "Ok.");
    assert_eq!(messages[2].text(), "three");
    Ok(())
}

#[tokio::test]
async fn test_mid_stream_failure_keeps_partial_reply() -> anyhow::Result<()> {
    let backend = Arc::new(ScriptedBackend::new([ScriptedReply::Stream(vec![
        StreamStep::Fragment("Hello".to_string()),
        StreamStep::Fail(GenerationErrorKind::Backend {
            status: None,
            message: "connection reset".to_string(),
        }),
    ])]));
    let store = Arc::new(RecordingStore::default());
    let mut chat = chat(&backend, &store);

    let turn = chat.send_turn("Hi", |_| {}, &CancellationToken::new()).await;

    assert_eq!(turn.reply, "Hello");
    assert_eq!(turn.status, TurnStatus::Interrupted);
    assert_eq!(
        turn.error.as_ref().and_then(|e| e.kind.partial()),
        Some("Hello")
    );
    assert!(turn.persistence.is_none());
    assert_eq!(store.writes(), 0);
    assert_eq!(
        chat.transcript().last_from(Role::Assistant).map(|m| m.text()),
        Some("Hello".to_string())
    );
    // Mid-stream failures are not retried
    assert_eq!(backend.call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_failed_call_uses_fallback_message() -> anyhow::Result<()> {
    let backend = Arc::new(ScriptedBackend::new([ScriptedReply::http_error(
        500,
        "internal error",
    )]));
    let store = Arc::new(RecordingStore::default());
    let mut chat = chat(&backend, &store);

    let turn = chat.send_turn("Hi", |_| {}, &CancellationToken::new()).await;

    assert_eq!(turn.reply, "Sorry, I encountered an error.");
    assert_eq!(turn.status, TurnStatus::Failed);
    assert!(matches!(
        turn.error.as_ref().map(|e| &e.kind),
        Some(GenerationErrorKind::Backend { status: Some(500), .. })
    ));
    assert!(turn.persistence.is_none());
    assert_eq!(store.writes(), 0);
    assert!(stored_session(&store).await?.is_none());
    // The fallback is shown, never recorded as a model reply
    assert_eq!(chat.transcript().len(), 1);
    assert!(chat.transcript().last_from(Role::Assistant).is_none());
    assert_eq!(backend.call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_fallback_never_reaches_saved_session() -> anyhow::Result<()> {
    let backend = Arc::new(ScriptedBackend::new([
        ScriptedReply::http_error(500, "internal error"),
        ScriptedReply::text("Let's try again."),
    ]));
    let store = Arc::new(RecordingStore::default());
    let mut chat = chat(&backend, &store);
    let cancel = CancellationToken::new();

    let failed = chat.send_turn("Hi", |_| {}, &cancel).await;
    assert_eq!(failed.status, TurnStatus::Failed);
    assert!(failed.persistence.is_none());

    let turn = chat.send_turn("Hello?", |_| {}, &cancel).await;
    assert!(saved(turn).await?);
    assert_eq!(store.writes(), 1);

    let session = stored_session(&store).await?.expect("session saved");
    let texts: Vec<_> = session
        .transcript
        .messages()
        .iter()
        .map(|message| message.text())
        .collect();
    assert_eq!(texts, vec!["Hi", "Hello?", "Let's try again."]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_turn_is_retried() -> anyhow::Result<()> {
    let backend = Arc::new(ScriptedBackend::new([
        ScriptedReply::rate_limited(),
        ScriptedReply::fragments(["Keep ", "going!"]),
    ]));
    let store = Arc::new(RecordingStore::default());
    let mut chat = chat(&backend, &store);

    let turn = chat.send_turn("Hi", |_| {}, &CancellationToken::new()).await;

    assert_eq!(turn.reply, "Keep going!");
    assert_eq!(turn.status, TurnStatus::Complete);
    assert_eq!(backend.call_count(), 2);
    assert_eq!(backend.call_gaps(), vec![Duration::from_millis(2000)]);
    assert!(saved(turn).await?);
    Ok(())
}

#[tokio::test]
async fn test_failed_save_does_not_change_turn() -> anyhow::Result<()> {
    let backend = Arc::new(ScriptedBackend::new([ScriptedReply::text("Namaste!")]));
    let store = Arc::new(RecordingStore::failing());
    let mut chat = chat(&backend, &store);

    let turn = chat.send_turn("Hi", |_| {}, &CancellationToken::new()).await;

    assert_eq!(turn.reply, "Namaste!");
    assert_eq!(turn.status, TurnStatus::Complete);
    assert!(!saved(turn).await?);
    assert_eq!(store.writes(), 1);
    assert_eq!(chat.transcript().len(), 2);
    assert!(stored_session(&store).await?.is_none());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_turn_returns_before_save_completes() -> anyhow::Result<()> {
    let backend = Arc::new(ScriptedBackend::new([ScriptedReply::text("Done.")]));
    let store = Arc::new(RecordingStore::slow(Duration::from_secs(10)));
    let mut chat = chat(&backend, &store);

    let turn = chat.send_turn("Hi", |_| {}, &CancellationToken::new()).await;
    assert_eq!(turn.reply, "Done.");
    let persistence = turn.persistence.expect("complete turns are saved");
    assert!(!persistence.is_finished());

    assert!(persistence.await?);
    assert!(stored_session(&store).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_cancelled_turn_uses_fallback() -> anyhow::Result<()> {
    let backend = Arc::new(ScriptedBackend::new([ScriptedReply::text("unused")]));
    let store = Arc::new(RecordingStore::default());
    let mut chat = chat(&backend, &store);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let turn = chat.send_turn("Hi", |_| {}, &cancel).await;

    assert_eq!(turn.status, TurnStatus::Failed);
    assert!(matches!(
        turn.error.as_ref().map(|e| &e.kind),
        Some(GenerationErrorKind::Cancelled)
    ));
    assert_eq!(backend.call_count(), 0);
    assert!(turn.persistence.is_none());
    assert_eq!(store.writes(), 0);
    Ok(())
}

#[tokio::test]
async fn test_resume_restores_transcript_and_profile() -> anyhow::Result<()> {
    let backend = Arc::new(ScriptedBackend::always(ScriptedReply::text("Sure.")));
    let store = Arc::new(RecordingStore::default());
    let mut first = chat(&backend, &store);
    saved(
        first
            .send_turn("Remember me?", |_| {}, &CancellationToken::new())
            .await,
    )
    .await?;

    let resumed = CounselorChat::resume(
        ResilientGenerationClient::new(backend.clone()),
        store.clone(),
        renderer(),
        StudentProfile::default(),
        "session-1",
    )
    .await?;
    assert_eq!(resumed.transcript().len(), 2);
    assert_eq!(resumed.profile(), &profile());

    let fresh = CounselorChat::resume(
        ResilientGenerationClient::new(backend.clone()),
        store.clone(),
        renderer(),
        profile(),
        "session-2",
    )
    .await?;
    assert!(fresh.transcript().is_empty());
    Ok(())
}
