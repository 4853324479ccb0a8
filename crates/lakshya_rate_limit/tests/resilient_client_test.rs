//! Tests for retry behavior of the resilient generation client.
//!
//! Every test runs on tokio's paused clock, so backoff delays complete
//! instantly while `tokio::time::Instant` still observes their exact length.

use futures_util::StreamExt;
use lakshya_core::{AttemptOutcome, GenerationRequest, GenerationResponse, Output, RetryPolicy};
use lakshya_error::GenerationErrorKind;
use lakshya_models::{ScriptedBackend, ScriptedReply, StreamStep};
use lakshya_rate_limit::{CancellationToken, ResilientGenerationClient};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn client_for(backend: &Arc<ScriptedBackend>) -> ResilientGenerationClient {
    ResilientGenerationClient::new(backend.clone())
}

fn policy(max_attempts: u32, base_delay_ms: u64, backoff_multiplier: f64) -> RetryPolicy {
    RetryPolicy::builder()
        .max_attempts(max_attempts)
        .base_delay_ms(base_delay_ms)
        .backoff_multiplier(backoff_multiplier)
        .build()
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_always_rate_limited_exhausts_every_attempt() {
    for n in 1..=5 {
        let backend = Arc::new(ScriptedBackend::always(ScriptedReply::rate_limited()));
        let client = client_for(&backend);

        let result = client
            .execute(
                &GenerationRequest::from_text("Hi"),
                &policy(n, 100, 2.0),
                &CancellationToken::new(),
            )
            .await;

        match result.map_err(|e| e.kind) {
            Err(GenerationErrorKind::RetriesExhausted { attempts, last }) => {
                assert_eq!(attempts, n);
                assert!(last.contains("exhausted"));
            }
            other => panic!("expected RetriesExhausted, got {:?}", other),
        }
        assert_eq!(backend.call_count(), n as usize);
    }
}

#[tokio::test(start_paused = true)]
async fn test_backoff_delays_follow_schedule() {
    let backend = Arc::new(ScriptedBackend::always(ScriptedReply::rate_limited()));
    let client = client_for(&backend);
    let policy = policy(4, 300, 3.0);

    let _ = client
        .execute(
            &GenerationRequest::from_text("Hi"),
            &policy,
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(
        backend.call_gaps(),
        vec![
            Duration::from_millis(300),
            Duration::from_millis(900),
            Duration::from_millis(2700),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_success_after_rate_limits_returns_payload_unchanged() -> anyhow::Result<()> {
    let payload = GenerationResponse {
        outputs: vec![
            Output::Text("Engineering suits you.".into()),
            Output::Json(serde_json::json!({"stream": "science"})),
        ],
    };
    for i in 0..3u32 {
        let mut replies: Vec<_> = (0..i).map(|_| ScriptedReply::rate_limited()).collect();
        replies.push(ScriptedReply::Response(payload.clone()));
        let backend = Arc::new(ScriptedBackend::new(replies));
        let client = client_for(&backend);

        let report = client
            .execute_with_report(
                &GenerationRequest::from_text("Hi"),
                &policy(3, 2000, 2.0),
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(report.result?, payload);
        assert_eq!(backend.call_count(), i as usize + 1);
        assert_eq!(report.attempts.len(), i as usize + 1);
        let retries = report
            .attempts
            .iter()
            .filter(|a| matches!(a.outcome, AttemptOutcome::RateLimited(_)))
            .count();
        assert_eq!(retries, i as usize);
        assert!(report.attempts.last().is_some_and(|a| a.succeeded()));
    }
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_non_rate_limit_error_fails_immediately() {
    for status in [400u16, 401, 500, 503] {
        let backend = Arc::new(ScriptedBackend::new([
            ScriptedReply::http_error(status, "boom"),
            ScriptedReply::text("never reached"),
        ]));
        let client = client_for(&backend);
        let started = Instant::now();

        let result = client
            .execute(
                &GenerationRequest::from_text("Hi"),
                &RetryPolicy::default(),
                &CancellationToken::new(),
            )
            .await;

        match result.map_err(|e| e.kind) {
            Err(GenerationErrorKind::Backend { status: got, .. }) => {
                assert_eq!(got, Some(status))
            }
            other => panic!("expected Backend error, got {:?}", other),
        }
        assert_eq!(backend.call_count(), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}

#[tokio::test(start_paused = true)]
async fn test_default_policy_waits_2000_then_4000() -> anyhow::Result<()> {
    let backend = Arc::new(ScriptedBackend::new([
        ScriptedReply::rate_limited(),
        ScriptedReply::rate_limited(),
        ScriptedReply::text("third time lucky"),
    ]));
    let client = client_for(&backend);
    let started = Instant::now();

    let response = client
        .execute(
            &GenerationRequest::from_text("Hi"),
            &policy(3, 2000, 2.0),
            &CancellationToken::new(),
        )
        .await?;

    assert_eq!(response.text(), "third time lucky");
    assert_eq!(backend.call_count(), 3);
    assert_eq!(
        backend.call_gaps(),
        vec![Duration::from_millis(2000), Duration::from_millis(4000)]
    );
    assert_eq!(started.elapsed(), Duration::from_millis(6000));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_single_attempt_policy_never_retries() {
    let backend = Arc::new(ScriptedBackend::new([
        ScriptedReply::rate_limited(),
        ScriptedReply::text("unused"),
    ]));
    let client = client_for(&backend);
    let started = Instant::now();

    let result = client
        .execute(
            &GenerationRequest::from_text("Hi"),
            &RetryPolicy::no_retry(),
            &CancellationToken::new(),
        )
        .await;

    assert!(matches!(
        result.map_err(|e| e.kind),
        Err(GenerationErrorKind::RetriesExhausted { attempts: 1, .. })
    ));
    assert_eq!(backend.call_count(), 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_backoff_yields_cancelled() {
    let backend = Arc::new(ScriptedBackend::always(ScriptedReply::rate_limited()));
    let client = client_for(&backend);
    let cancel = CancellationToken::new();

    let canceller = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(1000)).await;
            cancel.cancel();
        })
    };

    let started = Instant::now();
    let result = client
        .execute(
            &GenerationRequest::from_text("Hi"),
            &policy(3, 2000, 2.0),
            &cancel,
        )
        .await;
    let _ = canceller.await;

    assert!(matches!(
        result.map_err(|e| e.kind),
        Err(GenerationErrorKind::Cancelled)
    ));
    assert_eq!(backend.call_count(), 1);
    assert_eq!(started.elapsed(), Duration::from_millis(1000));
}

#[tokio::test(start_paused = true)]
async fn test_already_cancelled_makes_no_call() {
    let backend = Arc::new(ScriptedBackend::always(ScriptedReply::text("Hi")));
    let client = client_for(&backend);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = client
        .execute(&GenerationRequest::from_text("Hi"), &RetryPolicy::default(), &cancel)
        .await;

    assert!(matches!(
        result.map_err(|e| e.kind),
        Err(GenerationErrorKind::Cancelled)
    ));
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_huge_attempt_budget_succeeds_on_first_call() -> anyhow::Result<()> {
    let backend = Arc::new(ScriptedBackend::always(ScriptedReply::text("ok")));
    let client = client_for(&backend);

    let report = client
        .execute_with_report(
            &GenerationRequest::from_text("Hi"),
            &policy(u32::MAX, 2000, 2.0),
            &CancellationToken::new(),
        )
        .await;

    assert_eq!(report.result?.text(), "ok");
    assert_eq!(report.attempts.len(), 1);
    assert_eq!(backend.call_count(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_invalid_policy_rejected_without_calls() {
    let backend = Arc::new(ScriptedBackend::always(ScriptedReply::text("Hi")));
    let client = client_for(&backend);

    let result = client
        .execute(
            &GenerationRequest::from_text("Hi"),
            &policy(0, 2000, 2.0),
            &CancellationToken::new(),
        )
        .await;

    assert!(matches!(
        result.map_err(|e| e.kind),
        Err(GenerationErrorKind::InvalidRequest(_))
    ));
    assert_eq!(backend.call_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stream_open_is_retried_on_rate_limit() -> anyhow::Result<()> {
    let backend = Arc::new(ScriptedBackend::new([
        ScriptedReply::rate_limited(),
        ScriptedReply::fragments(["Hello", " ", "world"]),
    ]));
    let client = client_for(&backend);

    let stream = client
        .execute_stream(
            &GenerationRequest::from_text("Hi"),
            &policy(3, 2000, 2.0),
            &CancellationToken::new(),
        )
        .await?;
    let fragments: Vec<String> = stream.map(|f| f.expect("fragment")).collect().await;

    assert_eq!(fragments, vec!["Hello", " ", "world"]);
    assert_eq!(backend.call_count(), 2);
    assert_eq!(backend.call_gaps(), vec![Duration::from_millis(2000)]);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_mid_stream_failure_is_not_retried() -> anyhow::Result<()> {
    let backend = Arc::new(
        ScriptedBackend::new([ScriptedReply::Stream(vec![
            StreamStep::Fragment("Hello".into()),
            StreamStep::Fail(GenerationErrorKind::from_status(429, "quota")),
        ])])
        .then_always(ScriptedReply::text("should not be used")),
    );
    let client = client_for(&backend);

    let stream = client
        .execute_stream(
            &GenerationRequest::from_text("Hi"),
            &RetryPolicy::default(),
            &CancellationToken::new(),
        )
        .await?;
    let items: Vec<_> = stream.collect().await;

    assert_eq!(items.len(), 2);
    assert!(items[1].is_err());
    assert_eq!(backend.call_count(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_callers_keep_independent_schedules() -> anyhow::Result<()> {
    let limited = Arc::new(ScriptedBackend::new([
        ScriptedReply::rate_limited(),
        ScriptedReply::text("slow"),
    ]));
    let healthy = Arc::new(ScriptedBackend::always(ScriptedReply::text("fast")));
    let slow_client = client_for(&limited);
    let fast_client = client_for(&healthy);
    let cancel = CancellationToken::new();
    let request = GenerationRequest::from_text("Hi");
    let default_policy = RetryPolicy::default();
    let started = Instant::now();

    let (slow, fast) = tokio::join!(
        slow_client.execute(&request, &default_policy, &cancel),
        async {
            let response = fast_client.execute(&request, &default_policy, &cancel).await;
            (response, started.elapsed())
        }
    );

    assert_eq!(slow?.text(), "slow");
    let (fast, fast_elapsed) = fast;
    assert_eq!(fast?.text(), "fast");
    assert_eq!(fast_elapsed, Duration::ZERO);
    Ok(())
}
