use lakshya_core::RetryPolicy;
use std::time::Duration;

#[test]
fn default_policy_matches_documented_values() {
    let policy = RetryPolicy::default();
    assert_eq!(*policy.max_attempts(), 3);
    assert_eq!(*policy.base_delay_ms(), 2000);
    assert_eq!(*policy.backoff_multiplier(), 2.0);
    assert!(policy.validate().is_ok());
}

#[test]
fn builder_fills_unset_fields_with_defaults() {
    let policy = RetryPolicy::builder().max_attempts(5).build().unwrap();

    assert_eq!(*policy.max_attempts(), 5);
    assert_eq!(*policy.base_delay_ms(), 2000); // Default
    assert_eq!(*policy.backoff_multiplier(), 2.0); // Default
}

#[test]
fn delays_grow_exponentially_from_attempt_index() {
    let policy = RetryPolicy::builder()
        .max_attempts(4)
        .base_delay_ms(500)
        .backoff_multiplier(3.0)
        .build()
        .unwrap();

    let delays: Vec<_> = policy.delays().collect();
    assert_eq!(
        delays,
        vec![
            Duration::from_millis(500),
            Duration::from_millis(1500),
            Duration::from_millis(4500),
        ]
    );
}

#[test]
fn delays_strictly_increase() {
    let policy = RetryPolicy::builder()
        .max_attempts(8)
        .base_delay_ms(10)
        .backoff_multiplier(1.5)
        .build()
        .unwrap();

    let delays: Vec<_> = policy.delays().collect();
    assert_eq!(delays.len(), 7);
    assert!(delays.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn single_attempt_policy_has_no_delays() {
    let policy = RetryPolicy::no_retry();
    assert_eq!(policy.max_retries(), 0);
    assert_eq!(policy.delays().count(), 0);
    assert_eq!(policy.worst_case_wait(), Duration::ZERO);
}

#[test]
fn worst_case_wait_is_bounded_by_geometric_sum() {
    for attempts in 1..=6u32 {
        let policy = RetryPolicy::builder()
            .max_attempts(attempts)
            .build()
            .unwrap();
        let bound = Duration::from_millis(2000 * (2u64.pow(attempts) - 1));
        assert!(policy.worst_case_wait() <= bound);
    }
}

#[test]
fn validate_rejects_invalid_policies() {
    assert!(RetryPolicy::builder().max_attempts(0).build().unwrap().validate().is_err());
    assert!(RetryPolicy::builder().base_delay_ms(0).build().unwrap().validate().is_err());
    assert!(RetryPolicy::builder().backoff_multiplier(1.0).build().unwrap().validate().is_err());
    assert!(RetryPolicy::builder().backoff_multiplier(f64::NAN).build().unwrap().validate().is_err());
}

#[test]
fn deserializes_with_partial_fields() {
    let policy: RetryPolicy = serde_json::from_str(r#"{"max_attempts": 5}"#).unwrap();
    assert_eq!(*policy.max_attempts(), 5);
    assert_eq!(*policy.base_delay_ms(), 2000);

    let unknown = serde_json::from_str::<RetryPolicy>(r#"{"max_tries": 5}"#);
    assert!(unknown.is_err());
}
