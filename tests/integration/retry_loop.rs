//! Integration tests for the sample/validate retry loop

use super::test_utils::{generator, td};
use fixtree::error::GenerationError;
use fixtree::validate::ValidationFailure;
use fixtree::value::Value;

fn has_lines(value: &Value) -> Result<(), ValidationFailure> {
    match value.field("lines").and_then(Value::as_list) {
        Some(lines) if !lines.is_empty() => Ok(()),
        _ => Err(ValidationFailure::new("order has no lines").with_path("$.lines")),
    }
}

/// Test that the loop resamples until the validator accepts
#[test]
fn test_resamples_until_valid() {
    for seed in 0..16 {
        let sampled = generator(seed)
            .with_validator(has_lines)
            .sample_valid(&td("Order"))
            .unwrap();
        assert!(has_lines(&sampled.value).is_ok());
    }
}

/// Test that the accepted instance equals the same attempt sampled directly
#[test]
fn test_accepted_attempt_is_reproducible() {
    let g = generator(21).with_validator(has_lines);
    let sampled = g.sample_valid(&td("Order")).unwrap();
    let replay = g
        .sample_attempt(&td("Order"), sampled.attempts - 1)
        .unwrap();
    assert_eq!(sampled.value, replay);
}

/// Test that exhaustion carries the validator's last diagnostic
#[test]
fn test_exhaustion_carries_violated_paths() {
    let err = generator(3)
        .with_retry_budget(4)
        .with_validator(|_: &Value| -> Result<(), ValidationFailure> {
            Err(ValidationFailure::new("never valid").with_path("$.id"))
        })
        .sample_valid(&td("Order"))
        .unwrap_err();
    match err {
        GenerationError::RetryExhausted { attempts, failure } => {
            assert_eq!(attempts, 4);
            assert!(failure.violated_paths.contains("$.id"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

/// Test that sample_many validates every member of the batch
#[test]
fn test_batch_is_validated() {
    let orders = generator(9)
        .with_validator(has_lines)
        .sample_many(&td("Order"), 5)
        .unwrap();
    assert_eq!(orders.len(), 5);
    assert!(orders.iter().all(|order| has_lines(order).is_ok()));
}
