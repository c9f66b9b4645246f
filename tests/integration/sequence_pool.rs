//! Integration tests for one-shot sequences and pooled leaves

use super::test_utils::{catalog, td};
use fixtree::error::GenerationError;
use fixtree::generation::FixtureGenerator;
use fixtree::leaf::{PooledLeafProducer, SeededLeafProducer};
use fixtree::node::NodeContext;
use fixtree::sequence::{OneShotSequence, SequenceMaterializer};
use fixtree::value::Value;

const SKUS: [&str; 3] = ["SKU-1", "SKU-2", "SKU-3"];

fn pooled_generator(seed: u64) -> FixtureGenerator {
    let skus = SKUS.iter().map(|s| Value::Str(s.to_string())).collect::<Vec<_>>();
    let leaves = PooledLeafProducer::new(SeededLeafProducer::default(), 8).with_pool(td("string"), skus);
    FixtureGenerator::new(
        NodeContext::builder(catalog())
            .seed(seed)
            .leaf_producer(leaves)
            .build(),
    )
}

/// Test that a drained pool keeps serving values across branches and attempts
#[test]
fn test_pool_serves_every_branch() {
    let g = pooled_generator(12);
    for attempt in 0..4 {
        let page = g.sample_attempt(&td("List<Line>"), attempt).unwrap();
        for line in page.as_list().unwrap() {
            let sku = line.field("sku").and_then(Value::as_str).unwrap();
            assert!(SKUS.contains(&sku), "unexpected sku {}", sku);
        }
    }
}

/// Test that pooled generation stays reproducible
#[test]
fn test_pool_is_reproducible() {
    let a = pooled_generator(30).sample(&td("List<Line>")).unwrap();
    let b = pooled_generator(30).sample(&td("List<Line>")).unwrap();
    assert_eq!(a, b);
}

/// Test that a sequence evicted after draining is reported as exhausted
#[test]
fn test_evicted_sequence_is_exhausted() {
    let materializer = SequenceMaterializer::new(1);
    let first = OneShotSequence::new(vec![1, 2, 3]);
    let second = OneShotSequence::new(vec![4]);

    assert_eq!(&*materializer.materialize(&first).unwrap(), &[1, 2, 3]);
    assert_eq!(&*materializer.materialize(&first).unwrap(), &[1, 2, 3]);
    materializer.materialize(&second).unwrap();

    assert!(first.is_drained());
    let err = materializer.materialize(&first).unwrap_err();
    assert!(matches!(err, GenerationError::SequenceExhausted(id) if id == first.handle().id()));
}
