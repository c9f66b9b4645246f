//! Leaf values and container sizes
//!
//! The engine decides *where* values go; these collaborators decide *what* the
//! terminal values are and how long containers get. Both receive everything
//! they need as arguments (a seeded RNG, a derived seed) and must not keep
//! hidden random state, or determinism is lost.

use crate::catalog::LeafKind;
use crate::error::GenerationError;
use crate::node::NodePath;
use crate::sequence::{OneShotSequence, SequenceMaterializer};
use crate::types::TypeDescriptor;
use crate::value::Value;
use chrono::{DateTime, Days, NaiveDate, SecondsFormat};
use rand::distributions::Alphanumeric;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

pub const DEFAULT_MAX_STRING_LEN: usize = 12;
pub const DEFAULT_MIN_CONTAINER_SIZE: usize = 0;
pub const DEFAULT_MAX_CONTAINER_SIZE: usize = 3;

// 2100-01-01 is 47482 days after the epoch
const MAX_DAYS_SINCE_EPOCH: u64 = 47_482;

/// Produces terminal values.
pub trait LeafValueProducer: Send + Sync {
    fn produce(
        &self,
        ty: &TypeDescriptor,
        kind: LeafKind,
        path: &NodePath,
        rng: &mut ChaCha8Rng,
    ) -> Result<Value, GenerationError>;
}

/// Decides container lengths. Must be a pure function of its arguments.
pub trait ContainerSizeResolver: Send + Sync {
    fn resolve_size(&self, ty: &TypeDescriptor, seed: u64) -> usize;
}

impl<F> ContainerSizeResolver for F
where
    F: Fn(&TypeDescriptor, u64) -> usize + Send + Sync,
{
    fn resolve_size(&self, ty: &TypeDescriptor, seed: u64) -> usize {
        self(ty, seed)
    }
}

/// Uniform size in `min..=max`.
#[derive(Debug, Clone, Copy)]
pub struct RangeSizeResolver {
    pub min: usize,
    pub max: usize,
}

impl RangeSizeResolver {
    /// Bounds are swapped if given in the wrong order.
    pub fn new(min: usize, max: usize) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }
}

impl Default for RangeSizeResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CONTAINER_SIZE, DEFAULT_MAX_CONTAINER_SIZE)
    }
}

impl ContainerSizeResolver for RangeSizeResolver {
    fn resolve_size(&self, _ty: &TypeDescriptor, seed: u64) -> usize {
        ChaCha8Rng::seed_from_u64(seed).gen_range(self.min..=self.max)
    }
}

/// Every container gets the same length.
#[derive(Debug, Clone, Copy)]
pub struct FixedSizeResolver(pub usize);

impl ContainerSizeResolver for FixedSizeResolver {
    fn resolve_size(&self, _ty: &TypeDescriptor, _seed: u64) -> usize {
        self.0
    }
}

/// Default producer: every value drawn from the supplied RNG.
#[derive(Debug, Clone, Copy)]
pub struct SeededLeafProducer {
    pub max_string_len: usize,
}

impl Default for SeededLeafProducer {
    fn default() -> Self {
        Self {
            max_string_len: DEFAULT_MAX_STRING_LEN,
        }
    }
}

impl SeededLeafProducer {
    pub fn new(max_string_len: usize) -> Self {
        Self { max_string_len }
    }

    fn string(&self, rng: &mut ChaCha8Rng) -> String {
        let len = rng.gen_range(0..=self.max_string_len);
        rng.sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect()
    }
}

impl LeafValueProducer for SeededLeafProducer {
    fn produce(
        &self,
        _ty: &TypeDescriptor,
        kind: LeafKind,
        _path: &NodePath,
        rng: &mut ChaCha8Rng,
    ) -> Result<Value, GenerationError> {
        let value = match kind {
            LeafKind::Unit => Value::Unit,
            LeafKind::Bool => Value::Bool(rng.gen()),
            LeafKind::I8 => Value::Int(rng.gen::<i8>().into()),
            LeafKind::I16 => Value::Int(rng.gen::<i16>().into()),
            LeafKind::I32 => Value::Int(rng.gen::<i32>().into()),
            LeafKind::I64 => Value::Int(rng.gen()),
            LeafKind::U8 => Value::UInt(rng.gen::<u8>().into()),
            LeafKind::U16 => Value::UInt(rng.gen::<u16>().into()),
            LeafKind::U32 => Value::UInt(rng.gen::<u32>().into()),
            LeafKind::U64 => Value::UInt(rng.gen()),
            LeafKind::F32 => Value::Float(rng.gen::<f32>().into()),
            LeafKind::F64 => Value::Float(rng.gen()),
            LeafKind::Char => Value::Char(char::from(rng.sample(Alphanumeric))),
            LeafKind::String => Value::Str(self.string(rng)),
            LeafKind::Uuid => Value::Str(uuid_v4(rng)),
            LeafKind::Date => {
                let days = Days::new(rng.gen_range(0..MAX_DAYS_SINCE_EPOCH));
                let date = NaiveDate::default()
                    .checked_add_days(days)
                    .unwrap_or_default();
                Value::Str(date.format("%Y-%m-%d").to_string())
            }
            LeafKind::DateTime => {
                let secs = rng.gen_range(0..MAX_DAYS_SINCE_EPOCH as i64 * 86_400);
                let at = DateTime::from_timestamp(secs, 0).unwrap_or_default();
                Value::Str(at.to_rfc3339_opts(SecondsFormat::Secs, true))
            }
        };
        Ok(value)
    }
}

fn uuid_v4(rng: &mut ChaCha8Rng) -> String {
    let mut bytes: [u8; 16] = rng.gen();
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    let hex = hex::encode(bytes);
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

/// Draws leaves of selected types from caller-supplied pools.
///
/// A pool is a one-shot sequence (an iterator that can only be consumed once).
/// It is materialized on first use and then indexed with the seeded RNG, so
/// every branch and every later attempt can reuse it. Types without a pool
/// fall through to the wrapped producer.
pub struct PooledLeafProducer<P = SeededLeafProducer> {
    pools: HashMap<TypeDescriptor, Arc<OneShotSequence<Value>>>,
    materializer: SequenceMaterializer<Value>,
    fallback: P,
}

impl<P: LeafValueProducer> PooledLeafProducer<P> {
    pub fn new(fallback: P, cache_capacity: usize) -> Self {
        Self {
            pools: HashMap::new(),
            materializer: SequenceMaterializer::new(cache_capacity),
            fallback,
        }
    }

    /// Serve leaves of `ty` from `values`.
    pub fn with_pool<I>(mut self, ty: TypeDescriptor, values: I) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: Send + 'static,
    {
        self.pools.insert(ty, Arc::new(OneShotSequence::new(values)));
        self
    }

    /// Number of pools materialized so far.
    pub fn materialized(&self) -> usize {
        self.materializer.cached()
    }
}

impl<P: LeafValueProducer> LeafValueProducer for PooledLeafProducer<P> {
    fn produce(
        &self,
        ty: &TypeDescriptor,
        kind: LeafKind,
        path: &NodePath,
        rng: &mut ChaCha8Rng,
    ) -> Result<Value, GenerationError> {
        let Some(pool) = self.pools.get(ty) else {
            return self.fallback.produce(ty, kind, path, rng);
        };
        let values = self.materializer.materialize(pool)?;
        if values.is_empty() {
            trace!(path = %path, ty = %ty, "Empty pool, using fallback");
            return self.fallback.produce(ty, kind, path, rng);
        }
        Ok(values[rng.gen_range(0..values.len())].clone())
    }
}
