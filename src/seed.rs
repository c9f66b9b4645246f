//! Seed derivation using BLAKE3
//!
//! Every seeded decision draws from its own `ChaCha8Rng`, seeded by
//!
//! seed = hash("fixtree" || root_seed || attempt || path || decision)[..8]
//!
//! so a decision depends only on the session seed, the attempt index and the
//! structural position. There is no shared RNG state to mutate.

use crate::node::{NodePath, PathSegment};
use blake3::Hasher;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Kind of decision a derived seed feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Whether a nullable position is null.
    Null,
    /// Container length.
    Size,
    /// Concrete subtype chosen for an abstract position.
    Subtype,
    /// Terminal value.
    Leaf,
}

impl Decision {
    fn tag(&self) -> &'static [u8] {
        match self {
            Decision::Null => b"null",
            Decision::Size => b"size",
            Decision::Subtype => b"subtype",
            Decision::Leaf => b"leaf",
        }
    }
}

/// Derive the seed for one decision at one position of one attempt.
pub fn derive_seed(root_seed: u64, attempt: u32, path: &NodePath, decision: Decision) -> u64 {
    let mut hasher = Hasher::new();

    hasher.update(b"fixtree");
    hasher.update(&root_seed.to_be_bytes());
    hasher.update(&attempt.to_be_bytes());

    // Segment count, then each segment with a discriminator and length prefix
    hasher.update(&(path.len() as u64).to_be_bytes());
    for segment in path.segments() {
        match segment {
            PathSegment::Field(name) => {
                hasher.update(b"f");
                hasher.update(&(name.len() as u64).to_be_bytes());
                hasher.update(name.as_bytes());
            }
            PathSegment::Index(index) => {
                hasher.update(b"i");
                hasher.update(&(*index as u64).to_be_bytes());
            }
        }
    }

    hasher.update(b"decision:");
    hasher.update(decision.tag());

    let digest = hasher.finalize();
    let mut seed = [0u8; 8];
    seed.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_be_bytes(seed)
}

/// RNG for one decision.
pub fn rng_for(root_seed: u64, attempt: u32, path: &NodePath, decision: Decision) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_seed(root_seed, attempt, path, decision))
}

/// Fresh session seed when the caller did not pin one.
pub fn entropy_seed() -> u64 {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let mut hasher = Hasher::new();
    hasher.update(&nanos.to_be_bytes());
    hasher.update(&std::process::id().to_be_bytes());
    let digest = hasher.finalize();
    let mut seed = [0u8; 8];
    seed.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_be_bytes(seed)
}
