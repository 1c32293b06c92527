//! Deterministic seeding for playthroughs and batches.
//!
//! A batch carries one user-visible seed. Every playthrough gets its own
//! stream derived from that seed with HMAC-SHA256 under a domain tag naming
//! the strategy and playthrough index, so results do not depend on the order
//! in which playthroughs run.
use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;

use crate::constants::{SEED_TAG_PLAYTHROUGH, SEED_TAG_STRATEGY};

/// Derive an independent 64-bit seed from `seed` and a domain tag.
#[must_use]
pub fn derive_stream_seed(seed: u64, domain_tag: &[u8]) -> u64 {
    // HMAC accepts keys of any length.
    let mut mac =
        Hmac::<Sha256>::new_from_slice(&seed.to_le_bytes()).expect("64-bit seed is valid key");
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0_u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}

/// Domain tag for one playthrough of one strategy.
#[must_use]
pub fn playthrough_tag(strategy_id: &str, index: usize) -> String {
    format!("{SEED_TAG_STRATEGY}:{strategy_id}:{SEED_TAG_PLAYTHROUGH}:{index}")
}

/// Seed for playthrough `index` of `strategy_id` within a batch.
#[must_use]
pub fn playthrough_seed(batch_seed: u64, strategy_id: &str, index: usize) -> u64 {
    derive_stream_seed(batch_seed, playthrough_tag(strategy_id, index).as_bytes())
}

/// Production generator for a seed.
#[must_use]
pub fn rng_from_seed(seed: u64) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(seed)
}

/// Fresh seed from operating-system entropy, for runs without `--seed`.
#[must_use]
pub fn entropy_seed() -> u64 {
    rand::random::<u64>()
}
