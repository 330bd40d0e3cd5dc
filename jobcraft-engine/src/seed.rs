//! Reproducible RNG streams for special-order generation.
//!
//! A server seed plus the request's identity (player, job, request time) is
//! mixed with HMAC-SHA256 so replaying a request rolls the same order, while
//! a later request by the same player gets an independent stream.
use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;

const ORDER_DOMAIN: &[u8] = b"jobcraft.special-order";

/// Identity of a special-order request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSeedInput<'a> {
    pub player: &'a str,
    pub job_id: &'a str,
    /// Request time in epoch milliseconds.
    pub requested_at_ms: i64,
}

impl<'a> OrderSeedInput<'a> {
    #[must_use]
    pub const fn at(player: &'a str, job_id: &'a str, now_ms: i64) -> Self {
        Self {
            player,
            job_id,
            requested_at_ms: now_ms,
        }
    }
}

/// Derive a 64-bit stream seed for one request.
#[must_use]
pub fn derive_order_seed(server_seed: u64, input: &OrderSeedInput<'_>) -> u64 {
    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(&server_seed.to_le_bytes())
        .expect("64-bit seed is valid key");
    mac.update(ORDER_DOMAIN);
    mac.update(&[0]);
    mac.update(input.player.as_bytes());
    mac.update(&[0]);
    mac.update(input.job_id.to_lowercase().as_bytes());
    mac.update(&[0]);
    mac.update(&input.requested_at_ms.to_le_bytes());
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}

/// RNG for one request.
#[must_use]
pub fn order_rng(server_seed: u64, input: &OrderSeedInput<'_>) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(derive_order_seed(server_seed, input))
}
