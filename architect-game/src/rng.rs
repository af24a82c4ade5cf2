//! Deterministic random streams derived from a user-visible seed.

use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;

const EVENTS_DOMAIN: &[u8] = b"events";

/// Domain-separated RNG streams owned by a single session.
///
/// Every turn draws from its own stream keyed by the number of turns already
/// accepted, so a session restored from a snapshot continues exactly as the
/// original would have without persisting generator internals.
#[derive(Debug, Clone)]
pub struct RngBundle {
    seed: u64,
    events: CountingRng<ChaCha20Rng>,
    retired_draws: u64,
}

impl RngBundle {
    /// Construct the bundle from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            seed,
            events: CountingRng::new(derive_stream_seed(seed, &turn_tag(0))),
            retired_draws: 0,
        }
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Event stream for the turn following `turns_completed` accepted turns.
    pub fn events_for_turn(&mut self, turns_completed: usize) -> &mut CountingRng<ChaCha20Rng> {
        self.retired_draws = self.retired_draws.saturating_add(self.events.draws());
        self.events = CountingRng::new(derive_stream_seed(self.seed, &turn_tag(turns_completed)));
        &mut self.events
    }

    /// Total draws across every stream handed out so far.
    #[must_use]
    pub const fn total_draws(&self) -> u64 {
        self.retired_draws.saturating_add(self.events.draws())
    }
}

fn turn_tag(turns_completed: usize) -> Vec<u8> {
    let mut tag = EVENTS_DOMAIN.to_vec();
    tag.extend_from_slice(&u64::try_from(turns_completed).unwrap_or(u64::MAX).to_le_bytes());
    tag
}

/// Counting wrapper for RNG streams providing instrumentation.
#[derive(Debug, Clone)]
pub struct CountingRng<R> {
    rng: R,
    draws: u64,
}

impl CountingRng<ChaCha20Rng> {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            draws: 0,
        }
    }
}

impl<R: rand::RngCore> CountingRng<R> {
    /// Number of draw calls performed against this stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl<R: rand::RngCore> rand::RngCore for CountingRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.draws = self.draws.saturating_add(1);
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.draws = self.draws.saturating_add(1);
        self.rng.try_fill_bytes(dest)
    }
}

pub(crate) fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    // HMAC accepts keys of any length, so this branch is unreachable in practice.
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}
