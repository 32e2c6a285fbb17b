//! Lock-free random source for admission coin flips.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::RngCore;

/// Uniform random source producing floats in [0,1).
///
/// The cache draws one value per candidate miss. Implementations must be
/// safe to share across threads; tests inject deterministic sources through
/// this seam.
pub trait Source: Send + Sync {
    /// Returns a uniform random float in [0,1).
    fn float64(&self) -> f64;
}

const PCG_MUL: u64 = 6364136223846793005;

/// Sharded PCG generator.
///
/// Each shard advances an independent LCG state through a CAS loop and
/// permutes the result (RXS-M-XS), so draws never block. Shards are picked
/// round-robin to spread contention across cores.
pub struct Pcg {
    shards: Vec<Shard>,
    mask: u32,
    rr: AtomicU32,
}

struct Shard {
    state: AtomicU64,
    inc: u64,
}

impl Pcg {
    /// Creates a generator seeded from 128 bits of OS entropy, falling back
    /// to a wall-clock seed when the secure source fails.
    pub fn new() -> Self {
        let (s1, s2) = secure_seed();
        Self::with_seed(s1, s2, 0)
    }

    /// Creates a deterministic single-stream generator from an explicit
    /// 128-bit seed.
    pub fn seeded(s1: u64, s2: u64) -> Self {
        Self::with_seed(s1, s2, 1)
    }

    fn with_seed(s1: u64, s2: u64, shards_n: usize) -> Self {
        let n = if shards_n == 0 {
            (num_cpus::get() * 4).max(1)
        } else {
            shards_n
        };

        // Round to power of 2
        let p = n.next_power_of_two();
        let mask = (p - 1) as u32;

        let mut state_seed = splitmix_seed(s1);
        let mut inc_seed = splitmix_seed(s2 ^ 0x9e3779b97f4a7c15);

        let mut shards = Vec::with_capacity(p);
        for _ in 0..p {
            let state = splitmix_next(&mut state_seed);
            // Streams must be odd for a full-period LCG.
            let inc = splitmix_next(&mut inc_seed) | 1;
            shards.push(Shard {
                state: AtomicU64::new(state),
                inc,
            });
        }

        Self {
            shards,
            mask,
            rr: AtomicU32::new(0),
        }
    }
}

impl Default for Pcg {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for Pcg {
    /// Returns a uniform random float in [0,1) using 53 random bits.
    fn float64(&self) -> f64 {
        let i = (self.rr.fetch_add(1, Ordering::Relaxed) & self.mask) as usize;
        let shard = &self.shards[i];
        let x = pcg_next(&shard.state, shard.inc);

        // Take top 53 bits -> [0,1)
        const INV53: f64 = 1.0 / 9007199254740992.0; // 2^53
        (x >> 11) as f64 * INV53
    }
}

/// Advances the LCG state atomically and returns the permuted output.
fn pcg_next(s: &AtomicU64, inc: u64) -> u64 {
    loop {
        let old = s.load(Ordering::Relaxed);
        let new = old.wrapping_mul(PCG_MUL).wrapping_add(inc);
        if s.compare_exchange(old, new, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
        {
            return permute(new);
        }
    }
}

/// RXS-M-XS output permutation over the full 64-bit state.
fn permute(state: u64) -> u64 {
    let word = ((state >> ((state >> 59) + 5)) ^ state).wrapping_mul(12605985483714917081);
    (word >> 43) ^ word
}

/// Advances the state and returns a mixed 64-bit value.
fn splitmix_next(s: &mut u64) -> u64 {
    *s = s.wrapping_add(0x9e3779b97f4a7c15);
    mix(*s)
}

/// Mixes a 64-bit value using the SplitMix64 finalizer.
fn mix(z: u64) -> u64 {
    let mut z = z;
    z ^= z >> 30;
    z = z.wrapping_mul(0xbf58476d1ce4e5b9);
    z ^= z >> 27;
    z = z.wrapping_mul(0x94d049bb133111eb);
    z ^= z >> 31;
    z
}

/// Turns a raw seed word into a decent 64-bit starting state.
fn splitmix_seed(seed: u64) -> u64 {
    let z = mix(seed.wrapping_add(0x9e3779b97f4a7c15));
    if z == 0 {
        0x9e3779b97f4a7c15
    } else {
        z
    }
}

/// Reads a 128-bit seed from the OS entropy source, falling back to the
/// wall clock when it is unavailable.
fn secure_seed() -> (u64, u64) {
    let mut buf = [0u8; 16];
    match rand::rngs::OsRng.try_fill_bytes(&mut buf) {
        Ok(()) => {
            let (a, b) = buf.split_at(8);
            (
                u64::from_le_bytes(a.try_into().unwrap()),
                u64::from_le_bytes(b.try_into().unwrap()),
            )
        }
        Err(_) => {
            let nanos = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0x9e3779b97f4a7c15);
            (nanos, nanos ^ 0x9e3779b97f4a7c15)
        }
    }
}
