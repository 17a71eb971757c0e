//! Keyed byte-weighted hash family
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Largest prime below 2^16.
///
/// Weighted sums are reduced by this prime before the caller reduces by the table
/// size, so two keys only share a bucket when their weighted byte differences
/// cancel modulo the prime, not merely modulo `n`.
pub const HASH_PRIME: u32 = 65_521;

/// Number of salts, one per key byte
pub const SALT_COUNT: usize = 4;

/// Salts of one member of the hash family
///
/// All salts lie in `[1, HASH_PRIME)`, which keeps every intermediate value of
/// [`Salts::hash`] within `u32`: `4 * 255 * 65_520 < 2^32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Salts(pub [u32; SALT_COUNT]);

impl Salts {
    /// Salts that are valid for any table with a single slot
    pub const UNIT: Salts = Salts([1; SALT_COUNT]);

    /// Draw a fresh set of salts uniformly from `[1, HASH_PRIME)`
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(std::array::from_fn(|_| rng.random_range(1..HASH_PRIME)))
    }

    /// `Σ salts[i] * byte_i(key) mod HASH_PRIME`, with byte 0 the least significant
    #[inline(always)]
    pub const fn hash(&self, key: u32) -> u32 {
        let s = &self.0;
        let sum = s[0] * (key & 0xff)
            + s[1] * ((key >> 8) & 0xff)
            + s[2] * ((key >> 16) & 0xff)
            + s[3] * (key >> 24);
        sum % HASH_PRIME
    }

    /// Bucket of `key` in a table with `n` slots
    #[inline(always)]
    pub const fn bucket(&self, key: u32, n: usize) -> usize {
        self.hash(key) as usize % n
    }
}
