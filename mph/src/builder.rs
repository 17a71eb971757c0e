//! Hash-and-displace search for a minimal perfect hash
use std::{cmp::Reverse, collections::HashSet};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{config::MphConfig, error::MphError, hash::Salts};

/// A minimal perfect hash over one fixed key set
///
/// For every key the table was built from, [`PerfectHashSpec::index`] returns a
/// distinct value in `0..n`. Keys outside that set also land in `0..n`, on a slot
/// that belongs to some other key.
///
/// A spec produced by [`MphBuilder::build`] always has `n > 0` and
/// `displacement.len() == n`. Hand-made or deserialized specs that break this make
/// `index` panic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerfectHashSpec {
    /// Number of keys, and of slots
    pub n: usize,

    /// Salts of the first bucket hash
    pub salts_1: Salts,

    /// Salts of the second bucket hash
    pub salts_2: Salts,

    /// One displacement per bucket, each below `n`
    pub displacement: Vec<u32>,
}

impl PerfectHashSpec {
    /// The trivial table for a single key
    pub fn singleton() -> Self {
        Self { n: 1, salts_1: Salts::UNIT, salts_2: Salts::UNIT, displacement: vec![0] }
    }

    /// Slot of `key`
    #[inline(always)]
    pub fn index(&self, key: u32) -> usize {
        let d1 = self.displacement[self.salts_1.bucket(key, self.n)] as usize;
        let d2 = self.displacement[self.salts_2.bucket(key, self.n)] as usize;
        (d1 + d2) % self.n
    }

    /// Whether `keys` map one-to-one onto `0..n`
    pub fn is_bijection(&self, keys: &[u32]) -> bool {
        if keys.len() != self.n {
            return false;
        }
        let mut taken = vec![false; self.n];
        keys.iter().all(|&key| !std::mem::replace(&mut taken[self.index(key)], true))
    }
}

/// Randomized perfect hash builder
///
/// The random source is passed to [`MphBuilder::build`] so that callers can seed it
/// and reproduce a table exactly.
#[derive(Debug, Clone, Default)]
pub struct MphBuilder {
    config: MphConfig,
}

impl MphBuilder {
    pub const fn new(config: MphConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &MphConfig {
        &self.config
    }

    /// Search for a minimal perfect hash over `keys`
    ///
    /// # Arguments
    /// * `keys` - The key set. Must be non-empty and free of duplicates.
    /// * `rng` - Source of salts and displacement start offsets.
    ///
    /// # Returns
    /// * `Ok(PerfectHashSpec)` - A table where `keys[i]` may land on any slot, but
    ///   no two keys share one
    /// * `Err(MphError)` - If the key set is empty, has duplicates, or every attempt
    ///   within the configured budget failed
    pub fn build<R: Rng + ?Sized>(
        &self,
        keys: &[u32],
        rng: &mut R,
    ) -> Result<PerfectHashSpec, MphError> {
        let n = keys.len();
        if n == 0 {
            return Err(MphError::EmptyKeySet);
        }

        // Duplicates can never be separated, so reject them instead of exhausting
        // the whole budget
        let mut seen = HashSet::with_capacity(n);
        if let Some(&duplicate) = keys.iter().find(|&&key| !seen.insert(key)) {
            return Err(MphError::DuplicateKey(duplicate));
        }

        if n == 1 {
            return Ok(PerfectHashSpec::singleton());
        }

        let max_attempts = self.config.max_attempts;
        let mut pairs = Vec::with_capacity(n);
        for attempt in 1..=max_attempts {
            let salts_1 = Salts::random(rng);
            let salts_2 = Salts::random(rng);

            pairs.clear();
            pairs.extend(keys.iter().map(|&key| (salts_1.bucket(key, n), salts_2.bucket(key, n))));

            if let Some(displacement) = assign_displacements(&pairs, rng) {
                if attempt > max_attempts / 4 {
                    warn!(
                        "Perfect hash over {} keys needed {} of {} attempts",
                        n, attempt, max_attempts
                    );
                } else {
                    debug!("Perfect hash over {} keys found after {} attempt(s)", n, attempt);
                }
                return Ok(PerfectHashSpec { n, salts_1, salts_2, displacement });
            }
        }

        Err(MphError::ExhaustedAttempts { keys: n, attempts: max_attempts })
    }
}

/// Give every bucket a displacement so that all keys land on distinct slots
///
/// `pairs[key]` holds the two buckets of a key. A key's slot is fixed as soon as
/// both of its buckets have a displacement, so buckets are visited most crowded
/// first, and each one takes the first of `n` successive displacement values
/// (starting at a random offset) that puts every newly fixed key on a free slot.
///
/// Returns `None` when some bucket has no such value.
fn assign_displacements<R: Rng + ?Sized>(
    pairs: &[(usize, usize)],
    rng: &mut R,
) -> Option<Vec<u32>> {
    let n = pairs.len();

    // Keys passing through each bucket. A key whose two buckets coincide is listed once.
    let mut through: Vec<Vec<usize>> = vec![Vec::new(); n];
    for (key, &(b1, b2)) in pairs.iter().enumerate() {
        through[b1].push(key);
        if b2 != b1 {
            through[b2].push(key);
        }
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&bucket| Reverse(through[bucket].len()));

    let mut displacement = vec![0u32; n];
    let mut assigned = vec![false; n];
    let mut taken = vec![false; n];

    let mut settling = Vec::new();
    let mut slots = Vec::new();

    for &bucket in &order {
        settling.clear();
        settling.extend(through[bucket].iter().copied().filter(|&key| {
            let (b1, b2) = pairs[key];
            let other = if b1 == bucket { b2 } else { b1 };
            other == bucket || assigned[other]
        }));

        let start = rng.random_range(0..n);
        let mut found = false;
        'trial: for offset in 0..n {
            let candidate = (start + offset) % n;
            let displacement_of =
                |b: usize| if b == bucket { candidate } else { displacement[b] as usize };

            slots.clear();
            for &key in &settling {
                let (b1, b2) = pairs[key];
                let slot = (displacement_of(b1) + displacement_of(b2)) % n;
                if taken[slot] || slots.contains(&slot) {
                    continue 'trial;
                }
                slots.push(slot);
            }

            displacement[bucket] = candidate as u32;
            found = true;
            break;
        }

        if !found {
            return None;
        }
        assigned[bucket] = true;
        for &slot in &slots {
            taken[slot] = true;
        }
    }

    Some(displacement)
}
