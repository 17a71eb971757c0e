//! Decode table construction
use std::fmt;

use hashdec_mph::{MphBuilder, PerfectHashSpec};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    config::BuildConfig,
    error::BuildError,
    partition::{partition, MaskGroup},
    resolve::resolve_duplicates,
    rule::Rule,
};

/// One mask group with its perfect hash
///
/// Rules are stored in slot order: `rules()[i]` is the rule whose match bits hash
/// to slot `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableGroup {
    group: MaskGroup,
    hash: PerfectHashSpec,
}

impl TableGroup {
    pub const fn mask(&self) -> u32 {
        self.group.mask
    }

    pub fn rules(&self) -> &[Rule] {
        &self.group.rules
    }

    pub const fn hash(&self) -> &PerfectHashSpec {
        &self.hash
    }

    pub fn len(&self) -> usize {
        self.group.len()
    }

    pub fn is_empty(&self) -> bool {
        self.group.is_empty()
    }
}

/// The immutable product of construction
///
/// Groups are ordered by non-increasing size. Rebuilding means building a new
/// table; nothing here is mutated after [`TableBuilder::build`] returns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeTable {
    groups: Vec<TableGroup>,
}

impl DecodeTable {
    pub fn groups(&self) -> &[TableGroup] {
        &self.groups
    }

    /// Masks in probe order
    pub fn masks(&self) -> Vec<u32> {
        self.groups.iter().map(TableGroup::mask).collect()
    }

    /// Group sizes in probe order
    pub fn group_sizes(&self) -> Vec<usize> {
        self.groups.iter().map(TableGroup::len).collect()
    }

    /// `(mask, rule count)` per group, in probe order
    pub fn mask_info(&self) -> Vec<(u32, usize)> {
        self.groups.iter().map(|group| (group.mask(), group.len())).collect()
    }

    /// All rules, group by group in slot order
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.groups.iter().flat_map(|group| group.rules().iter())
    }

    /// Total number of rules
    pub fn len(&self) -> usize {
        self.groups.iter().map(TableGroup::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Key lists for an external test harness
    ///
    /// For each group, `keys[i]` is the match bits of the rule stored at slot `i`.
    /// Re-deriving every key's slot through `hash` must give back its position.
    pub fn self_check(&self) -> Vec<GroupSelfCheck> {
        self.groups
            .iter()
            .map(|group| GroupSelfCheck {
                mask: group.mask(),
                keys: group.group.keys(),
                hash: group.hash.clone(),
            })
            .collect()
    }

    /// Run [`GroupSelfCheck::check`] over every group
    ///
    /// Useful after loading a serialized table, before decoding with it.
    pub fn verify(&self) -> Result<(), SelfCheckFailure> {
        self.self_check().iter().try_for_each(GroupSelfCheck::check)
    }
}

impl fmt::Display for DecodeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Masks info (mask, elements):")?;
        for (mask, elements) in self.mask_info() {
            writeln!(f, "({mask:#010x}, {elements})")?;
        }
        Ok(())
    }
}

/// Literal key list of one group, with the hash that must place each key on its
/// own position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSelfCheck {
    pub mask: u32,
    pub keys: Vec<u32>,
    pub hash: PerfectHashSpec,
}

impl GroupSelfCheck {
    /// `(position, slot)` for every key that hashes somewhere other than its position
    ///
    /// The hash must be well formed, see [`GroupSelfCheck::check`].
    pub fn mismatches(&self) -> Vec<(usize, usize)> {
        self.keys
            .iter()
            .enumerate()
            .filter_map(|(position, &key)| {
                let slot = self.hash.index(key);
                (slot != position).then_some((position, slot))
            })
            .collect()
    }

    /// Check the shape of the hash, then every key's slot
    pub fn check(&self) -> Result<(), SelfCheckFailure> {
        let fail = |reason: String| Err(SelfCheckFailure { mask: self.mask, reason });
        let n = self.hash.n;
        if n == 0 || n != self.keys.len() {
            return fail(format!("table size {n} for {} key(s)", self.keys.len()));
        }
        if self.hash.displacement.len() != n {
            return fail(format!("{} displacement(s) for {n} bucket(s)", self.hash.displacement.len()));
        }
        if let Some(&(position, slot)) = self.mismatches().first() {
            return fail(format!(
                "key {:#010x} at position {position} hashes to slot {slot}",
                self.keys[position]
            ));
        }
        Ok(())
    }
}

/// A group whose perfect hash does not reproduce its key order
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Self-check failed for mask {mask:#010x}: {reason}")]
pub struct SelfCheckFailure {
    pub mask: u32,
    pub reason: String,
}

/// Builds a [`DecodeTable`] from a rule set
///
/// Duplicate match bits are merged, rules are grouped by mask, and each group gets
/// its own perfect hash. Groups are independent, so their searches run on the
/// rayon pool unless [`BuildConfig::parallel`] is off. Either way, every group draws
/// from its own generator seeded by the master seed and the group's position, so
/// the result does not depend on scheduling.
#[derive(Debug, Clone, Default)]
pub struct TableBuilder {
    config: BuildConfig,
}

impl TableBuilder {
    pub const fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build the table for `rules`
    ///
    /// # Returns
    /// * `Ok(DecodeTable)` - Every rule of the resolved rule set, hashed
    /// * `Err(BuildError)` - On conflicting duplicates or when a group exhausts its
    ///   attempt budget. No table is produced in either case.
    pub fn build(&self, rules: Vec<Rule>) -> Result<DecodeTable, BuildError> {
        let groups = partition(resolve_duplicates(rules)?);

        let seed = self.config.seed.unwrap_or_else(|| rand::rng().random());
        debug!("Hashing {} mask group(s) with master seed {:#018x}", groups.len(), seed);

        let mph = MphBuilder::new(self.config.mph);
        let hash_one =
            |(position, group): (usize, MaskGroup)| hash_group(&mph, group, group_seed(seed, position));

        let groups = if self.config.parallel {
            groups.into_par_iter().enumerate().map(hash_one).collect::<Result<Vec<_>, _>>()?
        } else {
            groups.into_iter().enumerate().map(hash_one).collect::<Result<Vec<_>, _>>()?
        };

        let table = DecodeTable { groups };
        info!("Decode table ready: {} rule(s) in {} mask group(s)", table.len(), table.groups.len());
        Ok(table)
    }
}

/// Seed of the generator for the group at `position`
fn group_seed(seed: u64, position: usize) -> u64 {
    const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;
    seed ^ (position as u64 + 1).wrapping_mul(GOLDEN_GAMMA)
}

fn hash_group(mph: &MphBuilder, mut group: MaskGroup, seed: u64) -> Result<TableGroup, BuildError> {
    let keys = group.keys();
    let mut rng = StdRng::seed_from_u64(seed);
    let hash = mph.build(&keys, &mut rng).map_err(|source| {
        BuildError::PerfectHashConstructionFailed { mask: group.mask, keys: keys.len(), source }
    })?;

    // The hash is a bijection onto 0..n, so sorting by slot puts each rule on its slot
    group.rules.sort_by_cached_key(|rule| hash.index(rule.match_bits()));
    Ok(TableGroup { group, hash })
}
