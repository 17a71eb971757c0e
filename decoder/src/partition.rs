//! Grouping of resolved rules by mask
use std::cmp::Reverse;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::rule::Rule;

/// Rules sharing one mask; the domain of one perfect hash
///
/// Match bits are pairwise distinct within a group once duplicates are resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskGroup {
    pub mask: u32,
    pub rules: Vec<Rule>,
}

impl MaskGroup {
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Match bits of every rule, in rule order
    pub fn keys(&self) -> Vec<u32> {
        self.rules.iter().map(Rule::match_bits).collect()
    }
}

/// Group rules by mask, most populated group first
///
/// Groups of equal size keep the order in which their mask first appeared, so the
/// same input always gives the same partition. Bigger groups are probed first on
/// the assumption that instruction frequency roughly follows group size.
pub fn partition(rules: Vec<Rule>) -> Vec<MaskGroup> {
    let mut by_mask: IndexMap<u32, Vec<Rule>> = IndexMap::new();
    for rule in rules {
        by_mask.entry(rule.mask()).or_default().push(rule);
    }

    let mut groups: Vec<MaskGroup> =
        by_mask.into_iter().map(|(mask, rules)| MaskGroup { mask, rules }).collect();
    // Stable, so ties stay in first-seen order
    groups.sort_by_key(|group| Reverse(group.len()));

    for group in &groups {
        debug!("Mask {:#010x}: {} rule(s)", group.mask, group.len());
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str, mask: u32, match_bits: u32) -> Rule {
        Rule::new(name, mask, match_bits, "h").unwrap()
    }

    #[test]
    fn test_partition_orders_by_population() {
        let groups = partition(vec![
            rule("ADDI", 0x0000_707f, 0x0000_0013),
            rule("ADD", 0xfe00_707f, 0x0000_0033),
            rule("SUB", 0xfe00_707f, 0x4000_0033),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].mask, 0xfe00_707f);
        assert_eq!(groups[0].keys(), vec![0x33, 0x4000_0033]);
        assert_eq!(groups[1].mask, 0x0000_707f);
        assert_eq!(groups[1].len(), 1);
    }

    #[test]
    fn test_partition_ties_keep_first_seen_order() {
        let groups = partition(vec![
            rule("LUI", 0x7f, 0x37),
            rule("ECALL", 0xffff_ffff, 0x73),
            rule("AUIPC", 0x7f, 0x17),
            rule("EBREAK", 0xffff_ffff, 0x0010_0073),
            rule("FENCE_I", 0x707f, 0x100f),
        ]);
        let masks: Vec<u32> = groups.iter().map(|group| group.mask).collect();
        assert_eq!(masks, vec![0x7f, 0xffff_ffff, 0x707f]);
    }

    #[test]
    fn test_partition_empty() {
        assert!(partition(Vec::new()).is_empty());
    }
}
