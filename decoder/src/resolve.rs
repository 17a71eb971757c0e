//! Merging of rules that share match bits
//!
//! A decode table needs every key to be distinct, so rules whose match bits
//! collide must become one rule. That is only sound when they dispatch to the same
//! handler; the merged rule keeps the match bits and the bitwise AND of all masks,
//! i.e. the loosest mask that still accepts every original encoding.
//!
//! Precondition on rule authors: a handler shared by colliding rules must tell the
//! original encodings apart itself. The merged rule accepts words that none of the
//! originals would have, and nothing here checks that the handler rejects them.
use indexmap::{map::Entry, IndexMap};
use tracing::info;

use crate::{error::BuildError, rule::Rule};

/// Collapse rules with equal match bits into one rule each
///
/// # Arguments
/// * `rules` - Rules in input order.
///
/// # Returns
/// * `Ok(Vec<Rule>)` - One rule per distinct match bits value, in order of first
///   appearance. A merged rule keeps the name, handler and opcode of the first rule
///   of its collision set.
/// * `Err(BuildError::ConflictingDuplicateKey)` - If two colliding rules name
///   different handlers
pub fn resolve_duplicates(rules: Vec<Rule>) -> Result<Vec<Rule>, BuildError> {
    // First rule per key, plus the names folded into it
    let mut by_key: IndexMap<u32, (Rule, Vec<String>)> = IndexMap::with_capacity(rules.len());
    for rule in rules {
        match by_key.entry(rule.match_bits()) {
            Entry::Vacant(entry) => {
                entry.insert((rule, Vec::new()));
            }
            Entry::Occupied(mut entry) => {
                let (first, folded) = entry.get_mut();
                if rule.handler() != first.handler() {
                    return Err(BuildError::ConflictingDuplicateKey {
                        match_bits: first.match_bits(),
                        first: first.name().to_string(),
                        second: rule.name().to_string(),
                    });
                }
                first.set_mask(first.mask() & rule.mask());
                folded.push(rule.name().to_string());
            }
        }
    }

    Ok(by_key
        .into_values()
        .map(|(merged, folded)| {
            if !folded.is_empty() {
                info!(
                    "Merged rules {} into {} on match bits {:#010x}, mask {:#010x}",
                    folded.join(", "),
                    merged.name(),
                    merged.match_bits(),
                    merged.mask()
                );
            }
            merged
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str, mask: u32, match_bits: u32, handler: &str) -> Rule {
        Rule::new(name, mask, match_bits, handler).unwrap()
    }

    #[test]
    fn test_unique_rules_pass_through() {
        let rules = vec![
            rule("ADD", 0xfe00_707f, 0x0000_0033, "h_add"),
            rule("SUB", 0xfe00_707f, 0x4000_0033, "h_sub"),
        ];
        assert_eq!(resolve_duplicates(rules.clone()).unwrap(), rules);
    }

    #[test]
    fn test_duplicates_merge_to_common_mask() {
        let rules = vec![
            rule("WIDE", 0xff00, 0x1000, "h_shared"),
            rule("OTHER", 0x00ff, 0x0001, "h_other"),
            rule("NARROW", 0xf000, 0x1000, "h_shared"),
        ];
        let resolved = resolve_duplicates(rules).unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].name(), "WIDE");
        assert_eq!(resolved[0].mask(), 0xf000);
        assert_eq!(resolved[0].match_bits(), 0x1000);
        assert_eq!(resolved[1].name(), "OTHER");
    }

    #[test]
    fn test_duplicates_with_different_handlers_conflict() {
        let rules = vec![
            rule("FIRST", 0xff00, 0x1000, "h_first"),
            rule("SECOND", 0xf000, 0x1000, "h_second"),
        ];
        assert_eq!(
            resolve_duplicates(rules),
            Err(BuildError::ConflictingDuplicateKey {
                match_bits: 0x1000,
                first: "FIRST".to_string(),
                second: "SECOND".to_string(),
            })
        );
    }

    #[test]
    fn test_three_way_merge() {
        let rules = vec![
            rule("A", 0xfff0, 0x0010, "h"),
            rule("B", 0xff0f, 0x0000_0000, "h"),
            rule("C", 0x0ff0, 0x0010, "h"),
            rule("D", 0x00f0, 0x0010, "h"),
        ];
        let resolved = resolve_duplicates(rules).unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].mask(), 0x00f0);
        assert_eq!(resolved[1].name(), "B");
        assert_eq!(resolved[1].mask(), 0xff0f);
    }

    #[test]
    fn test_empty_input() {
        assert!(resolve_duplicates(Vec::new()).unwrap().is_empty());
    }
}
