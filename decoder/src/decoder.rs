//! Runtime classification of instruction words
//!
//! For each group, in table order, the word is masked with the group's mask and
//! hashed to a slot. The perfect hash only keeps the group's own keys apart: any
//! other word also lands on some slot. So the rule found there is checked against
//! the full word before it is accepted, and on a miss the next group is tried.
//!
//! Decoding reads the table only. It never allocates, never blocks, and may run
//! from any number of threads at once.
use crate::{
    rule::{HandlerRef, Rule},
    table::{DecodeTable, TableGroup},
};

impl TableGroup {
    /// Slot of the rule in this group that `word` encodes, if any
    #[inline(always)]
    pub fn slot_of(&self, word: u32) -> Option<usize> {
        let slot = self.hash().index(word & self.mask());
        match self.rules().get(slot) {
            Some(rule) if rule.matches(word) => Some(slot),
            _ => None,
        }
    }

    /// The rule in this group that `word` encodes, if any
    #[inline(always)]
    pub fn lookup(&self, word: u32) -> Option<&Rule> {
        self.slot_of(word).map(|slot| &self.rules()[slot])
    }
}

impl DecodeTable {
    /// Find the rule `word` encodes
    ///
    /// `None` means the word is not an instruction of this rule set. That is an
    /// ordinary outcome, not a fault.
    pub fn decode(&self, word: u32) -> Option<&Rule> {
        self.groups().iter().find_map(|group| group.lookup(word))
    }

    /// Handler of the rule `word` encodes
    pub fn decode_handler(&self, word: u32) -> Option<&HandlerRef> {
        self.decode(word).map(Rule::handler)
    }
}

/// First rule in `rules` that `word` encodes
///
/// Reference scan that probes every rule in order; the hash decoder must agree
/// with it whenever no word encodes two rules.
pub fn linear_decode(rules: &[Rule], word: u32) -> Option<&Rule> {
    rules.iter().find(|rule| rule.matches(word))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::BuildConfig, table::TableBuilder};

    fn table() -> DecodeTable {
        let rules = vec![
            Rule::new("ADD", 0xfe00_707f, 0x0000_0033, "h_add").unwrap(),
            Rule::new("SUB", 0xfe00_707f, 0x4000_0033, "h_sub").unwrap(),
            Rule::new("ADDI", 0x0000_707f, 0x0000_0013, "h_addi").unwrap(),
        ];
        TableBuilder::new(BuildConfig::new().with_seed(17)).build(rules).unwrap()
    }

    #[test]
    fn test_decode_operands_do_not_matter() {
        let table = table();
        // add x1, x2, x3
        assert_eq!(table.decode(0x0031_00b3).unwrap().name(), "ADD");
        // sub x5, x6, x7
        assert_eq!(table.decode(0x4073_02b3).unwrap().name(), "SUB");
        // addi x1, x0, -1
        assert_eq!(table.decode(0xfff0_0093).unwrap().name(), "ADDI");
    }

    #[test]
    fn test_decode_rejects_unknown_words() {
        let table = table();
        assert_eq!(table.decode(0xffff_ffff), None);
        // funct7 = 0b0000001 (MUL) is not in the table
        assert_eq!(table.decode(0x0200_0033), None);
        // slti
        assert_eq!(table.decode(0x0000_2013), None);
    }

    #[test]
    fn test_slot_of_matches_lookup() {
        let table = table();
        let group = &table.groups()[0];
        let slot = group.slot_of(0x4000_0033).unwrap();
        assert_eq!(group.rules()[slot].name(), "SUB");
        assert_eq!(group.slot_of(0x0000_0013), None);
    }

    #[test]
    fn test_empty_table_rejects_everything() {
        let table = DecodeTable::default();
        assert_eq!(table.decode(0), None);
        assert_eq!(table.decode(0x33), None);
    }

    #[test]
    fn test_linear_decode_first_match_wins() {
        let rules = vec![
            Rule::new("WIDE", 0x0000_007f, 0x0000_0033, "h_wide").unwrap(),
            Rule::new("ADD", 0xfe00_707f, 0x0000_0033, "h_add").unwrap(),
        ];
        assert_eq!(linear_decode(&rules, 0x0000_0033).unwrap().name(), "WIDE");
        assert_eq!(linear_decode(&rules, 0x0000_0013), None);
    }
}
