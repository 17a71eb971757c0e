//! Rule table text format
//!
//! ```text
//! set_instruction_length_4
//! # name, mask,       match_bits, handler[, opcode_name]
//! ADD,    0xFE00707F, 0x00000033, h_add
//! SUB,    0xFE00707F, 0x40000033, h_sub
//! ADDI,   0x0000707F, 0x00000013, h_addi
//! ```
//!
//! The first significant line selects the instruction length, every other one is a
//! record. Blank lines and lines starting with `#` are skipped. Numbers take a `0x`
//! or `0b` prefix, or are plain decimal, and may use `_` as a separator.
//!
//! Reading the text from disk is left to the caller.
use crate::{config::InstructionLength, error::BuildError, rule::Rule};

const MIN_FIELDS: usize = 4;
const MAX_FIELDS: usize = 5;

/// A parsed rule table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    pub instruction_length: InstructionLength,
    pub rules: Vec<Rule>,
}

impl RuleTable {
    /// Parse a whole table
    ///
    /// # Arguments
    /// * `text` - Table contents. Line numbers in errors are 1-based.
    ///
    /// # Returns
    /// * `Ok(RuleTable)` - The length directive and every record, in input order
    /// * `Err(BuildError::MalformedRule)` - For a missing or unknown directive, or the
    ///   first record that does not parse
    pub fn parse(text: &str) -> Result<Self, BuildError> {
        let mut lines = significant_lines(text);

        let (line, directive) =
            lines.next().ok_or_else(|| BuildError::malformed(1, "", "empty rule table"))?;
        let instruction_length = InstructionLength::from_directive(directive).ok_or_else(|| {
            BuildError::malformed(
                line,
                directive,
                "expected set_instruction_length_2 or set_instruction_length_4",
            )
        })?;

        let rules =
            lines.map(|(line, record)| parse_record(line, record)).collect::<Result<Vec<_>, _>>()?;

        Ok(Self { instruction_length, rules })
    }
}

/// Parse one `name, mask, match_bits, handler[, opcode_name]` record
pub fn parse_record(line: usize, record: &str) -> Result<Rule, BuildError> {
    let fields: Vec<&str> = record.split(',').map(str::trim).collect();
    if !(MIN_FIELDS..=MAX_FIELDS).contains(&fields.len()) {
        return Err(BuildError::malformed(
            line,
            record,
            format!("expected {MIN_FIELDS} or {MAX_FIELDS} fields, found {}", fields.len()),
        ));
    }

    let name = non_empty(fields[0], "name", line, record)?;
    let mask = parse_number(fields[1])
        .ok_or_else(|| BuildError::malformed(line, record, format!("bad mask {:?}", fields[1])))?;
    let match_bits = parse_number(fields[2]).ok_or_else(|| {
        BuildError::malformed(line, record, format!("bad match bits {:?}", fields[2]))
    })?;
    let handler = non_empty(fields[3], "handler", line, record)?;

    let rule = Rule::new(name, mask, match_bits, handler)
        .map_err(|err| BuildError::malformed(line, record, err.to_string()))?;

    match fields.get(4) {
        Some(opcode) => Ok(rule.with_opcode(non_empty(opcode, "opcode name", line, record)?)),
        None => Ok(rule),
    }
}

/// Non-blank, non-comment lines with their 1-based line numbers
fn significant_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn non_empty<'a>(
    field: &'a str,
    what: &str,
    line: usize,
    record: &str,
) -> Result<&'a str, BuildError> {
    if field.is_empty() {
        Err(BuildError::malformed(line, record, format!("empty {what}")))
    } else {
        Ok(field)
    }
}

fn parse_number(field: &str) -> Option<u32> {
    let digits = field.replace('_', "");
    if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = digits.strip_prefix("0b").or_else(|| digits.strip_prefix("0B")) {
        u32::from_str_radix(bin, 2).ok()
    } else {
        digits.parse().ok()
    }
}
