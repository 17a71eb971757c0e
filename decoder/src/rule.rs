//! Encoding rules
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handler identifier
///
/// The decoder never looks inside; two rules dispatch to the same behavior exactly
/// when their handler references are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandlerRef(String);

impl HandlerRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for HandlerRef {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for HandlerRef {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A rule whose match bits are not covered by its mask
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("match bits {match_bits:#010x} of {name} are not covered by mask {mask:#010x}")]
pub struct MatchOutsideMask {
    pub name: String,
    pub mask: u32,
    pub match_bits: u32,
}

/// One encoding rule: `word & mask == match_bits` selects `handler`
///
/// Invariant: `match_bits & mask == match_bits`, checked by [`Rule::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    name: String,
    mask: u32,
    match_bits: u32,
    handler: HandlerRef,
    /// Opcode name when it differs from the rule name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    opcode: Option<String>,
}

impl Rule {
    pub fn new(
        name: impl Into<String>,
        mask: u32,
        match_bits: u32,
        handler: impl Into<HandlerRef>,
    ) -> Result<Self, MatchOutsideMask> {
        let name = name.into();
        if match_bits & mask != match_bits {
            return Err(MatchOutsideMask { name, mask, match_bits });
        }
        Ok(Self { name, mask, match_bits, handler: handler.into(), opcode: None })
    }

    /// Attach an opcode name that differs from the rule name
    pub fn with_opcode(mut self, opcode: impl Into<String>) -> Self {
        self.opcode = Some(opcode.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn mask(&self) -> u32 {
        self.mask
    }

    pub const fn match_bits(&self) -> u32 {
        self.match_bits
    }

    pub fn handler(&self) -> &HandlerRef {
        &self.handler
    }

    /// Opcode name, falling back to the rule name
    pub fn opcode_name(&self) -> &str {
        self.opcode.as_deref().unwrap_or(&self.name)
    }

    /// Whether `word` is an encoding of this rule
    #[inline(always)]
    pub const fn matches(&self, word: u32) -> bool {
        word & self.mask == self.match_bits
    }

    /// Narrow the mask to `mask`, keeping every match bit covered
    pub(crate) fn set_mask(&mut self, mask: u32) {
        debug_assert_eq!(self.match_bits & mask, self.match_bits);
        self.mask = mask;
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:#010x}/{:#010x} -> {})", self.name, self.mask, self.match_bits, self.handler)
    }
}
