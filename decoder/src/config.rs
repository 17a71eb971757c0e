//! Construction and decode-time configuration
use std::fmt;

use hashdec_mph::MphConfig;
use serde::{Deserialize, Serialize};

/// Length of the instructions a table decodes
///
/// Travels with the rule table and into handler dispatch. There is no global
/// default that handlers could read behind the caller's back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InstructionLength {
    /// 16-bit compressed instructions
    Compressed,
    /// 32-bit standard instructions
    #[default]
    Standard,
}

impl InstructionLength {
    const DIRECTIVE_PREFIX: &'static str = "set_instruction_length_";

    /// Size of one instruction in bytes
    pub const fn bytes(self) -> usize {
        match self {
            InstructionLength::Compressed => 2,
            InstructionLength::Standard => 4,
        }
    }

    /// Parse a rule table directive such as `set_instruction_length_4`
    pub fn from_directive(directive: &str) -> Option<Self> {
        match directive.trim().strip_prefix(Self::DIRECTIVE_PREFIX)? {
            "2" => Some(InstructionLength::Compressed),
            "4" => Some(InstructionLength::Standard),
            _ => None,
        }
    }

    /// The directive that selects this length in a rule table
    pub fn directive(self) -> String {
        format!("{}{}", Self::DIRECTIVE_PREFIX, self.bytes())
    }
}

impl fmt::Display for InstructionLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bytes() * 8)
    }
}

/// Settings handed to every handler on dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DecodeConfig {
    pub instruction_length: InstructionLength,
    /// Handler ABI version, passed through untouched
    pub version: u32,
}

impl DecodeConfig {
    pub const fn new(instruction_length: InstructionLength) -> Self {
        Self { instruction_length, version: 0 }
    }

    pub const fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }
}

/// Decode table construction settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Perfect hash search limits, applied to each mask group
    pub mph: MphConfig,

    /// Master seed for the salt search. `None` draws one from the thread RNG.
    pub seed: Option<u64>,

    /// Search the mask groups on the rayon thread pool
    pub parallel: bool,
}

impl BuildConfig {
    pub const fn new() -> Self {
        Self { mph: MphConfig::new(), seed: None, parallel: true }
    }

    /// Make construction reproducible
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub const fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.mph = self.mph.with_max_attempts(max_attempts);
        self
    }

    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::new()
    }
}
