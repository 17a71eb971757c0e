//! Perfect-hash instruction decoder
//!
//! An instruction set is described by a table of rules. Each rule says: if the bits
//! of the word selected by `mask` equal `match_bits`, the word belongs to `handler`.
//!
//! **Example**
//!
//! ```text
//! ADD  mask 0xFE00707F  match 0x00000033
//! SUB  mask 0xFE00707F  match 0x40000033
//! ADDI mask 0x0000707F  match 0x00000013
//! ```
//!
//! - `add x1, x2, x3` is `0x003100B3`. Masking with `0xFE00707F` keeps funct7, funct3
//!   and the opcode and drops the registers, leaving `0x00000033`: this is ADD.
//! - `addi x1, x0, -1` is `0xFFF00093`. Under `0xFE00707F` it becomes `0xFE000013`,
//!   which is no rule. Under `0x0000707F` it becomes `0x00000013`: this is ADDI.
//!
//! Checking every rule in turn works but is slow for large instruction sets. Here
//! rules sharing a mask form a group, and each group gets a minimal perfect hash
//! over its match bits. Decoding a word then costs one hash and one comparison per
//! distinct mask, instead of one comparison per rule.
//!
//! Construction runs once, offline:
//!
//! ```text
//! rules -> resolve_duplicates -> partition -> perfect hash per group -> DecodeTable
//! ```
//!
//! and the resulting [`DecodeTable`] is immutable and can be decoded from any
//! number of threads.

pub mod config;
mod decoder;
pub mod dispatch;
mod error;
pub mod partition;
pub mod resolve;
pub mod rule;
pub mod rule_source;
pub mod table;

pub use config::{BuildConfig, DecodeConfig, InstructionLength};
pub use decoder::linear_decode;
pub use dispatch::{Dispatcher, HandlerFn, HandlerSet};
pub use error::BuildError;
pub use hashdec_mph::{MphConfig, MphError, PerfectHashSpec, Salts};
pub use partition::{partition, MaskGroup};
pub use resolve::resolve_duplicates;
pub use rule::{HandlerRef, MatchOutsideMask, Rule};
pub use rule_source::{parse_record, RuleTable};
pub use table::{DecodeTable, GroupSelfCheck, SelfCheckFailure, TableBuilder, TableGroup};
