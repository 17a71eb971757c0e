use hashdec_mph::MphError;

/// Decode table construction errors
///
/// All of these are fatal for the build: no partial table is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("Malformed rule at line {line} ({record:?}): {reason}")]
    MalformedRule { line: usize, record: String, reason: String },

    #[error(
        "Rules {first} and {second} share match bits {match_bits:#010x} but use different handlers"
    )]
    ConflictingDuplicateKey { match_bits: u32, first: String, second: String },

    #[error("No perfect hash for mask {mask:#010x} with {keys} keys: {source}")]
    PerfectHashConstructionFailed {
        mask: u32,
        keys: usize,
        #[source]
        source: MphError,
    },

    #[error("Rule {rule} refers to handler {handler} which is not registered")]
    UnboundHandler { handler: String, rule: String },
}

impl BuildError {
    pub(crate) fn malformed(line: usize, record: &str, reason: impl Into<String>) -> Self {
        Self::MalformedRule { line, record: record.to_string(), reason: reason.into() }
    }
}
