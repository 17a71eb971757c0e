/// Perfect hash construction errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MphError {
    #[error("Cannot build a perfect hash over an empty key set")]
    EmptyKeySet,

    #[error("Key {0:#010x} appears more than once")]
    DuplicateKey(u32),

    #[error("No collision-free displacement table for {keys} keys after {attempts} attempts")]
    ExhaustedAttempts { keys: usize, attempts: usize },
}
