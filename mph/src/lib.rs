//! Minimal perfect hashing for small, fixed sets of 32-bit keys
//!
//! Given `n` distinct keys known up front, this crate finds a function that maps
//! every key to a distinct slot in `0..n`. No slot is wasted, which is what makes
//! the hash *minimal*.
//!
//! **How it works**
//!
//! Two salted hash functions `h1` and `h2` each send a key to a bucket in `0..n`.
//! Every bucket `b` owns a displacement `d[b]`, and the final slot of a key is
//!
//! ```text
//! index(k) = (d[h1(k) % n] + d[h2(k) % n]) % n
//! ```
//!
//! The builder picks random salts, then fills the displacement table one bucket at
//! a time, most crowded bucket first, choosing a value that does not collide with
//! any slot already handed out. If some bucket has no free value left, the salts
//! are thrown away and the search starts over. This is a Las Vegas search: it
//! either returns a correct table or gives up after a bounded number of attempts.
//!
//! Note: the returned [`PerfectHashSpec`] only guarantees distinct slots for the keys
//! it was built from. Any other `u32` still lands on *some* slot, so callers must
//! compare the stored key before trusting a lookup.

mod builder;
mod config;
mod error;
pub mod hash;

pub use builder::{MphBuilder, PerfectHashSpec};
pub use config::MphConfig;
pub use error::MphError;
pub use hash::{Salts, HASH_PRIME};
