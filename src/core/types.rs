use serde::{Deserialize, Serialize};

/// Hashed representation of one k-mer under a fixed k-mer size and hash function
pub type HashValue = u64;

/// Default k-mer size used by both subcommands
pub const DEFAULT_KSIZE: u32 = 31;

/// Default murmur seed written by sourmash
pub const DEFAULT_SEED: u64 = 42;

/// Hash function identifier written into signature records
pub const HASH_FUNCTION: &str = "0.murmur64";

/// Molecule type written into sketch records
pub const DEFAULT_MOLECULE: &str = "DNA";

/// Largest hash value retained by a sketch with the given scale parameter.
///
/// A scale of 0 or 1 keeps the full hash space.
///
/// # Examples
///
/// ```
/// use sig_cleaner::core::types::max_hash_for_scale;
///
/// assert_eq!(max_hash_for_scale(1), u64::MAX);
/// assert_eq!(max_hash_for_scale(2), u64::MAX / 2);
/// ```
#[must_use]
pub fn max_hash_for_scale(scale: u64) -> u64 {
    if scale <= 1 {
        u64::MAX
    } else {
        u64::MAX / scale
    }
}

/// What happens to per-hash abundances of the hashes a filter keeps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbundancePolicy {
    /// Output is a plain hash set, as the unweighted sketches written by sourmash
    #[default]
    Drop,
    /// Kept hashes carry their source abundance when the source tracked one
    Keep,
}
