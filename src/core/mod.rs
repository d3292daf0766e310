//! Core data types for k-mer sketch cleanup.
//!
//! - [`HashValue`]: the 64-bit hash of one k-mer
//! - [`Signature`]: the hashes of one sketch at a fixed k-mer size, optionally with abundances
//! - [`AbundancePolicy`]: whether filtered output keeps per-hash abundances
//!
//! Signatures are created by the reader in [`crate::parsing`] and consumed by
//! either the counting phase or the filtering phase. Nothing holds on to them
//! after that.

pub mod signature;
pub mod types;
