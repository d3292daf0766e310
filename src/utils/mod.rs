//! Shared helpers for argument validation and sourmash checksums.

pub mod validation;
