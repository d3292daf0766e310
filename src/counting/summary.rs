use std::collections::BTreeMap;

use serde::Serialize;

use crate::counting::table::FrequencyTable;
use crate::filtering::classifier::ErrorSet;

/// Figures reported after an extraction run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountSummary {
    pub ksize: u32,
    pub files: usize,
    pub signatures: u64,
    pub total_hashes: u64,
    pub distinct_hashes: usize,
    pub max_error_count: u64,
    pub error_hashes: usize,
    /// Occurrence count -> number of distinct hashes with that count
    pub spectrum: BTreeMap<u64, u64>,
}

impl CountSummary {
    #[must_use]
    pub fn new(
        ksize: u32,
        files: usize,
        max_error_count: u64,
        table: &FrequencyTable,
        errors: &ErrorSet,
    ) -> Self {
        Self {
            ksize,
            files,
            signatures: table.signatures(),
            total_hashes: table.total_occurrences(),
            distinct_hashes: table.len(),
            max_error_count,
            error_hashes: errors.len(),
            spectrum: table.spectrum(),
        }
    }

    /// Fraction of distinct hashes classified as errors
    pub fn error_fraction(&self) -> f64 {
        if self.distinct_hashes == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        {
            self.error_hashes as f64 / self.distinct_hashes as f64
        }
    }
}
