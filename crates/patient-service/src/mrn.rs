//! Medical record number generation.

use patient_core::date_stamp;
use rand::Rng;
use time::Date;

/// Default MRN prefix.
pub const DEFAULT_MRN_PREFIX: &str = "RM";

/// Produces candidate medical record numbers.
///
/// Candidates are not assumed unique; the store's unique constraint decides.
pub trait MrnGenerator: Send + Sync {
    /// Returns a fresh candidate for a record created on `today`.
    fn generate(&self, today: Date) -> String;
}

/// `{prefix}-{YYYYMMDD}-{NNNNN}` with a random zero-padded suffix.
#[derive(Debug, Clone)]
pub struct RandomMrnGenerator {
    prefix: String,
}

impl RandomMrnGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for RandomMrnGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_MRN_PREFIX)
    }
}

impl MrnGenerator for RandomMrnGenerator {
    fn generate(&self, today: Date) -> String {
        let suffix: u32 = rand::thread_rng().gen_range(0..100_000);
        format!("{}-{}-{suffix:05}", self.prefix, date_stamp(today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn matches_pattern(mrn: &str, prefix: &str, stamp: &str) -> bool {
        let parts: Vec<&str> = mrn.split('-').collect();
        parts.len() == 3
            && parts[0] == prefix
            && parts[1] == stamp
            && parts[2].len() == 5
            && parts[2].chars().all(|c| c.is_ascii_digit())
    }

    #[test]
    fn test_default_format() {
        let generator = RandomMrnGenerator::default();
        for _ in 0..100 {
            let mrn = generator.generate(date!(2024-03-07));
            assert!(matches_pattern(&mrn, "RM", "20240307"), "bad MRN {mrn}");
        }
    }

    #[test]
    fn test_custom_prefix() {
        let generator = RandomMrnGenerator::new("MRN");
        assert_eq!(generator.prefix(), "MRN");
        let mrn = generator.generate(date!(2025-12-31));
        assert!(matches_pattern(&mrn, "MRN", "20251231"), "bad MRN {mrn}");
    }
}
