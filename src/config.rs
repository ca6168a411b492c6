use crate::error::{FilterError, Result};
use crate::hash::{HasherFactory, fnv_round_hasher};
use derive_builder::Builder;

/// Tuning inputs for a [`BloomFilter`](crate::BloomFilter).
#[derive(Clone, Debug, Builder)]
#[builder(pattern = "owned")]
pub struct BloomConfig {
    /// Number of elements the filter is sized for
    #[builder(default = "10_000_000")]
    pub capacity: u64,

    /// Target false positive rate at design capacity (between 0 and 1)
    #[builder(default = "0.1")]
    pub false_positive_rate: f64,

    /// Hash algorithm used for every round
    #[builder(default = "fnv_round_hasher")]
    pub hasher: HasherFactory,

    /// Byte width of the per-round random salts
    #[builder(default = "8")]
    pub salt_size: usize,
}

impl BloomConfig {
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(FilterError::InvalidConfig(
                "Capacity must be > 0".into(),
            ));
        }
        if self.false_positive_rate <= 0.0 || self.false_positive_rate >= 1.0 {
            return Err(FilterError::InvalidConfig(
                "False positive rate must be between 0 and 1".into(),
            ));
        }
        if self.salt_size == 0 {
            return Err(FilterError::InvalidConfig(
                "Salt size must be > 0".into(),
            ));
        }
        Ok(())
    }
}
