use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{MiningError, Result};

/// Minimum support, either absolute or relative to the number of transactions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportThreshold {
    Count(usize),
    Ratio(f64),
}

impl SupportThreshold {
    pub fn validate(&self) -> Result<()> {
        match *self {
            SupportThreshold::Count(0) => Err(MiningError::invalid(
                "min_support_count",
                0,
                "must be at least 1",
            )),
            SupportThreshold::Ratio(r) if !(r > 0.0 && r <= 1.0) => Err(MiningError::invalid(
                "min_support_ratio",
                r,
                "must be in (0, 1]",
            )),
            _ => Ok(()),
        }
    }

    /// Absolute count a candidate must reach in a dataset of `num_transactions`.
    pub fn min_count(&self, num_transactions: usize) -> usize {
        match *self {
            SupportThreshold::Count(n) => n,
            SupportThreshold::Ratio(r) => {
                // 1e-9 absorbs float noise such as 0.1 * 30 = 3.0000000000000004
                let raw = (r * num_transactions as f64 - 1e-9).ceil();
                raw.max(1.0) as usize
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum CandidateStrategy {
    /// Every k-combination of the items seen in level k-1.
    #[default]
    Universe,
    /// Join (k-1)-itemsets sharing a prefix, then drop candidates with an infrequent subset.
    PrefixJoin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiningConfig {
    pub min_support: SupportThreshold,
    pub min_confidence: f64,
    pub top_k: usize,
    pub strategy: CandidateStrategy,
    pub max_len: Option<usize>,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            min_support: SupportThreshold::Count(2),
            min_confidence: 0.5,
            top_k: 10,
            strategy: CandidateStrategy::Universe,
            max_len: None,
        }
    }
}

impl MiningConfig {
    pub fn new(min_support_count: usize, min_confidence: f64) -> Self {
        Self {
            min_support: SupportThreshold::Count(min_support_count),
            min_confidence,
            ..Self::default()
        }
    }

    pub fn with_min_support_ratio(mut self, ratio: f64) -> Self {
        self.min_support = SupportThreshold::Ratio(ratio);
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_strategy(mut self, strategy: CandidateStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.min_support.validate()?;

        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(MiningError::invalid(
                "min_confidence",
                self.min_confidence,
                "must be in [0, 1]",
            ));
        }

        if self.max_len == Some(0) {
            return Err(MiningError::invalid("max_len", 0, "must be at least 1"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(MiningConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_support_count() {
        let err = MiningConfig::new(0, 0.5).validate().unwrap_err();
        assert!(matches!(
            err,
            MiningError::InvalidThreshold { name: "min_support_count", .. }
        ));
    }

    #[test]
    fn rejects_confidence_outside_unit_interval() {
        assert!(MiningConfig::new(1, 1.5).validate().is_err());
        assert!(MiningConfig::new(1, -0.1).validate().is_err());
        assert!(MiningConfig::new(1, f64::NAN).validate().is_err());
        assert!(MiningConfig::new(1, 0.0).validate().is_ok());
        assert!(MiningConfig::new(1, 1.0).validate().is_ok());
    }

    #[test]
    fn rejects_bad_ratio_and_max_len() {
        assert!(MiningConfig::default().with_min_support_ratio(0.0).validate().is_err());
        assert!(MiningConfig::default().with_min_support_ratio(1.2).validate().is_err());
        assert!(MiningConfig::default().with_max_len(0).validate().is_err());
    }

    #[test]
    fn ratio_resolves_to_ceiling_count() {
        assert_eq!(SupportThreshold::Ratio(0.5).min_count(4), 2);
        assert_eq!(SupportThreshold::Ratio(0.5).min_count(5), 3);
        assert_eq!(SupportThreshold::Ratio(0.1).min_count(30), 3);
        assert_eq!(SupportThreshold::Ratio(0.01).min_count(10), 1);
        assert_eq!(SupportThreshold::Count(7).min_count(3), 7);
    }
}
