pub mod apriori;
pub mod config;
pub mod error;
pub mod input;
pub mod report;

#[cfg(feature = "python")]
mod python;

pub use apriori::{generate_rules, mine, FrequentItemsets, Rule, TransactionSet};
pub use config::{CandidateStrategy, MiningConfig, SupportThreshold};
pub use error::{MiningError, Result};
pub use report::MiningReport;

/// Mines frequent itemsets, derives rules and resolves both back to item labels.
/// Thresholds are checked before any work is done.
pub fn analyze(transactions: &TransactionSet, config: &MiningConfig) -> Result<MiningReport> {
    config.validate()?;
    let frequent = mine(transactions, config)?;
    let rules = generate_rules(&frequent, transactions, config.min_confidence);
    Ok(MiningReport::build(transactions, &frequent, &rules, config.top_k))
}
