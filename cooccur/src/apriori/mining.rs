use rayon::prelude::*;
use tracing::{debug, info};

use super::candidates::{prefix_join_candidates, universe_candidates};
use super::items::TransactionSet;
use super::storage::{FrequentItemsets, FrequentLevel};
use crate::config::{CandidateStrategy, MiningConfig};
use crate::error::{MiningError, Result};

/// Level-wise frequent itemset mining. Stops at the first empty level or at `config.max_len`.
pub fn mine(transactions: &TransactionSet, config: &MiningConfig) -> Result<FrequentItemsets> {
    config.validate()?;
    if transactions.is_empty() {
        return Err(MiningError::EmptyDataset);
    }

    let num_transactions = transactions.len();
    let min_count = config.min_support.min_count(num_transactions);
    info!(
        num_transactions,
        num_items = transactions.items().len(),
        min_count,
        strategy = ?config.strategy,
        "mining frequent itemsets"
    );

    let mut levels = Vec::new();
    let mut current = frequent_items(transactions, min_count);

    while !current.is_empty() {
        debug!(
            itemset_size = current.itemset_size,
            frequent = current.len(),
            "level complete"
        );

        let reached_cap = config
            .max_len
            .is_some_and(|max_len| current.itemset_size >= max_len);
        levels.push(current);
        if reached_cap {
            break;
        }

        current = match levels.last() {
            Some(prev) => next_level(transactions, prev, min_count, config.strategy),
            None => break,
        };
    }

    let frequent = FrequentItemsets::new(levels, num_transactions, min_count);
    info!(
        frequent = frequent.len(),
        max_size = frequent.max_size(),
        "mining finished"
    );
    Ok(frequent)
}

/// Size-1 frequent itemsets, in item id order.
pub fn frequent_items(transactions: &TransactionSet, min_count: usize) -> FrequentLevel {
    let mut counts = vec![0usize; transactions.items().len()];
    for tx in transactions.transactions() {
        for &item in tx {
            counts[item] += 1;
        }
    }

    let mut level = FrequentLevel::new(1);
    for (item, &count) in counts.iter().enumerate() {
        if count >= min_count {
            level.add_itemset(vec![item], count);
        }
    }
    level
}

/// Generates the candidates that follow `prev` and keeps those reaching `min_count`.
/// Each candidate is a full transaction scan; scans run in parallel and results keep
/// candidate order.
pub fn next_level(
    transactions: &TransactionSet,
    prev: &FrequentLevel,
    min_count: usize,
    strategy: CandidateStrategy,
) -> FrequentLevel {
    let itemset_size = prev.itemset_size + 1;
    let candidates = match strategy {
        CandidateStrategy::Universe => universe_candidates(prev),
        CandidateStrategy::PrefixJoin => prefix_join_candidates(prev),
    };
    debug!(itemset_size, candidates = candidates.len(), "counting candidate support");

    let counted: Vec<(Vec<usize>, usize)> = candidates
        .into_par_iter()
        .filter_map(|candidate| {
            let count = transactions.count_containing(&candidate);
            (count >= min_count).then_some((candidate, count))
        })
        .collect();

    let mut level = FrequentLevel::new(itemset_size);
    for (itemset, count) in counted {
        level.add_itemset(itemset, count);
    }
    level
}
