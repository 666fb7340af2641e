use std::cmp::Ordering;

use tracing::{debug, warn};

use super::candidates::for_each_combination;
use super::items::TransactionSet;
use super::storage::FrequentItemsets;

/// An association rule `antecedent => consequent`. Both sides are sorted item ids.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub antecedent: Vec<usize>,
    pub consequent: Vec<usize>,
    pub support_count: usize,
    pub confidence: f64,
    pub lift: f64,
}

impl Rule {
    /// The frequent itemset this rule was split from.
    pub fn itemset(&self) -> Vec<usize> {
        let mut itemset = Vec::with_capacity(self.antecedent.len() + self.consequent.len());
        itemset.extend_from_slice(&self.antecedent);
        itemset.extend_from_slice(&self.consequent);
        itemset.sort_unstable();
        itemset
    }

    pub fn support(&self, num_transactions: usize) -> f64 {
        self.support_count as f64 / num_transactions as f64
    }
}

/// Splits every frequent itemset of size >= 2 into all (antecedent, consequent) pairs,
/// keeps those with `confidence >= min_confidence` and ranks them with [`rank_rules`].
pub fn generate_rules(
    frequent: &FrequentItemsets,
    transactions: &TransactionSet,
    min_confidence: f64,
) -> Vec<Rule> {
    let mut rules = Vec::new();

    for (itemset, count) in frequent.iter().filter(|(itemset, _)| itemset.len() >= 2) {
        for split in 1..itemset.len() {
            for_each_combination(itemset, split, |antecedent| {
                if let Some(rule) = score_split(frequent, transactions, itemset, count, antecedent) {
                    if rule.confidence >= min_confidence {
                        rules.push(rule);
                    }
                }
            });
        }
    }

    rank_rules(&mut rules);
    debug!(rules = rules.len(), min_confidence, "rules generated");
    rules
}

fn score_split(
    frequent: &FrequentItemsets,
    transactions: &TransactionSet,
    itemset: &[usize],
    count: usize,
    antecedent: &[usize],
) -> Option<Rule> {
    let antecedent_count = match frequent.count(antecedent) {
        Some(c) if c > 0 => c,
        _ => {
            warn!(?itemset, ?antecedent, "antecedent missing from frequent table, skipping split");
            return None;
        }
    };

    let consequent: Vec<usize> = itemset
        .iter()
        .copied()
        .filter(|item| !antecedent.contains(item))
        .collect();

    let num_transactions = frequent.num_transactions() as f64;
    let consequent_count = match frequent.count(&consequent) {
        Some(c) if c > 0 => c,
        _ => {
            warn!(?itemset, ?consequent, "consequent missing from frequent table, recounting");
            transactions.count_containing(&consequent)
        }
    };
    let consequent_support = consequent_count as f64 / num_transactions;

    let confidence = count as f64 / antecedent_count as f64;
    let lift = if consequent_support > 0.0 {
        confidence / consequent_support
    } else {
        f64::INFINITY
    };

    Some(Rule {
        antecedent: antecedent.to_vec(),
        consequent,
        support_count: count,
        confidence,
        lift,
    })
}

/// Lift descending, then confidence descending. Stable, so equal rules keep generation order.
pub fn rank_rules(rules: &mut [Rule]) {
    rules.sort_by(|a, b| compare_rank(b, a));
}

fn compare_rank(a: &Rule, b: &Rule) -> Ordering {
    a.lift
        .total_cmp(&b.lift)
        .then_with(|| a.confidence.total_cmp(&b.confidence))
}

/// The first `k` rules of an already ranked list.
pub fn top_by_lift(rules: &[Rule], k: usize) -> &[Rule] {
    &rules[..k.min(rules.len())]
}
