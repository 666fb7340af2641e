use std::collections::HashMap;

use ndarray::{Array2, ArrayView2};
use tracing::debug;

use crate::error::{MiningError, Result};

/// Interns item tokens into dense ids. Id order is the canonical member order.
#[derive(Debug, Clone, Default)]
pub struct ItemTable {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl ItemTable {
    /// Ids follow ascending token order.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        labels.sort_unstable();
        labels.dedup();
        let index = labels
            .iter()
            .enumerate()
            .map(|(id, label)| (label.clone(), id))
            .collect();
        Self { labels, index }
    }

    /// Ids follow the given order, which must not repeat a label.
    pub fn with_order<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let mut index = HashMap::with_capacity(labels.len());
        for (id, label) in labels.iter().enumerate() {
            if index.insert(label.clone(), id).is_some() {
                return Err(MiningError::DuplicateLabel(label.clone()));
            }
        }
        Ok(Self { labels, index })
    }

    pub fn id(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    pub fn label(&self, id: usize) -> &str {
        &self.labels[id]
    }

    pub fn resolve(&self, ids: &[usize]) -> Vec<String> {
        ids.iter().map(|&id| self.labels[id].clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Immutable, fully materialized dataset. Each transaction is a sorted, de-duplicated,
/// non-empty id list; inputs without items are dropped and do not count towards N.
#[derive(Debug, Clone)]
pub struct TransactionSet {
    items: ItemTable,
    transactions: Vec<Vec<usize>>,
}

impl TransactionSet {
    pub fn from_tokens<T, I, S>(transactions: T) -> Result<Self>
    where
        T: IntoIterator<Item = I>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut raw: Vec<Vec<String>> = transactions
            .into_iter()
            .map(|tx| tx.into_iter().map(|item| item.as_ref().to_owned()).collect())
            .collect();

        let total = raw.len();
        raw.retain(|tx: &Vec<String>| !tx.is_empty());
        if raw.len() < total {
            debug!(skipped = total - raw.len(), "dropping transactions without items");
        }
        if raw.is_empty() {
            return Err(MiningError::EmptyDataset);
        }

        let items = ItemTable::from_labels(raw.iter().flatten().cloned());
        let transactions = raw
            .iter()
            .map(|tx| {
                let mut ids: Vec<usize> = tx.iter().filter_map(|item| items.id(item)).collect();
                ids.sort_unstable();
                ids.dedup();
                ids
            })
            .collect();

        Ok(Self { items, transactions })
    }

    /// One-hot input: rows are transactions, column `j` is `labels[j]`, non-zero means present.
    pub fn from_matrix<S: AsRef<str>>(matrix: ArrayView2<i32>, labels: &[S]) -> Result<Self> {
        let (num_transactions, num_items) = matrix.dim();
        if num_items != labels.len() {
            return Err(MiningError::MatrixShape {
                columns: num_items,
                labels: labels.len(),
            });
        }

        let items = ItemTable::with_order(labels.iter().map(|l| l.as_ref().to_owned()))?;
        let transactions: Vec<Vec<usize>> = matrix
            .rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|&(_, &value)| value != 0)
                    .map(|(item, _)| item)
                    .collect::<Vec<usize>>()
            })
            .filter(|tx| !tx.is_empty())
            .collect();

        if transactions.len() < num_transactions {
            debug!(
                skipped = num_transactions - transactions.len(),
                "dropping all-zero rows"
            );
        }
        if transactions.is_empty() {
            return Err(MiningError::EmptyDataset);
        }

        Ok(Self { items, transactions })
    }

    pub fn to_matrix(&self) -> Array2<i32> {
        let mut matrix = Array2::zeros((self.transactions.len(), self.items.len()));
        for (tx_idx, tx) in self.transactions.iter().enumerate() {
            for &item in tx {
                matrix[[tx_idx, item]] = 1;
            }
        }
        matrix
    }

    pub fn items(&self) -> &ItemTable {
        &self.items
    }

    pub fn transactions(&self) -> &[Vec<usize>] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Number of transactions that contain every item of the sorted `itemset`.
    pub fn count_containing(&self, itemset: &[usize]) -> usize {
        self.transactions
            .iter()
            .filter(|tx| is_subset(itemset, tx))
            .count()
    }
}

/// Both slices must be sorted ascending.
pub fn is_subset(needle: &[usize], haystack: &[usize]) -> bool {
    let mut hay = haystack.iter().copied();
    'outer: for &item in needle {
        for candidate in hay.by_ref() {
            if candidate == item {
                continue 'outer;
            }
            if candidate > item {
                return false;
            }
        }
        return false;
    }
    true
}
