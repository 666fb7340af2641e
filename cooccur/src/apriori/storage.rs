use std::collections::{BTreeMap, HashMap};

/// Memory-efficient itemset storage using flat arrays
#[derive(Debug, Clone, Default)]
pub struct ItemsetStorage {
    items: Vec<usize>,
    offsets: Vec<(usize, usize)>,
    supports: Vec<usize>,
}

impl ItemsetStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_itemset(&mut self, mut items: Vec<usize>, support: usize) -> usize {
        items.sort_unstable();
        items.dedup();

        let start = self.items.len();
        self.items.extend_from_slice(&items);
        self.offsets.push((start, items.len()));
        self.supports.push(support);

        self.offsets.len() - 1
    }

    pub fn get_itemset(&self, idx: usize) -> &[usize] {
        let (start, len) = self.offsets[idx];
        &self.items[start..start + len]
    }

    pub fn support(&self, idx: usize) -> usize {
        self.supports[idx]
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// All frequent itemsets of one size, in discovery order.
#[derive(Debug, Clone)]
pub struct FrequentLevel {
    pub(crate) storage: ItemsetStorage,
    pub itemset_size: usize,
}

impl FrequentLevel {
    pub fn new(itemset_size: usize) -> Self {
        Self {
            storage: ItemsetStorage::new(),
            itemset_size,
        }
    }

    pub fn add_itemset(&mut self, items: Vec<usize>, support: usize) -> usize {
        debug_assert_eq!(items.len(), self.itemset_size);
        self.storage.add_itemset(items, support)
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    pub fn get_itemset(&self, idx: usize) -> &[usize] {
        self.storage.get_itemset(idx)
    }

    pub fn support(&self, idx: usize) -> usize {
        self.storage.support(idx)
    }

    pub fn iter_itemsets(&self) -> impl Iterator<Item = &[usize]> {
        (0..self.storage.len()).map(move |idx| self.get_itemset(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[usize], usize)> {
        (0..self.storage.len()).map(move |idx| (self.get_itemset(idx), self.support(idx)))
    }

    /// Sorted union of every item in this level.
    pub fn item_universe(&self) -> Vec<usize> {
        let mut universe = self.storage.items.clone();
        universe.sort_unstable();
        universe.dedup();
        universe
    }
}

/// The frequent-itemset table produced by one mining pass. Immutable once built.
#[derive(Debug, Clone)]
pub struct FrequentItemsets {
    levels: Vec<FrequentLevel>,
    index: HashMap<Vec<usize>, usize>,
    num_transactions: usize,
    min_count: usize,
}

impl FrequentItemsets {
    pub(crate) fn new(levels: Vec<FrequentLevel>, num_transactions: usize, min_count: usize) -> Self {
        let index = levels
            .iter()
            .flat_map(|level| level.iter())
            .map(|(itemset, count)| (itemset.to_vec(), count))
            .collect();

        Self {
            levels,
            index,
            num_transactions,
            min_count,
        }
    }

    pub fn levels(&self) -> &[FrequentLevel] {
        &self.levels
    }

    pub fn level(&self, itemset_size: usize) -> Option<&FrequentLevel> {
        itemset_size
            .checked_sub(1)
            .and_then(|idx| self.levels.get(idx))
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.levels.len()
    }

    pub fn num_transactions(&self) -> usize {
        self.num_transactions
    }

    pub fn min_count(&self) -> usize {
        self.min_count
    }

    /// Support count of a sorted itemset, or `None` if it is not frequent.
    pub fn count(&self, itemset: &[usize]) -> Option<usize> {
        self.index.get(itemset).copied()
    }

    pub fn contains(&self, itemset: &[usize]) -> bool {
        self.index.contains_key(itemset)
    }

    pub fn support(&self, count: usize) -> f64 {
        count as f64 / self.num_transactions as f64
    }

    /// Mining order: level by level, discovery order within a level.
    pub fn iter(&self) -> impl Iterator<Item = (&[usize], usize)> {
        self.levels.iter().flat_map(|level| level.iter())
    }

    /// Reporting order: ascending size, descending count, ascending members.
    pub fn sorted(&self) -> Vec<(&[usize], usize)> {
        let mut all: Vec<_> = self.iter().collect();
        all.sort_by(|a, b| {
            a.0.len()
                .cmp(&b.0.len())
                .then(b.1.cmp(&a.1))
                .then_with(|| a.0.cmp(b.0))
        });
        all
    }

    pub fn counts_by_size(&self) -> BTreeMap<usize, usize> {
        self.levels
            .iter()
            .filter(|level| !level.is_empty())
            .map(|level| (level.itemset_size, level.len()))
            .collect()
    }
}
