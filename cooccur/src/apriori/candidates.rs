use std::collections::HashSet;

use super::storage::FrequentLevel;

/// Calls `callback` with every k-combination of `items`, in lexicographic index order.
pub fn for_each_combination<F>(items: &[usize], k: usize, mut callback: F)
where
    F: FnMut(&[usize]),
{
    if k == 0 || k > items.len() {
        return;
    }

    let mut current = Vec::with_capacity(k);
    generate_combinations_recursive(items, k, 0, &mut current, &mut callback);
}

fn generate_combinations_recursive<F>(
    items: &[usize],
    k: usize,
    start: usize,
    current: &mut Vec<usize>,
    callback: &mut F,
) where
    F: FnMut(&[usize]),
{
    if current.len() == k {
        callback(current);
        return;
    }

    // not enough items left to fill the combination
    let remaining = k - current.len();
    for i in start..=items.len() - remaining {
        current.push(items[i]);
        generate_combinations_recursive(items, k, i + 1, current, callback);
        current.pop();
    }
}

/// Every (k+1)-combination of the items appearing anywhere in a level of k-itemsets.
pub fn universe_candidates(prev: &FrequentLevel) -> Vec<Vec<usize>> {
    let universe = prev.item_universe();
    let mut candidates = Vec::new();
    for_each_combination(&universe, prev.itemset_size + 1, |combination| {
        candidates.push(combination.to_vec())
    });
    candidates
}

/// Joins k-itemsets that share their first k-1 items and keeps a candidate only
/// when all of its k-subsets are in `prev`. Output is in lexicographic order.
pub fn prefix_join_candidates(prev: &FrequentLevel) -> Vec<Vec<usize>> {
    let prefix_len = prev.itemset_size - 1;

    let mut sorted: Vec<&[usize]> = prev.iter_itemsets().collect();
    sorted.sort_unstable();
    let known: HashSet<&[usize]> = sorted.iter().copied().collect();

    let mut candidates = Vec::new();
    for (i, left) in sorted.iter().enumerate() {
        for right in &sorted[i + 1..] {
            if left[..prefix_len] != right[..prefix_len] {
                break;
            }

            let mut candidate = left.to_vec();
            candidate.push(right[prefix_len]);

            if !has_infrequent_subset(&candidate, &known) {
                candidates.push(candidate);
            }
        }
    }
    candidates
}

fn has_infrequent_subset(candidate: &[usize], known: &HashSet<&[usize]>) -> bool {
    let mut subset = Vec::with_capacity(candidate.len() - 1);
    (0..candidate.len()).any(|skip| {
        subset.clear();
        subset.extend(
            candidate
                .iter()
                .enumerate()
                .filter(|&(idx, _)| idx != skip)
                .map(|(_, &item)| item),
        );
        !known.contains(subset.as_slice())
    })
}
