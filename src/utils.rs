#![cfg(test)]
use crate::collection::Collection;

/// `{a: 1, b: 2, c: 3}`
pub fn abc() -> Collection<i32> {
    [("a", 1), ("b", 2), ("c", 3)].into_iter().collect()
}

/// Pairs sorted by key, for comparisons that must ignore iteration order.
pub fn sorted_pairs<V: Ord>(pairs: impl IntoIterator<Item = (String, V)>) -> Vec<(String, V)> {
    let mut pairs: Vec<_> = pairs.into_iter().collect();
    pairs.sort();
    pairs
}
