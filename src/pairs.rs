//! Unordered pair generation for round-robin comparisons.

/// Number of unordered pairs among `n` items, C(n, 2).
///
/// ```
/// assert_eq!(u_compare::pairs::pair_count(5), 10);
/// assert_eq!(u_compare::pairs::pair_count(1), 0);
/// ```
pub fn pair_count(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// Every unordered pair `(items[i], items[j])` with `i < j`, in
/// lexicographic index order. Each pair is produced exactly once.
///
/// ```
/// use u_compare::pairs::unordered_pairs;
///
/// let pairs: Vec<_> = unordered_pairs(&["a", "b", "c"]).collect();
/// assert_eq!(pairs, vec![(&"a", &"b"), (&"a", &"c"), (&"b", &"c")]);
/// ```
pub fn unordered_pairs<T>(items: &[T]) -> impl Iterator<Item = (&T, &T)> + '_ {
    items
        .iter()
        .enumerate()
        .flat_map(move |(i, a)| items[i + 1..].iter().map(move |b| (a, b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_matches_generator() {
        for n in 0..12 {
            let items: Vec<usize> = (0..n).collect();
            assert_eq!(unordered_pairs(&items).count(), pair_count(n));
        }
    }

    #[test]
    fn pairs_are_ordered_and_distinct() {
        let items = [1, 2, 3, 4, 5];
        let pairs: Vec<(i32, i32)> = unordered_pairs(&items).map(|(a, b)| (*a, *b)).collect();
        assert!(pairs.iter().all(|(a, b)| a < b));
        let mut dedup = pairs.clone();
        dedup.dedup();
        assert_eq!(dedup.len(), pairs.len());
    }

    #[test]
    fn empty_and_single() {
        assert_eq!(unordered_pairs::<u8>(&[]).count(), 0);
        assert_eq!(unordered_pairs(&[7]).count(), 0);
    }
}
