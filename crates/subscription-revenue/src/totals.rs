//! Running totals keyed in first-seen order
//!
//! Category and monthly groupings are reported in the order keys are first
//! encountered, not sorted, so a plain `HashMap` won't do.

use std::collections::HashMap;
use std::hash::Hash;
use std::ops::AddAssign;

#[derive(Debug, Clone)]
pub struct OrderedTotals<K, V> {
    entries: Vec<(K, V)>,
    index: HashMap<K, usize>,
}

impl<K, V> Default for OrderedTotals<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K, V> OrderedTotals<K, V>
where
    K: Eq + Hash + Clone,
    V: AddAssign + Default + Copy,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to `key`, creating the group at zero on first sight
    pub fn add(&mut self, key: K, amount: V) {
        let slot = match self.index.get(&key) {
            Some(&slot) => slot,
            None => {
                self.entries.push((key.clone(), V::default()));
                self.index.insert(key, self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        self.entries[slot].1 += amount;
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.index.get(key).map(|&slot| self.entries[slot].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, V)> {
        self.entries.iter().map(|(k, v)| (k, *v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = V> + '_ {
        self.entries.iter().map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> OrderedTotals<K, V>
where
    K: Eq + Hash + Clone + Ord,
    V: AddAssign + Default + Copy,
{
    /// Entries sorted by key rather than first-seen order
    pub fn sorted(&self) -> Vec<(K, V)> {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_first_seen_order() {
        let mut totals = OrderedTotals::new();
        totals.add("b", 1.0);
        totals.add("a", 2.0);
        totals.add("b", 3.0);

        let keys: Vec<_> = totals.keys().copied().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(totals.get(&"b"), Some(4.0));
        assert_eq!(totals.get(&"c"), None);
    }

    #[test]
    fn test_sorted_orders_by_key() {
        let mut totals = OrderedTotals::new();
        totals.add(3u32, 1usize);
        totals.add(1, 1);
        totals.add(3, 1);

        assert_eq!(totals.sorted(), vec![(1, 1), (3, 2)]);
        let first_seen: Vec<_> = totals.iter().map(|(k, v)| (*k, v)).collect();
        assert_eq!(first_seen, vec![(3, 2), (1, 1)]);
    }
}
