//! Fixed-width bitset of fragment indexes.
use std::fmt;

const WORD_BITS: usize = u64::BITS as usize;

/// A set of fragment indexes in `0..capacity`, stored as a bitset.
///
/// Two sets built for the same fragment count compare, hash and order by their bits, which makes
/// them usable as map keys during elimination.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FragmentIndexes {
    words: Vec<u64>,
    capacity: usize,
}

impl FragmentIndexes {
    /// Creates an empty set able to hold indexes in `0..capacity`.
    pub fn empty(capacity: usize) -> Self {
        Self { words: vec![0; capacity.div_ceil(WORD_BITS)], capacity }
    }

    /// Creates a set containing every index in `0..capacity`.
    pub fn full(capacity: usize) -> Self {
        let mut set = Self::empty(capacity);
        for word in &mut set.words {
            *word = u64::MAX;
        }
        let tail = capacity % WORD_BITS;
        if tail != 0
            && let Some(last) = set.words.last_mut()
        {
            *last = (1u64 << tail) - 1;
        }
        set
    }

    /// Creates a set holding a single index.
    pub fn singleton(capacity: usize, index: usize) -> Self {
        let mut set = Self::empty(capacity);
        set.insert(index);
        set
    }

    /// Creates a set from an iterator of indexes.
    pub fn from_indexes(capacity: usize, indexes: impl IntoIterator<Item = usize>) -> Self {
        let mut set = Self::empty(capacity);
        for index in indexes {
            set.insert(index);
        }
        set
    }

    /// Returns the largest index plus one this set can hold.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Inserts an index. Returns `true` if it was not present before.
    ///
    /// # Panics
    ///
    /// Panics if `index >= capacity`.
    pub fn insert(&mut self, index: usize) -> bool {
        assert!(index < self.capacity, "index {index} out of range for {}", self.capacity);
        let (word, bit) = (index / WORD_BITS, index % WORD_BITS);
        let was_set = self.words[word] & (1 << bit) != 0;
        self.words[word] |= 1 << bit;
        !was_set
    }

    /// Removes an index. Returns `true` if it was present.
    pub fn remove(&mut self, index: usize) -> bool {
        if !self.contains(index) {
            return false;
        }
        self.words[index / WORD_BITS] &= !(1 << (index % WORD_BITS));
        true
    }

    /// Returns `true` if `index` is in the set.
    pub fn contains(&self, index: usize) -> bool {
        index < self.capacity && self.words[index / WORD_BITS] & (1 << (index % WORD_BITS)) != 0
    }

    /// Returns the number of indexes in the set.
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Returns `true` if the set holds no index.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Returns the index if the set holds exactly one.
    pub fn single(&self) -> Option<usize> {
        if self.len() != 1 {
            return None;
        }
        self.iter().next()
    }

    /// Returns `true` if every index of `self` is in `other` and the sets differ.
    pub fn is_proper_subset(&self, other: &Self) -> bool {
        self.capacity == other.capacity
            && self != other
            && self.words.iter().zip(&other.words).all(|(a, b)| a & !b == 0)
    }

    /// Removes every index of `other` from `self`.
    pub fn subtract(&mut self, other: &Self) {
        for (a, b) in self.words.iter_mut().zip(&other.words) {
            *a &= !b;
        }
    }

    /// Iterates over the indexes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            let mut bits = word;
            std::iter::from_fn(move || {
                if bits == 0 {
                    return None;
                }
                let bit = bits.trailing_zeros() as usize;
                bits &= bits - 1;
                Some(i * WORD_BITS + bit)
            })
        })
    }

    /// Collects the indexes in ascending order.
    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }
}

impl fmt::Debug for FragmentIndexes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_full_masks_tail() {
        for capacity in [1, 5, 63, 64, 65, 130] {
            let full = FragmentIndexes::full(capacity);
            assert_eq!(full.len(), capacity);
            assert_eq!(full.to_vec(), (0..capacity).collect::<Vec<_>>());
        }
        assert!(FragmentIndexes::full(0).is_empty());
    }

    #[test]
    fn test_single() {
        let set = FragmentIndexes::singleton(100, 70);
        assert_eq!(set.single(), Some(70));
        assert_eq!(FragmentIndexes::from_indexes(100, [1, 70]).single(), None);
        assert_eq!(FragmentIndexes::empty(100).single(), None);
    }

    #[test]
    fn test_proper_subset() {
        let a = FragmentIndexes::from_indexes(10, [2, 5]);
        let b = FragmentIndexes::from_indexes(10, [2, 5, 9]);

        assert!(a.is_proper_subset(&b));
        assert!(!b.is_proper_subset(&a));
        assert!(!a.is_proper_subset(&a.clone()));
        assert!(!FragmentIndexes::from_indexes(10, [3]).is_proper_subset(&b));
    }

    #[test]
    fn test_insert_reports_novelty() {
        let mut set = FragmentIndexes::empty(8);
        assert!(set.insert(3));
        assert!(!set.insert(3));
        assert!(set.contains(3));
        assert!(!set.contains(8));

        assert!(set.remove(3));
        assert!(!set.remove(3));
        assert!(set.is_empty());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_insert_out_of_range() {
        FragmentIndexes::empty(8).insert(8);
    }

    proptest! {

        #[test]
        fn test_matches_btreeset(
            capacity in 1usize..300,
            raw_a in prop::collection::vec(any::<usize>(), 0..40),
            raw_b in prop::collection::vec(any::<usize>(), 0..40),
        ) {
            let a_ref: BTreeSet<usize> = raw_a.iter().map(|i| i % capacity).collect();
            let b_ref: BTreeSet<usize> = raw_b.iter().map(|i| i % capacity).collect();
            let a = FragmentIndexes::from_indexes(capacity, a_ref.iter().copied());
            let b = FragmentIndexes::from_indexes(capacity, b_ref.iter().copied());

            prop_assert_eq!(a.len(), a_ref.len());
            prop_assert_eq!(a.to_vec(), a_ref.iter().copied().collect::<Vec<_>>());
            prop_assert_eq!(
                a.is_proper_subset(&b),
                a_ref.is_subset(&b_ref) && a_ref != b_ref
            );

            let mut diff = a.clone();
            diff.subtract(&b);
            prop_assert_eq!(diff.to_vec(), a_ref.difference(&b_ref).copied().collect::<Vec<_>>());
        }
    }
}
