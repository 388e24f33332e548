//! Module that implements the online GF(2) elimination behind the decoder.
use std::collections::{BTreeMap, VecDeque};

use bytes::Bytes;
use tracing::trace;

use crate::primitives::{index_set::FragmentIndexes, join, xor_into};

/// A part in the decoder's working set: the XOR of the fragments named by `indexes`.
#[derive(Debug, Clone)]
struct Equation {
    indexes: FragmentIndexes,
    data: Vec<u8>,
}

impl Equation {
    /// Eliminates `other` from `self` if its fragments are a proper subset of ours.
    fn reduce_by(&mut self, other_indexes: &FragmentIndexes, other_data: &[u8]) {
        if other_indexes.is_proper_subset(&self.indexes) {
            self.indexes.subtract(other_indexes);
            xor_into(&mut self.data, other_data);
        }
    }

    /// Eliminates the known fragment `index` from `self`.
    fn reduce_by_fragment(&mut self, index: usize, fragment: &[u8]) {
        if self.indexes.len() > 1 && self.indexes.remove(index) {
            xor_into(&mut self.data, fragment);
        }
    }
}

/// Online elimination over GF(2) of received parts.
///
/// Recovered fragments are kept by index; parts that still mix several unknown fragments are kept
/// by their index set. Every new fact is propagated through an explicit work queue.
#[derive(Debug)]
pub(crate) struct Reducer {
    /// The number of original fragments.
    fragment_count: usize,
    /// Recovered fragments by index.
    simple: BTreeMap<usize, Vec<u8>>,
    /// Parts mixing more than one unknown fragment.
    mixed: BTreeMap<FragmentIndexes, Vec<u8>>,
    /// The indexes in `simple`.
    received: FragmentIndexes,
    queue: VecDeque<Equation>,
}

impl Reducer {
    pub(crate) fn new(fragment_count: usize) -> Self {
        Self {
            fragment_count,
            simple: BTreeMap::new(),
            mixed: BTreeMap::new(),
            received: FragmentIndexes::empty(fragment_count),
            queue: VecDeque::new(),
        }
    }

    /// Pushes a part mixing the fragments in `indexes`. Returns `true` once every fragment is
    /// known.
    pub(crate) fn push(&mut self, indexes: FragmentIndexes, data: Vec<u8>) -> bool {
        self.queue.push_back(Equation { indexes, data });

        while let Some(equation) = self.queue.pop_front() {
            if equation.indexes.len() == 1 {
                self.process_simple(equation);
                if self.can_decode() {
                    self.queue.clear();
                    return true;
                }
            } else {
                self.process_mixed(equation);
            }
        }

        false
    }

    fn process_simple(&mut self, equation: Equation) {
        let Some(index) = equation.indexes.single() else {
            return;
        };
        if !self.received.insert(index) {
            trace!(index, "Duplicate fragment");
            return;
        }
        trace!(index, "Recovered fragment");

        if !self.can_decode() {
            self.reduce_mixed_by(&equation);
        }
        self.simple.insert(index, equation.data);
    }

    fn process_mixed(&mut self, mut equation: Equation) {
        if self.mixed.contains_key(&equation.indexes) {
            trace!(indexes = ?equation.indexes, "Duplicate mixed part");
            return;
        }

        for (&index, fragment) in &self.simple {
            equation.reduce_by_fragment(index, fragment);
        }
        for (indexes, data) in &self.mixed {
            equation.reduce_by(indexes, data);
        }

        if equation.indexes.len() == 1 {
            self.queue.push_back(equation);
        } else {
            self.reduce_mixed_by(&equation);
            trace!(indexes = ?equation.indexes, "Stored mixed part");
            self.mixed.insert(equation.indexes, equation.data);
        }
    }

    /// Reduces every stored mixed part by `by`, queueing those that become simple.
    fn reduce_mixed_by(&mut self, by: &Equation) {
        for (indexes, data) in std::mem::take(&mut self.mixed) {
            let mut equation = Equation { indexes, data };
            equation.reduce_by(&by.indexes, &by.data);

            if equation.indexes.len() == 1 {
                self.queue.push_back(equation);
            } else {
                self.mixed.entry(equation.indexes).or_insert(equation.data);
            }
        }
    }

    /// Returns true if every fragment has been recovered.
    pub(crate) fn can_decode(&self) -> bool {
        self.received.len() == self.fragment_count
    }

    /// Returns the recovered fragment indexes in ascending order.
    pub(crate) fn received(&self) -> &FragmentIndexes {
        &self.received
    }

    /// Returns the number of stored mixed parts.
    pub(crate) fn mixed_count(&self) -> usize {
        self.mixed.len()
    }

    /// Concatenates the recovered fragments and strips the padding.
    pub(crate) fn join(&self, message_len: usize) -> Bytes {
        debug_assert!(self.can_decode());
        join(self.simple.values(), message_len)
    }
}
