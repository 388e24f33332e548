//! Module that decides which fragments are mixed into each part.
//!
//! Both sides of a transfer run the same chooser: the encoder to build a part, and the decoder to
//! learn what a received part contains. Only `seq_num`, `seq_len` and `checksum` travel with the
//! part, so the mapping must be a pure function of those three values.
use crate::primitives::{index_set::FragmentIndexes, sampler::WeightedSampler, xoshiro::Xoshiro256};

/// Picks how many fragments a mixed part combines.
///
/// Degree `d` in `1..=seq_len` is drawn with probability proportional to `1/d`.
#[derive(Debug, Clone)]
pub struct DegreeChooser {
    sampler: WeightedSampler,
}

impl DegreeChooser {
    /// Creates a chooser for a message of `seq_len` fragments.
    ///
    /// # Panics
    ///
    /// Panics if `seq_len` is zero.
    pub fn new(seq_len: usize) -> Self {
        let weights: Vec<f64> = (1..=seq_len).map(|d| 1.0 / d as f64).collect();
        Self { sampler: WeightedSampler::new(&weights) }
    }

    /// Draws a degree in `1..=seq_len`.
    pub fn choose_degree(&self, rng: &mut Xoshiro256) -> usize {
        self.sampler.sample(rng) + 1
    }
}

/// Maps sequence numbers to the set of fragment indexes a part mixes.
#[derive(Debug, Clone)]
pub struct FragmentChooser {
    seq_len: usize,
    checksum: u32,
    degrees: DegreeChooser,
}

impl FragmentChooser {
    /// Creates a chooser for the message with the given fragment count and checksum.
    ///
    /// # Panics
    ///
    /// Panics if `seq_len` is zero.
    pub fn new(seq_len: usize, checksum: u32) -> Self {
        Self { seq_len, checksum, degrees: DegreeChooser::new(seq_len) }
    }

    /// Returns the number of fragments.
    pub const fn seq_len(&self) -> usize {
        self.seq_len
    }

    /// Returns the fragment indexes mixed into the part with sequence number `seq_num`.
    ///
    /// The first `seq_len` sequence numbers map to the single fragment `seq_num - 1`. Beyond that,
    /// a generator seeded from `seq_num` and the checksum picks a degree and then that many
    /// distinct fragments.
    ///
    /// # Panics
    ///
    /// Panics if `seq_num` is zero.
    pub fn choose_fragments(&self, seq_num: u32) -> FragmentIndexes {
        assert!(seq_num > 0, "sequence numbers start at 1");

        if seq_num as usize <= self.seq_len {
            return FragmentIndexes::singleton(self.seq_len, seq_num as usize - 1);
        }

        let mut rng = Xoshiro256::from(&seed(seq_num, self.checksum)[..]);
        let degree = self.degrees.choose_degree(&mut rng);

        let mut remaining: Vec<usize> = (0..self.seq_len).collect();
        let chosen = shuffle_indexes(&mut rng, &mut remaining, degree);

        FragmentIndexes::from_indexes(self.seq_len, chosen)
    }
}

/// Derives the generator seed for a mixed part: `seq_num ++ checksum`, both big-endian.
fn seed(seq_num: u32, checksum: u32) -> [u8; 8] {
    let mut seed = [0u8; 8];
    seed[..4].copy_from_slice(&seq_num.to_be_bytes());
    seed[4..].copy_from_slice(&checksum.to_be_bytes());
    seed
}

/// Draws `count` items from `items` without replacement, in draw order.
///
/// Drawn items are removed with an order-preserving shift, which is what keeps the draw sequence
/// identical to other implementations.
fn shuffle_indexes(rng: &mut Xoshiro256, items: &mut Vec<usize>, count: usize) -> Vec<usize> {
    debug_assert!(count <= items.len());

    let mut shuffled = Vec::with_capacity(count);
    while shuffled.len() < count {
        let index = rng.next_int(0..items.len() as u64) as usize;
        shuffled.push(items.remove(index));
    }
    shuffled
}
