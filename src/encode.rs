//! Module that implements the fountain encoder.
use std::ops::Range;

use bytes::{Bytes, BytesMut};
#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, trace};

use crate::{
    chooser::FragmentChooser,
    common::{EncodeError, crc32},
    config::{EncoderConfig, SeqNumPolicy},
    primitives::{fragment_len, part::Part, partition, xor_into},
};

/// Fountain encoder.
///
/// Splits a message into equally sized fragments and emits an unbounded stream of parts. The
/// first `fragment_count()` parts carry the fragments verbatim; later parts XOR a pseudo-random
/// selection of them together.
#[derive(Debug, Clone)]
pub struct Encoder {
    /// Length of the original message.
    message_len: usize,
    /// CRC-32 of the original message.
    checksum: u32,
    fragment_len: usize,
    /// The padded message, split into `fragment_len` sized views.
    fragments: Vec<Bytes>,
    /// Sequence number of the last emitted part.
    seq_num: u32,
    seq_num_policy: SeqNumPolicy,
    parts_emitted: u64,
    chooser: FragmentChooser,
}

impl Encoder {
    /// Creates an encoder with the given maximum fragment length and default settings otherwise.
    ///
    /// # Panics
    ///
    /// Panics if `max_fragment_len` is below the default minimum fragment length.
    pub fn new(message: impl AsRef<[u8]>, max_fragment_len: usize) -> Self {
        Self::with_config(message, EncoderConfig::new(max_fragment_len))
    }

    /// Creates an encoder with explicit settings.
    ///
    /// # Panics
    ///
    /// Panics if `config.min_fragment_len` is zero or `config.max_fragment_len` is below it.
    pub fn with_config(message: impl AsRef<[u8]>, config: EncoderConfig) -> Self {
        let message = message.as_ref();

        let fragment_len =
            fragment_len(message.len(), config.min_fragment_len, config.max_fragment_len);
        let fragments = partition(message, fragment_len);
        let checksum = crc32(message);

        debug!(
            message_len = message.len(),
            fragment_len,
            seq_len = fragments.len(),
            checksum,
            "Fountain encoder created"
        );

        Self {
            message_len: message.len(),
            checksum,
            fragment_len,
            chooser: FragmentChooser::new(fragments.len(), checksum),
            fragments,
            seq_num: config.first_seq_num,
            seq_num_policy: config.seq_num_policy,
            parts_emitted: 0,
        }
    }

    /// Returns the length of the original message.
    pub const fn message_len(&self) -> usize {
        self.message_len
    }

    /// Returns the CRC-32 of the original message.
    pub const fn checksum(&self) -> u32 {
        self.checksum
    }

    /// Returns the size of each fragment in bytes.
    pub const fn fragment_len(&self) -> usize {
        self.fragment_len
    }

    /// Returns the number of fragments the message was split into (`seq_len`).
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// Returns the sequence number of the last emitted part.
    pub const fn current_seq_num(&self) -> u32 {
        self.seq_num
    }

    /// Returns `true` once the sequence number has reached the fragment count, i.e. every
    /// fragment has been emitted verbatim at least once when counting started at zero.
    pub fn is_complete(&self) -> bool {
        self.seq_num as usize >= self.fragment_count()
    }

    /// Returns `true` if the message fits in a single fragment.
    pub fn is_single_part(&self) -> bool {
        self.fragment_count() == 1
    }

    /// Builds the part for an arbitrary sequence number without touching the encoder state.
    ///
    /// # Panics
    ///
    /// Panics if `seq_num` is zero.
    pub fn part_at(&self, seq_num: u32) -> Part {
        let indexes = self.chooser.choose_fragments(seq_num);
        trace!(seq_num, ?indexes, "Building part");

        let data = match indexes.single() {
            Some(index) => self.fragments[index].clone(),
            None => {
                let mut mixed = BytesMut::zeroed(self.fragment_len);
                for index in indexes.iter() {
                    xor_into(&mut mixed, &self.fragments[index]);
                }
                mixed.freeze()
            }
        };

        Part {
            seq_num,
            seq_len: self.fragment_count(),
            message_len: self.message_len,
            checksum: self.checksum,
            data,
        }
    }

    /// Emits the next part, or an error if the sequence numbers are exhausted under
    /// [`SeqNumPolicy::Cap`].
    ///
    /// # Panics
    ///
    /// Panics when called a second time on a single-part encoder: the one part is all a decoder
    /// ever needs.
    pub fn try_next_part(&mut self) -> Result<Part, EncodeError> {
        assert!(
            !(self.is_single_part() && self.parts_emitted > 0),
            "a single-part message must be emitted only once"
        );

        self.seq_num = match (self.seq_num.checked_add(1), self.seq_num_policy) {
            (Some(seq_num), _) => seq_num,
            (None, SeqNumPolicy::Wrap) => {
                debug!("Sequence number wrapped around");
                1
            }
            (None, SeqNumPolicy::Cap) => return Err(EncodeError::SequenceExhausted(u32::MAX)),
        };
        self.parts_emitted += 1;

        Ok(self.part_at(self.seq_num))
    }

    /// Emits the next part.
    ///
    /// # Panics
    ///
    /// Panics when called a second time on a single-part encoder, or when the sequence numbers
    /// are exhausted under [`SeqNumPolicy::Cap`].
    pub fn next_part(&mut self) -> Part {
        match self.try_next_part() {
            Ok(part) => part,
            Err(e) => panic!("{e}"),
        }
    }

    /// Builds the parts for a range of sequence numbers without touching the encoder state.
    ///
    /// # Panics
    ///
    /// Panics if the range contains zero.
    pub fn parts(&self, seq_nums: Range<u32>) -> Vec<Part> {
        #[cfg(feature = "parallel")]
        let parts = seq_nums.into_par_iter().map(|seq_num| self.part_at(seq_num)).collect();

        #[cfg(not(feature = "parallel"))]
        let parts = seq_nums.map(|seq_num| self.part_at(seq_num)).collect();

        parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::xoshiro::test_utils::make_message;

    #[test]
    fn test_encoder() {
        let message = make_message("Wolf", 256);
        let mut encoder = Encoder::new(&message, 30);

        assert_eq!(encoder.message_len(), 256);
        assert_eq!(encoder.fragment_len(), 29);
        assert_eq!(encoder.fragment_count(), 9);
        assert_eq!(encoder.checksum(), crc32(&message));

        for seq_num in 1..=20u32 {
            assert!(!encoder.is_complete() || seq_num > 9);
            let part = encoder.next_part();

            assert_eq!(part.seq_num, seq_num);
            assert_eq!(part.seq_len, 9);
            assert_eq!(part.message_len, 256);
            assert_eq!(part.checksum, encoder.checksum());
            assert_eq!(part.data.len(), 29);
            assert_eq!(encoder.current_seq_num(), seq_num);
        }
        assert!(encoder.is_complete());
    }

    #[test]
    fn test_simple_parts_carry_fragments() {
        let message = make_message("Wolf", 1024);
        let mut encoder = Encoder::new(&message, 100);

        let mut joined = Vec::new();
        for _ in 0..encoder.fragment_count() {
            joined.extend_from_slice(&encoder.next_part().data);
        }
        joined.truncate(message.len());

        assert_eq!(joined, message);
        assert!(encoder.is_complete());
    }

    #[test]
    fn test_mixed_part_is_xor_of_fragments() {
        let message = make_message("Wolf", 1024);
        let encoder = Encoder::new(&message, 100);

        // Sequence number 15 mixes fragments 1 and 5.
        let part = encoder.part_at(15);
        let mut expected = encoder.part_at(2).data.to_vec();
        xor_into(&mut expected, &encoder.part_at(6).data);

        assert_eq!(part.data, expected);
    }

    #[test]
    fn test_first_seq_num() {
        let config = EncoderConfig::new(1000).with_first_seq_num(100);
        let mut encoder = Encoder::with_config(make_message("Wolf", 32767), config);

        assert_eq!(encoder.next_part().seq_num, 101);
        assert_eq!(encoder.next_part().seq_num, 102);
    }

    #[test]
    fn test_single_part() {
        let mut encoder = Encoder::new(b"Wolf", 100);

        assert!(encoder.is_single_part());
        assert!(!encoder.is_complete());

        let part = encoder.next_part();
        assert_eq!(&part.data[..], b"Wolf");
        assert!(encoder.is_complete());
    }

    #[test]
    #[should_panic(expected = "emitted only once")]
    fn test_single_part_twice() {
        let mut encoder = Encoder::new(b"Wolf", 100);
        encoder.next_part();
        encoder.next_part();
    }

    #[test]
    fn test_empty_message() {
        let mut encoder = Encoder::new(b"", 100);

        assert_eq!(encoder.fragment_len(), 1);
        assert!(encoder.is_single_part());

        let part = encoder.next_part();
        assert_eq!(part.message_len, 0);
        assert_eq!(part.checksum, 0);
        assert_eq!(&part.data[..], &[0]);
    }

    #[test]
    fn test_wraparound() {
        let config = EncoderConfig::new(10).with_first_seq_num(u32::MAX - 1);
        let mut encoder = Encoder::with_config(make_message("Wolf", 100), config);

        assert_eq!(encoder.next_part().seq_num, u32::MAX);
        assert_eq!(encoder.next_part().seq_num, 1);
        assert_eq!(encoder.next_part().seq_num, 2);
    }

    #[test]
    fn test_cap() {
        let config = EncoderConfig::new(10)
            .with_first_seq_num(u32::MAX - 1)
            .with_seq_num_policy(SeqNumPolicy::Cap);
        let mut encoder = Encoder::with_config(make_message("Wolf", 100), config);

        assert_eq!(encoder.try_next_part().unwrap().seq_num, u32::MAX);
        assert_eq!(encoder.try_next_part(), Err(EncodeError::SequenceExhausted(u32::MAX)));
    }

    #[test]
    #[should_panic(expected = "sequence numbers exhausted")]
    fn test_cap_panics_in_next_part() {
        let config = EncoderConfig::new(10)
            .with_first_seq_num(u32::MAX)
            .with_seq_num_policy(SeqNumPolicy::Cap);
        Encoder::with_config(make_message("Wolf", 100), config).next_part();
    }

    #[test]
    fn test_parts_match_next_part() {
        let message = make_message("Wolf", 4000);
        let mut encoder = Encoder::new(&message, 100);

        let batch = encoder.parts(1..200);
        let sequential: Vec<Part> = (1..200).map(|_| encoder.next_part()).collect();

        assert_eq!(batch, sequential);
    }
}
