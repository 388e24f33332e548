//! Module that implements the deterministic xoshiro256** generator used to pick fragments.
//!
//! Every randomized decision in the fountain code is derived from this generator. Encoders and
//! decoders must agree on every drawn value, so the algorithm, the seeding procedure and the
//! integer/float conversions are fixed and must never change.
use std::ops::Range;

use rand::RngCore;
use sha2::{Digest, Sha256};

/// 2^64 as a float, the divisor that maps a `u64` draw onto the unit interval.
const TWO_POW_64: f64 = u64::MAX as f64 + 1.0;

/// A xoshiro256** pseudo-random number generator.
///
/// The generator is seeded by hashing an arbitrary byte string with SHA-256 and interpreting the
/// 32-byte digest as four big-endian 64-bit words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Xoshiro256 {
    s: [u64; 4],
}

impl Xoshiro256 {
    /// Creates a generator from an explicit internal state.
    pub const fn from_state(s: [u64; 4]) -> Self {
        Self { s }
    }

    /// Returns the next 64-bit word.
    #[allow(clippy::should_implement_trait)]
    pub const fn next(&mut self) -> u64 {
        let result = self.s[1].wrapping_mul(5).rotate_left(7).wrapping_mul(9);
        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Returns `next() / 2^64` as a double in `[0, 1]`.
    ///
    /// Draws within 2^10 of `u64::MAX` round up to exactly `1.0` in the conversion.
    pub fn next_double(&mut self) -> f64 {
        self.next() as f64 / TWO_POW_64
    }

    /// Returns an integer in `range`, computed as `floor(next_double() * len) + start` and clamped
    /// to the last element of the range.
    ///
    /// # Panics
    ///
    /// Panics if the range is empty.
    pub fn next_int(&mut self, range: Range<u64>) -> u64 {
        assert!(range.start < range.end, "cannot draw from an empty range");
        let size = (range.end - range.start) as f64;
        ((self.next_double() * size) as u64 + range.start).min(range.end - 1)
    }

    /// Returns `count` pseudo-random bytes, one draw per byte.
    pub fn next_bytes(&mut self, count: usize) -> Vec<u8> {
        (0..count).map(|_| self.next_int(0..256) as u8).collect()
    }
}

impl From<&[u8]> for Xoshiro256 {
    fn from(seed: &[u8]) -> Self {
        let digest = Sha256::digest(seed);

        let mut s = [0u64; 4];
        for (word, bytes) in s.iter_mut().zip(digest.chunks_exact(8)) {
            let mut be = [0u8; 8];
            be.copy_from_slice(bytes);
            *word = u64::from_be_bytes(be);
        }

        Self { s }
    }
}

impl From<&str> for Xoshiro256 {
    fn from(seed: &str) -> Self {
        Self::from(seed.as_bytes())
    }
}

impl RngCore for Xoshiro256 {
    fn next_u32(&mut self) -> u32 {
        // The upper bits of xoshiro output have the best statistical quality.
        (self.next() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.next()
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(8) {
            let word = self.next().to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
    }
}


#[cfg(test)]
mod tests {
    use rand::{Rng, seq::SliceRandom};

    use super::{test_utils::TOP_DRAW_S1, *};

    #[test]
    fn test_wolf_reference_sequence() {
        let mut rng = Xoshiro256::from("Wolf");
        let numbers: Vec<u64> = (0..10).map(|_| rng.next() % 100).collect();

        assert_eq!(numbers, [42, 81, 85, 8, 82, 84, 76, 73, 70, 88]);
    }

    #[test]
    fn test_seed_is_big_endian_digest() {
        let digest = Sha256::digest(b"Wolf");
        let rng = Xoshiro256::from("Wolf");

        let first = u64::from_be_bytes(digest[..8].try_into().unwrap());
        assert_eq!(rng.s[0], first);
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = Xoshiro256::from(&[1u8, 2, 3, 4][..]);
        let mut b = Xoshiro256::from(&[1u8, 2, 3, 4][..]);

        for _ in 0..1000 {
            assert_eq!(a.next(), b.next());
        }
    }

    #[test]
    fn test_next_int_stays_in_range() {
        let mut rng = Xoshiro256::from("range");

        for _ in 0..10_000 {
            let n = rng.next_int(5..17);
            assert!((5..17).contains(&n));
        }

        // A single-value range always yields its only element.
        assert_eq!(rng.next_int(9..10), 9);
    }

    #[test]
    #[should_panic(expected = "empty range")]
    fn test_next_int_empty_range() {
        Xoshiro256::from("Wolf").next_int(3..3);
    }

    #[test]
    fn test_next_double_unit_interval() {
        let mut rng = Xoshiro256::from("double");

        for _ in 0..10_000 {
            let d = rng.next_double();
            assert!((0.0..=1.0).contains(&d));
        }
    }

    #[test]
    fn test_top_draw_stays_in_range() {
        let state = [0, TOP_DRAW_S1, 0, 0];
        assert_eq!(Xoshiro256::from_state(state).next(), u64::MAX);

        // u64::MAX rounds up to 2^64 as a double.
        assert_eq!(Xoshiro256::from_state(state).next_double(), 1.0);
        assert_eq!(Xoshiro256::from_state(state).next_int(0..5), 4);
        assert_eq!(Xoshiro256::from_state(state).next_int(7..8), 7);
    }

    #[test]
    fn test_rng_core_drives_rand_apis() {
        let mut a = Xoshiro256::from("Wolf");
        let mut b = Xoshiro256::from("Wolf");

        let mut left: Vec<u32> = (0..32).collect();
        let mut right = left.clone();
        left.shuffle(&mut a);
        right.shuffle(&mut b);
        assert_eq!(left, right);

        let x: u8 = a.random_range(0..10);
        assert!(x < 10);

        let mut buf = [0u8; 13];
        a.fill_bytes(&mut buf);
        assert!(buf.iter().any(|&b| b != 0));
    }
}
