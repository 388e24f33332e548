//! Fountain code primitives: the generator, the sampler, fragment index sets, the part wire type
//! and the fragment geometry helpers.
pub mod index_set;
pub mod part;
pub mod sampler;
pub mod xoshiro;

use bytes::{Bytes, BytesMut};

/// Computes the fragment length for a message of `message_len` bytes.
///
/// The result is the length obtained from the smallest fragment count in
/// `1..=max(1, message_len / min_fragment_len)` whose fragments fit in `max_fragment_len` bytes.
/// If no count fits, the largest count is used. The length is never zero.
///
/// # Panics
///
/// Panics if `min_fragment_len` is zero or `max_fragment_len < min_fragment_len`.
pub fn fragment_len(message_len: usize, min_fragment_len: usize, max_fragment_len: usize) -> usize {
    assert!(min_fragment_len > 0, "minimum fragment length must be greater than zero");
    assert!(
        max_fragment_len >= min_fragment_len,
        "maximum fragment length must not be below the minimum"
    );

    let max_count = (message_len / min_fragment_len).max(1);
    // `ceil(len / count) <= max` holds exactly when `count >= ceil(len / max)`.
    let count = message_len.div_ceil(max_fragment_len).clamp(1, max_count);

    message_len.div_ceil(count).max(1)
}

/// Returns the number of fragments a message of `message_len` bytes is split into.
pub const fn fragment_count(message_len: usize, fragment_len: usize) -> usize {
    let count = message_len.div_ceil(fragment_len);
    if count == 0 { 1 } else { count }
}

/// Splits the message into equally sized fragments, zero-padding the last one.
///
/// An empty message yields a single all-zero fragment.
pub fn partition(message: &[u8], fragment_len: usize) -> Vec<Bytes> {
    let count = fragment_count(message.len(), fragment_len);

    let mut padded = BytesMut::with_capacity(count * fragment_len);
    padded.extend_from_slice(message);
    padded.resize(count * fragment_len, 0);

    let padded = padded.freeze();
    (0..count).map(|i| padded.slice(i * fragment_len..(i + 1) * fragment_len)).collect()
}

/// Concatenates fragments in order and drops the padding beyond `message_len`.
pub fn join<I>(fragments: I, message_len: usize) -> Bytes
where
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    let mut message = BytesMut::with_capacity(message_len);
    for fragment in fragments {
        message.extend_from_slice(fragment.as_ref());
    }

    debug_assert!(message.len() >= message_len, "fragments shorter than the message");
    message.truncate(message_len);
    message.freeze()
}

/// XORs `src` into `dst` byte by byte.
pub fn xor_into(dst: &mut [u8], src: &[u8]) {
    debug_assert_eq!(dst.len(), src.len());
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= s;
    }
}
