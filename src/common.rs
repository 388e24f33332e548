use crc::{CRC_32_ISO_HDLC, Crc};
use thiserror::Error;

/// The CRC-32 used by zlib, gzip and IEEE 802.3.
const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Computes the CRC-32 checksum of `bytes`.
pub fn crc32(bytes: &[u8]) -> u32 {
    CRC32.checksum(bytes)
}

/// The reconstructed message does not match the checksum announced by its parts.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid checksum: expected {expected:#010x}, got {actual:#010x}")]
pub struct ChecksumError {
    /// Checksum carried by every part of the session.
    pub expected: u32,
    /// Checksum of the reassembled message.
    pub actual: u32,
}

/// Errors returned by the encoder.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// Every sequence number has been used and the policy forbids wrapping around.
    #[error("sequence numbers exhausted after {0} parts")]
    SequenceExhausted(u32),
}

/// Errors that can occur when decoding a part from its CBOR form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PartCodecError {
    /// The input is not well-formed CBOR.
    #[error("malformed CBOR: {0}")]
    Cbor(String),
    /// The CBOR item is followed by more data.
    #[error("{0} trailing bytes after part")]
    TrailingBytes(usize),
    /// The top-level item is not an array.
    #[error("part is not a CBOR array")]
    NotAnArray,
    /// The array does not have exactly five elements.
    #[error("part array has {0} elements, expected 5")]
    WrongArity(usize),
    /// A field has the wrong type or its value does not fit.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32() {
        assert_eq!(crc32(b"Wolf"), 0x598c84dc);
        assert_eq!(crc32(b""), 0);
    }

    #[test]
    fn test_checksum_error_display() {
        let error = ChecksumError { expected: 0x598c84dc, actual: 0x1 };
        assert_eq!(error.to_string(), "invalid checksum: expected 0x598c84dc, got 0x00000001");
    }
}
