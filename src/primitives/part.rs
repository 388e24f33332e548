//! The part exchanged between encoder and decoder, and its CBOR wire form.
use bytes::Bytes;
use ciborium::value::Value;

use crate::common::PartCodecError;

/// A part emitted by the encoder.
///
/// The header fields other than `seq_num` are identical across all parts of one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// The sequence number, starting at 1.
    pub seq_num: u32,
    /// The number of fragments the message was split into.
    pub seq_len: usize,
    /// The length of the original message in bytes.
    pub message_len: usize,
    /// CRC-32 of the original message.
    pub checksum: u32,
    /// A fragment, or the XOR of several fragments.
    pub data: Bytes,
}

impl Part {
    /// Returns `true` if this part carries a single original fragment verbatim.
    pub const fn is_simple(&self) -> bool {
        self.seq_num as usize <= self.seq_len
    }

    /// Returns the `"{seq_num}-{seq_len}"` label of the part.
    pub fn sequence_id(&self) -> String {
        format!("{}-{}", self.seq_num, self.seq_len)
    }

    /// Serializes the part as the CBOR array `[seq_num, seq_len, message_len, checksum, data]`.
    pub fn to_cbor(&self) -> Result<Vec<u8>, PartCodecError> {
        let value = Value::Array(vec![
            Value::Integer(self.seq_num.into()),
            Value::Integer((self.seq_len as u64).into()),
            Value::Integer((self.message_len as u64).into()),
            Value::Integer(self.checksum.into()),
            Value::Bytes(self.data.to_vec()),
        ]);

        let mut out = Vec::with_capacity(self.data.len() + 24);
        ciborium::ser::into_writer(&value, &mut out)
            .map_err(|e| PartCodecError::Cbor(e.to_string()))?;
        Ok(out)
    }

    /// Parses a part from its CBOR form. The input must hold exactly one five-element array of four
    /// unsigned integers followed by a byte string.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, PartCodecError> {
        let mut reader = bytes;
        let value: Value = ciborium::de::from_reader(&mut reader)
            .map_err(|e| PartCodecError::Cbor(e.to_string()))?;
        if !reader.is_empty() {
            return Err(PartCodecError::TrailingBytes(reader.len()));
        }

        let Value::Array(items) = value else {
            return Err(PartCodecError::NotAnArray);
        };
        let [seq_num, seq_len, message_len, checksum, data] =
            <[Value; 5]>::try_from(items).map_err(|items| PartCodecError::WrongArity(items.len()))?;

        let Value::Bytes(data) = data else {
            return Err(PartCodecError::InvalidField { field: "data", reason: "not a byte string" });
        };

        Ok(Self {
            seq_num: uint(seq_num, "seq_num")?,
            seq_len: uint(seq_len, "seq_len")?,
            message_len: uint(message_len, "message_len")?,
            checksum: uint(checksum, "checksum")?,
            data: data.into(),
        })
    }
}

/// Extracts an unsigned integer that fits in `T`.
fn uint<T: TryFrom<u64>>(value: Value, field: &'static str) -> Result<T, PartCodecError> {
    let Value::Integer(integer) = value else {
        return Err(PartCodecError::InvalidField { field, reason: "not an integer" });
    };
    let integer = u64::try_from(integer)
        .map_err(|_| PartCodecError::InvalidField { field, reason: "not an unsigned integer" })?;
    T::try_from(integer).map_err(|_| PartCodecError::InvalidField { field, reason: "out of range" })
}
