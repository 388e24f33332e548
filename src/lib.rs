//! # Fountain codes
//!
//! This library implements a Luby-transform fountain code. An [`Encoder`] splits a byte payload
//! into fragments and emits an unbounded stream of [`Part`]s, each either a fragment or the XOR of
//! several fragments. A [`Decoder`] reassembles the payload from any sufficient subset of parts,
//! in any order, and verifies it against the CRC-32 carried by every part.
//!
//! Which fragments a part mixes is derived from its sequence number by a deterministic
//! xoshiro256** generator, so both ends agree without transmitting the selection.

mod chooser;
mod common;
mod config;
pub mod decode;
pub mod encode;
pub mod primitives;
mod reducer;

pub use chooser::{DegreeChooser, FragmentChooser};
pub use common::{ChecksumError, EncodeError, PartCodecError, crc32};
pub use config::{
    DEFAULT_MAX_FRAGMENT_COUNT, DEFAULT_MAX_MESSAGE_LEN, DEFAULT_MIN_FRAGMENT_LEN, DecoderConfig,
    EncoderConfig, SeqNumPolicy,
};
pub use decode::Decoder;
pub use encode::Encoder;
pub use primitives::part::Part;
