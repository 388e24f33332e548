//! Module that implements the fountain decoder.
use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::{
    chooser::FragmentChooser,
    common::{ChecksumError, crc32},
    config::DecoderConfig,
    primitives::{fragment_count, index_set::FragmentIndexes, part::Part},
    reducer::Reducer,
};

/// Parts needed on average relative to the fragment count, used for progress estimates.
const EXPECTED_OVERHEAD: f64 = 1.75;

/// Why a received part was not accepted.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    #[error("decoding already finished")]
    Finished,
    #[error("sequence number is zero")]
    ZeroSeqNum,
    #[error("part carries no data")]
    EmptyData,
    #[error("fragment count does not match message and fragment length")]
    InconsistentGeometry,
    #[error("fragment count exceeds the configured limit")]
    TooManyFragments,
    #[error("message length exceeds the configured limit")]
    MessageTooLong,
    #[error("header does not match the current session")]
    SessionMismatch,
}

/// Parameters captured from the first accepted part.
#[derive(Debug)]
struct Session {
    seq_len: usize,
    message_len: usize,
    checksum: u32,
    fragment_len: usize,
    chooser: FragmentChooser,
    reducer: Reducer,
}

impl Session {
    fn new(part: &Part) -> Self {
        debug!(
            seq_len = part.seq_len,
            message_len = part.message_len,
            checksum = part.checksum,
            fragment_len = part.data.len(),
            "Fountain decoding session started"
        );

        Self {
            seq_len: part.seq_len,
            message_len: part.message_len,
            checksum: part.checksum,
            fragment_len: part.data.len(),
            chooser: FragmentChooser::new(part.seq_len, part.checksum),
            reducer: Reducer::new(part.seq_len),
        }
    }

    fn matches(&self, part: &Part) -> bool {
        part.seq_len == self.seq_len
            && part.message_len == self.message_len
            && part.checksum == self.checksum
            && part.data.len() == self.fragment_len
    }
}

/// Fountain decoder.
///
/// Accepts parts of one message in any order, with loss and duplicates, until the message can be
/// reassembled. The outcome is final: once [`Decoder::result`] is set, further parts are ignored.
#[derive(Debug, Default)]
pub struct Decoder {
    config: DecoderConfig,
    session: Option<Session>,
    last_indexes: Option<FragmentIndexes>,
    processed_parts: usize,
    result: Option<Result<Bytes, ChecksumError>>,
}

impl Decoder {
    /// Creates a decoder that accepts any session an [`Encoder`](crate::Encoder) can produce.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a decoder with explicit limits.
    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config, ..Self::default() }
    }

    /// Receives a part. Returns `true` if the part was accepted for processing, which does not
    /// imply decoding has finished.
    ///
    /// Parts that conflict with the session established by the first accepted part, and all
    /// parts received after decoding finished, are ignored.
    pub fn receive_part(&mut self, part: &Part) -> bool {
        if let Err(reason) = self.validate(part) {
            debug!(seq_num = part.seq_num, %reason, "Rejected part");
            return false;
        }

        let session = self.session.get_or_insert_with(|| Session::new(part));
        let indexes = session.chooser.choose_fragments(part.seq_num);

        self.last_indexes = Some(indexes.clone());
        let complete = session.reducer.push(indexes, part.data.to_vec());
        self.processed_parts += 1;
        trace!(
            seq_num = part.seq_num,
            recovered = session.reducer.received().len(),
            mixed = session.reducer.mixed_count(),
            "Accepted part"
        );

        if complete {
            let message = session.reducer.join(session.message_len);
            let actual = crc32(&message);

            self.result = if actual == session.checksum {
                debug!(
                    message_len = message.len(),
                    processed_parts = self.processed_parts,
                    "Fountain decoding finished"
                );
                Some(Ok(message))
            } else {
                warn!(expected = session.checksum, actual, "Reassembled message failed checksum");
                Some(Err(ChecksumError { expected: session.checksum, actual }))
            };
        }

        true
    }

    fn validate(&self, part: &Part) -> Result<(), Rejection> {
        if self.result.is_some() {
            return Err(Rejection::Finished);
        }
        if part.seq_num == 0 {
            return Err(Rejection::ZeroSeqNum);
        }

        if let Some(session) = &self.session {
            return if session.matches(part) { Ok(()) } else { Err(Rejection::SessionMismatch) };
        }

        if part.data.is_empty() {
            return Err(Rejection::EmptyData);
        }
        if part.seq_len > self.config.max_fragment_count {
            return Err(Rejection::TooManyFragments);
        }
        if part.message_len > self.config.max_message_len {
            return Err(Rejection::MessageTooLong);
        }
        if part.seq_len != fragment_count(part.message_len, part.data.len()) {
            return Err(Rejection::InconsistentGeometry);
        }

        Ok(())
    }

    /// Returns the outcome, or `None` while decoding is still in progress.
    pub const fn result(&self) -> Option<&Result<Bytes, ChecksumError>> {
        self.result.as_ref()
    }

    /// Consumes the decoder and returns the outcome.
    pub fn into_result(self) -> Option<Result<Bytes, ChecksumError>> {
        self.result
    }

    /// Returns the decoded message if decoding succeeded.
    pub fn message(&self) -> Option<&Bytes> {
        self.result.as_ref().and_then(|result| result.as_ref().ok())
    }

    /// Returns `true` once decoding has finished, successfully or not.
    pub const fn is_complete(&self) -> bool {
        self.result.is_some()
    }

    /// Returns `true` if the message was decoded and passed its checksum.
    pub const fn is_success(&self) -> bool {
        matches!(self.result, Some(Ok(_)))
    }

    /// Returns `true` if the reassembled message failed its checksum.
    pub const fn is_failure(&self) -> bool {
        matches!(self.result, Some(Err(_)))
    }

    /// Returns the number of fragments, once known from the first accepted part.
    pub fn expected_fragment_count(&self) -> Option<usize> {
        self.session.as_ref().map(|session| session.seq_len)
    }

    /// Returns the indexes of the fragments recovered so far, in ascending order.
    pub fn received_fragment_indexes(&self) -> Vec<usize> {
        self.session.as_ref().map(|session| session.reducer.received().to_vec()).unwrap_or_default()
    }

    /// Returns the fragment indexes mixed into the last accepted part.
    pub const fn last_fragment_indexes(&self) -> Option<&FragmentIndexes> {
        self.last_indexes.as_ref()
    }

    /// Returns the number of accepted parts.
    pub const fn processed_parts_count(&self) -> usize {
        self.processed_parts
    }

    /// Returns a rough completion estimate in `[0, 1]`, for progress display only.
    pub fn estimated_percent_complete(&self) -> f64 {
        if self.result.is_some() {
            return 1.0;
        }
        let Some(session) = &self.session else {
            return 0.0;
        };

        let expected_parts = session.seq_len as f64 * EXPECTED_OVERHEAD;
        (self.processed_parts as f64 / expected_parts).min(0.99)
    }
}
