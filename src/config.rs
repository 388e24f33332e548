//! Encoder and decoder settings.

/// Default lower bound on the fragment length.
pub const DEFAULT_MIN_FRAGMENT_LEN: usize = 10;

/// Fragment count limit of [`DecoderConfig::bounded`].
pub const DEFAULT_MAX_FRAGMENT_COUNT: usize = 1 << 16;

/// Message length limit of [`DecoderConfig::bounded`] (64 MiB).
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 64 * 1024 * 1024;

/// What the encoder does once the sequence number reaches `u32::MAX`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeqNumPolicy {
    /// Continue at 1. Sequence number 0 is never emitted.
    #[default]
    Wrap,
    /// Stop after `u32::MAX` parts.
    Cap,
}

/// Encoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Upper bound on the fragment length.
    pub max_fragment_len: usize,
    /// Lower bound on the fragment length. Caps the number of fragments at
    /// `message_len / min_fragment_len`.
    pub min_fragment_len: usize,
    /// Sequence number of the part emitted before the first one, so the first part carries
    /// `first_seq_num + 1`.
    pub first_seq_num: u32,
    /// Behaviour at the end of the sequence number space.
    pub seq_num_policy: SeqNumPolicy,
}

impl EncoderConfig {
    /// Creates a config with the given maximum fragment length and defaults for everything else.
    pub const fn new(max_fragment_len: usize) -> Self {
        Self {
            max_fragment_len,
            min_fragment_len: DEFAULT_MIN_FRAGMENT_LEN,
            first_seq_num: 0,
            seq_num_policy: SeqNumPolicy::Wrap,
        }
    }

    /// Sets the minimum fragment length.
    pub const fn with_min_fragment_len(mut self, min_fragment_len: usize) -> Self {
        self.min_fragment_len = min_fragment_len;
        self
    }

    /// Sets the sequence number the encoder starts counting from.
    pub const fn with_first_seq_num(mut self, first_seq_num: u32) -> Self {
        self.first_seq_num = first_seq_num;
        self
    }

    /// Sets the sequence number policy.
    pub const fn with_seq_num_policy(mut self, seq_num_policy: SeqNumPolicy) -> Self {
        self.seq_num_policy = seq_num_policy;
        self
    }
}

impl Default for EncoderConfig {
    /// No upper bound: the message becomes a single fragment.
    fn default() -> Self {
        Self::new(usize::MAX)
    }
}

impl From<Option<usize>> for EncoderConfig {
    fn from(max_fragment_len: Option<usize>) -> Self {
        max_fragment_len.map(Self::new).unwrap_or_default()
    }
}

/// Decoder limits on the session parameters taken from the first part.
///
/// The default accepts everything an [`crate::Encoder`] can produce. Decoders fed from untrusted
/// channels should opt into [`DecoderConfig::bounded`] or their own limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Largest accepted `seq_len`.
    pub max_fragment_count: usize,
    /// Largest accepted `message_len`.
    pub max_message_len: usize,
}

impl DecoderConfig {
    /// No limits.
    pub const fn unbounded() -> Self {
        Self { max_fragment_count: usize::MAX, max_message_len: usize::MAX }
    }

    /// At most [`DEFAULT_MAX_FRAGMENT_COUNT`] fragments and [`DEFAULT_MAX_MESSAGE_LEN`] bytes.
    pub const fn bounded() -> Self {
        Self {
            max_fragment_count: DEFAULT_MAX_FRAGMENT_COUNT,
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
        }
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = EncoderConfig::new(1000)
            .with_min_fragment_len(20)
            .with_first_seq_num(100)
            .with_seq_num_policy(SeqNumPolicy::Cap);

        assert_eq!(config.max_fragment_len, 1000);
        assert_eq!(config.min_fragment_len, 20);
        assert_eq!(config.first_seq_num, 100);
        assert_eq!(config.seq_num_policy, SeqNumPolicy::Cap);
    }

    #[test]
    fn test_optional_max() {
        assert_eq!(EncoderConfig::from(Some(30)), EncoderConfig::new(30));
        assert_eq!(EncoderConfig::from(None).max_fragment_len, usize::MAX);
        assert_eq!(EncoderConfig::default().min_fragment_len, DEFAULT_MIN_FRAGMENT_LEN);
    }

    #[test]
    fn test_decoder_limits_are_opt_in() {
        assert_eq!(DecoderConfig::default(), DecoderConfig::unbounded());
        assert_eq!(DecoderConfig::bounded().max_fragment_count, DEFAULT_MAX_FRAGMENT_COUNT);
        assert_eq!(DecoderConfig::bounded().max_message_len, DEFAULT_MAX_MESSAGE_LEN);
    }
}
