#![no_std]
#[cfg(feature = "std")]
extern crate std;

/// Scheme prefix that marks an observed string as the transport endpoint.
pub const CONNECT_SCHEME: &str = "ws://";

/// Reserved literal announcing the start of the next round.
pub const ROUND_SENTINEL: &str = "nextRound";

/// A round that runs longer than this is reported as a failure.
pub const ROUND_TIMEOUT_MS: u64 = 10_000;

/// Elapsed time reported to the peer when a round did not complete.
pub const FAILED_ROUND_MS: u64 = 0;

/// Largest payload a single round may carry (10KB).
pub const MAX_PAYLOAD: usize = 10240;

pub type QrxResult<T> = Result<T, QrxError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QrxError {
    // Transport
    InvalidUri,
    ConnectionFailed,
    NotConnected,
    TransportFailed,

    // Chunk decoding
    MalformedChunk,
    InconsistentChunk,
    ChunkOutOfBounds,
    PayloadTooLarge,

    InvalidState,
}

impl QrxError {
    /// True for errors raised while decoding a single chunk.
    /// These never end a round.
    pub fn is_chunk_fault(&self) -> bool {
        matches!(
            self,
            QrxError::MalformedChunk
                | QrxError::InconsistentChunk
                | QrxError::ChunkOutOfBounds
                | QrxError::PayloadTooLarge
        )
    }
}

impl core::fmt::Display for QrxError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            QrxError::InvalidUri => "connection string is not a valid endpoint",
            QrxError::ConnectionFailed => "could not connect to peer",
            QrxError::NotConnected => "transport is not connected",
            QrxError::TransportFailed => "peer did not accept the message",
            QrxError::MalformedChunk => "chunk header is malformed",
            QrxError::InconsistentChunk => "chunk belongs to a different payload",
            QrxError::ChunkOutOfBounds => "chunk lies outside the payload",
            QrxError::PayloadTooLarge => "payload exceeds the size limit",
            QrxError::InvalidState => "operation not valid in the current state",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for QrxError {}
