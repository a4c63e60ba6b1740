use alloc::string::String;
use core::fmt;

use qrx_core::QrxError;

/// What a finished round looked like, in display form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSummary {
    pub size: String,
    pub time: String,
    pub speed: String,
    pub elapsed_ms: u64,
}

/// Outcome of feeding one observed string to the session.
/// The only surface a UI layer needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Noise for the current phase. Nothing changed.
    Ignored,
    Connected { uri: String },
    ConnectionFailed { error: QrxError },
    RoundStarted,
    RoundStartFailed { error: QrxError },
    /// A chunk was accepted and the round goes on.
    Progress { percent: u8, speed: String, read_interval_ms: u64 },
    /// A chunk failed to decode. The round goes on.
    ChunkRejected { error: QrxError, percent: u8 },
    /// The round ran out of time. `report_error` is set when the
    /// failure report could not be delivered.
    TimedOut { elapsed_ms: u64, report_error: Option<QrxError> },
    Completed { summary: RoundSummary, report_error: Option<QrxError> },
}

impl SessionEvent {
    pub fn ends_round(&self) -> bool {
        matches!(self, SessionEvent::TimedOut { .. } | SessionEvent::Completed { .. })
    }

    /// True when an operation failed and the caller should surface it.
    pub fn is_failure(&self) -> bool {
        match self {
            SessionEvent::ConnectionFailed { .. }
            | SessionEvent::RoundStartFailed { .. }
            | SessionEvent::TimedOut { .. } => true,
            // Camera noise is expected; anything else means the decoder broke.
            SessionEvent::ChunkRejected { error, .. } => !error.is_chunk_fault(),
            SessionEvent::Completed { report_error, .. } => report_error.is_some(),
            _ => false,
        }
    }
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionEvent::Ignored => f.write_str("Waiting for new QR scan"),
            SessionEvent::Connected { uri } => write!(f, "Connected to {}", uri),
            SessionEvent::ConnectionFailed { error } => write!(f, "Connect failed: {}", error),
            SessionEvent::RoundStarted => f.write_str("Round started"),
            SessionEvent::RoundStartFailed { error } => write!(f, "Round start failed: {}", error),
            SessionEvent::Progress { percent, speed, read_interval_ms } => {
                write!(f, "{:02}% [{}] ({}ms)", percent, speed, read_interval_ms)
            }
            SessionEvent::ChunkRejected { error, percent } => {
                write!(f, "{:02}% (chunk rejected: {})", percent, error)
            }
            SessionEvent::TimedOut { report_error, .. } => {
                f.write_str("Timeout!")?;
                write_report_error(f, report_error)
            }
            SessionEvent::Completed { summary, report_error } => {
                write!(f, "Read {} in {}! Speed: {}", summary.size, summary.time, summary.speed)?;
                write_report_error(f, report_error)
            }
        }
    }
}

fn write_report_error(f: &mut fmt::Formatter<'_>, report_error: &Option<QrxError>) -> fmt::Result {
    match report_error {
        Some(e) => write!(f, " (result not sent: {})", e),
        None => Ok(()),
    }
}
