#![no_std]
#![forbid(unsafe_code)]
extern crate alloc;
use alloc::string::{String, ToString};

use log::{debug, info, warn};

use qrx_core::{QrxError, CONNECT_SCHEME, FAILED_ROUND_MS, ROUND_SENTINEL, ROUND_TIMEOUT_MS};
use qrx_hal::{ChunkDecoder, Transport};

pub mod event;
pub mod shared;
pub use event::{RoundSummary, SessionEvent};
pub use shared::SharedSession;

/// Where the scan handshake stands. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No transport yet. Only a connection string is meaningful.
    AwaitingConnection,
    /// Connected. Only the round sentinel is meaningful.
    AwaitingRoundStart,
    /// Every observed string is a chunk.
    Receiving,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub timeout_ms: u64,
    pub connect_scheme: String,
    pub round_sentinel: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: ROUND_TIMEOUT_MS,
            connect_scheme: CONNECT_SCHEME.to_string(),
            round_sentinel: ROUND_SENTINEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundStats {
    pub started: u32,
    pub completed: u32,
    pub timed_out: u32,
}

/// The scan-session state machine.
///
/// Fed one observed string at a time through [`ScanSession::handle`]; the
/// phase decides what a string means, never its shape alone. Every
/// adapter failure is turned into a [`SessionEvent`] here and nothing
/// propagates past `handle`.
pub struct ScanSession<T: Transport, D: ChunkDecoder> {
    transport: T,
    decoder: D,
    config: SessionConfig,
    phase: SessionPhase,
    stats: RoundStats,
}

impl<T: Transport, D: ChunkDecoder> ScanSession<T, D> {
    pub fn new(transport: T, decoder: D) -> Self {
        Self::with_config(transport, decoder, SessionConfig::default())
    }

    pub fn with_config(transport: T, decoder: D, config: SessionConfig) -> Self {
        info!("Scan session ready (timeout {}ms, sentinel {:?})", config.timeout_ms, config.round_sentinel);
        Self {
            transport,
            decoder,
            config,
            phase: SessionPhase::AwaitingConnection,
            stats: RoundStats::default(),
        }
    }

    pub fn phase(&self) -> SessionPhase { self.phase }
    pub fn stats(&self) -> RoundStats { self.stats }
    pub fn config(&self) -> &SessionConfig { &self.config }
    pub fn decoder(&self) -> &D { &self.decoder }
    pub fn transport(&self) -> &T { &self.transport }

    pub fn handle(&mut self, raw: &str) -> SessionEvent {
        match self.phase {
            SessionPhase::AwaitingConnection => self.on_connect_candidate(raw),
            SessionPhase::AwaitingRoundStart => self.on_round_candidate(raw),
            SessionPhase::Receiving => self.on_chunk(raw),
        }
    }

    fn on_connect_candidate(&mut self, raw: &str) -> SessionEvent {
        if !raw.starts_with(self.config.connect_scheme.as_str()) {
            return SessionEvent::Ignored;
        }
        info!("Got connection info {}", raw);

        match self.transport.connect(raw) {
            Ok(()) => {
                self.phase = SessionPhase::AwaitingRoundStart;
                info!("Connected. Waiting for round start.");
                SessionEvent::Connected { uri: raw.to_string() }
            }
            Err(error) => {
                warn!("Failed to connect: {}", error);
                SessionEvent::ConnectionFailed { error }
            }
        }
    }

    fn on_round_candidate(&mut self, raw: &str) -> SessionEvent {
        if raw != self.config.round_sentinel {
            return SessionEvent::Ignored;
        }

        if let Err(error) = self.transport.start_next() {
            warn!("Failed to send start-next: {}", error);
            return SessionEvent::RoundStartFailed { error };
        }
        self.decoder.reset();
        self.phase = SessionPhase::Receiving;
        self.stats.started += 1;
        info!("Round {} started", self.stats.started);
        SessionEvent::RoundStarted
    }

    fn on_chunk(&mut self, raw: &str) -> SessionEvent {
        let outcome = self.decoder.decode_chunk(raw);
        match &outcome {
            Err(e) if e.is_chunk_fault() => debug!("Decode chunk error: {}", e),
            Err(e) => warn!("Decoder failed: {}", e),
            Ok(()) => {}
        }

        // One reading serves both checks and the report.
        let elapsed_ms = self.decoder.total_time_ms();
        debug!("Round elapsed {}ms", elapsed_ms);

        // Timeout wins over completion on the same call.
        if elapsed_ms > self.config.timeout_ms {
            return self.finish_timed_out(elapsed_ms);
        }
        if self.decoder.is_completed() {
            return self.finish_completed(elapsed_ms);
        }

        let percent = self.decoder.progress();
        match outcome {
            Ok(()) => SessionEvent::Progress {
                percent,
                speed: self.decoder.speed(),
                read_interval_ms: self.decoder.read_interval_ms(),
            },
            Err(error) => SessionEvent::ChunkRejected { error, percent },
        }
    }

    fn finish_timed_out(&mut self, elapsed_ms: u64) -> SessionEvent {
        warn!("Round {} timed out after {}ms", self.stats.started, elapsed_ms);
        let report_error = self.report(FAILED_ROUND_MS);
        self.end_round();
        self.stats.timed_out += 1;
        SessionEvent::TimedOut { elapsed_ms, report_error }
    }

    fn finish_completed(&mut self, elapsed_ms: u64) -> SessionEvent {
        let summary = RoundSummary {
            size: self.decoder.total_size(),
            time: self.decoder.total_time(),
            speed: self.decoder.speed(),
            elapsed_ms,
        };
        info!("Read {} in {}! Speed: {}", summary.size, summary.time, summary.speed);
        let report_error = self.report(elapsed_ms);
        self.end_round();
        self.stats.completed += 1;
        SessionEvent::Completed { summary, report_error }
    }

    /// A failed report is surfaced but never keeps the round open.
    fn report(&mut self, elapsed_ms: u64) -> Option<QrxError> {
        match self.transport.send_result(elapsed_ms) {
            Ok(()) => None,
            Err(e) => {
                warn!("Failed to send result: {}", e);
                Some(e)
            }
        }
    }

    fn end_round(&mut self) {
        self.phase = SessionPhase::AwaitingRoundStart;
    }
}
