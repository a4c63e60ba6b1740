#![no_std]
#![forbid(unsafe_code)]

extern crate alloc;
use alloc::string::String;

use qrx_core::QrxResult;

/// The result-reporting link to the peer that animates the codes.
/// INVARIANT: Calls are synchronous. The session never calls in concurrently.
pub trait Transport: Send {
    /// Establish the connection named by an observed endpoint string.
    fn connect(&mut self, uri: &str) -> QrxResult<()>;

    /// Tell the peer we are ready; it starts animating the next round.
    fn start_next(&mut self) -> QrxResult<()>;

    /// Report the outcome of a round.
    /// `elapsed_ms == 0` means the round failed (timeout).
    fn send_result(&mut self, elapsed_ms: u64) -> QrxResult<()>;
}

/// The reassembly engine fed one chunk payload at a time.
///
/// Only `reset` and `decode_chunk` mutate. Everything else is a query
/// over the state accumulated since the last `reset`.
pub trait ChunkDecoder: Send {
    /// Drop all accumulated state. `progress()` reads 0 afterwards.
    fn reset(&mut self);

    fn decode_chunk(&mut self, payload: &str) -> QrxResult<()>;

    fn is_completed(&self) -> bool;

    /// Integer percent in `[0, 100]`.
    fn progress(&self) -> u8;

    /// Current throughput, already formatted for display.
    fn speed(&self) -> String;

    /// Milliseconds between the two most recent chunks.
    fn read_interval_ms(&self) -> u64;

    /// Milliseconds since the round clock started.
    fn total_time_ms(&self) -> u64;

    /// Size of the reconstructed payload. Meaningful once completed.
    fn total_size(&self) -> String;

    /// Duration of the round. Meaningful once completed.
    fn total_time(&self) -> String;
}

/// The Wall Clock.
pub trait PlatformClock: Send + Sync {
    fn now_ms(&self) -> u64;
}

impl<T: Transport + ?Sized> Transport for alloc::boxed::Box<T> {
    fn connect(&mut self, uri: &str) -> QrxResult<()> { (**self).connect(uri) }
    fn start_next(&mut self) -> QrxResult<()> { (**self).start_next() }
    fn send_result(&mut self, elapsed_ms: u64) -> QrxResult<()> { (**self).send_result(elapsed_ms) }
}

impl<D: ChunkDecoder + ?Sized> ChunkDecoder for alloc::boxed::Box<D> {
    fn reset(&mut self) { (**self).reset() }
    fn decode_chunk(&mut self, payload: &str) -> QrxResult<()> { (**self).decode_chunk(payload) }
    fn is_completed(&self) -> bool { (**self).is_completed() }
    fn progress(&self) -> u8 { (**self).progress() }
    fn speed(&self) -> String { (**self).speed() }
    fn read_interval_ms(&self) -> u64 { (**self).read_interval_ms() }
    fn total_time_ms(&self) -> u64 { (**self).total_time_ms() }
    fn total_size(&self) -> String { (**self).total_size() }
    fn total_time(&self) -> String { (**self).total_time() }
}
