use log::debug;
use zeroize::Zeroize;

use qrx_core::{QrxError, QrxResult, MAX_PAYLOAD};
use qrx_hal::{ChunkDecoder, PlatformClock};

use crate::format::{format_bytes, format_duration, format_speed};

/// Reassembles a payload from `<offset>/<total>|<data>` chunks.
///
/// Chunks may arrive in any order, any number of times. Progress counts
/// distinct bytes covered, so re-scanned codes never inflate it.
pub struct ChunkAssembler<C: PlatformClock> {
    clock: C,

    buffer: Vec<u8>,
    filled: Vec<bool>,
    filled_count: usize,
    expected_len: usize,

    // Data bytes of accepted chunks this round, duplicates included.
    bytes_ingested: u64,
    started_at_ms: Option<u64>,
    last_chunk_ms: Option<u64>,
    read_interval_ms: u64,
    finished_at_ms: Option<u64>,
}

impl<C: PlatformClock> ChunkAssembler<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            buffer: Vec::new(),
            filled: Vec::new(),
            filled_count: 0,
            expected_len: 0,
            bytes_ingested: 0,
            started_at_ms: None,
            last_chunk_ms: None,
            read_interval_ms: 0,
            finished_at_ms: None,
        }
    }

    /// The reconstructed bytes, once every byte has been covered.
    pub fn payload(&self) -> Option<&[u8]> {
        if self.is_completed() { Some(&self.buffer) } else { None }
    }

    fn mark_arrival(&mut self, now: u64) {
        if self.started_at_ms.is_none() {
            self.started_at_ms = Some(now);
        }
        if let Some(last) = self.last_chunk_ms {
            self.read_interval_ms = now.saturating_sub(last);
        }
        self.last_chunk_ms = Some(now);
    }

    fn ingest(&mut self, offset: usize, total: usize, data: &[u8]) -> QrxResult<()> {
        if total == 0 { return Err(QrxError::MalformedChunk); }
        if total > MAX_PAYLOAD { return Err(QrxError::PayloadTooLarge); }

        // A stale code from another payload must not wipe this round's progress.
        if self.expected_len != 0 && total != self.expected_len { return Err(QrxError::InconsistentChunk); }

        let end = offset.checked_add(data.len()).ok_or(QrxError::ChunkOutOfBounds)?;
        if end > total { return Err(QrxError::ChunkOutOfBounds); }

        // Only an accepted chunk fixes the payload size.
        if self.expected_len == 0 {
            self.expected_len = total;
            self.buffer.resize(total, 0);
            self.filled.resize(total, false);
        }

        self.buffer[offset..end].copy_from_slice(data);
        self.bytes_ingested += data.len() as u64;
        for slot in &mut self.filled[offset..end] {
            if !*slot {
                *slot = true;
                self.filled_count += 1;
            }
        }
        Ok(())
    }
}

/// Splits `<offset>/<total>|<data>` into its parts.
fn parse_chunk(payload: &str) -> QrxResult<(usize, usize, &str)> {
    let (header, data) = payload.split_once('|').ok_or(QrxError::MalformedChunk)?;
    let (offset, total) = header.split_once('/').ok_or(QrxError::MalformedChunk)?;
    let offset = offset.parse::<usize>().map_err(|_| QrxError::MalformedChunk)?;
    let total = total.parse::<usize>().map_err(|_| QrxError::MalformedChunk)?;
    Ok((offset, total, data))
}

impl<C: PlatformClock> ChunkDecoder for ChunkAssembler<C> {
    fn reset(&mut self) {
        self.buffer.zeroize();
        self.filled.clear();
        self.filled_count = 0;
        self.expected_len = 0;
        self.bytes_ingested = 0;
        self.started_at_ms = None;
        self.last_chunk_ms = None;
        self.read_interval_ms = 0;
        self.finished_at_ms = None;
    }

    fn decode_chunk(&mut self, payload: &str) -> QrxResult<()> {
        let now = self.clock.now_ms();
        self.mark_arrival(now);

        let (offset, total, data) = parse_chunk(payload)?;
        self.ingest(offset, total, data.as_bytes())?;

        if self.is_completed() && self.finished_at_ms.is_none() {
            self.finished_at_ms = Some(now);
        }
        debug!("chunk {}+{} of {} ({}/{} bytes covered)", offset, data.len(), total, self.filled_count, self.expected_len);
        Ok(())
    }

    fn is_completed(&self) -> bool {
        self.expected_len > 0 && self.filled_count == self.expected_len
    }

    fn progress(&self) -> u8 {
        if self.expected_len == 0 { return 0; }
        (self.filled_count * 100 / self.expected_len) as u8
    }

    fn speed(&self) -> String {
        format_speed(self.bytes_ingested, self.total_time_ms())
    }

    fn read_interval_ms(&self) -> u64 {
        self.read_interval_ms
    }

    fn total_time_ms(&self) -> u64 {
        match (self.started_at_ms, self.finished_at_ms) {
            (Some(start), Some(end)) => end.saturating_sub(start),
            (Some(start), None) => self.clock.now_ms().saturating_sub(start),
            (None, _) => 0,
        }
    }

    fn total_size(&self) -> String {
        format_bytes(self.expected_len as u64)
    }

    fn total_time(&self) -> String {
        format_duration(self.total_time_ms())
    }
}
