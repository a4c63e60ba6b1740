#![allow(dead_code)]

use qrx_core::{QrxError, QrxResult};
use qrx_hal::{ChunkDecoder, Transport};
use std::sync::{Arc, Mutex};

// --- MOCKS ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect(String),
    StartNext,
    SendResult(u64),
}

#[derive(Default)]
pub struct TransportState {
    pub calls: Vec<Call>,
    pub fail_connect: bool,
    pub fail_start: bool,
    pub fail_send: bool,
}

#[derive(Clone, Default)]
pub struct MockTransport(pub Arc<Mutex<TransportState>>);

impl MockTransport {
    pub fn calls(&self) -> Vec<Call> { self.0.lock().unwrap().calls.clone() }
    pub fn results(&self) -> Vec<u64> {
        self.calls().into_iter().filter_map(|c| match c {
            Call::SendResult(ms) => Some(ms),
            _ => None,
        }).collect()
    }
    pub fn set(&self, f: impl FnOnce(&mut TransportState)) { f(&mut *self.0.lock().unwrap()) }
}

impl Transport for MockTransport {
    fn connect(&mut self, uri: &str) -> QrxResult<()> {
        let mut s = self.0.lock().unwrap();
        s.calls.push(Call::Connect(uri.to_string()));
        if s.fail_connect { Err(QrxError::ConnectionFailed) } else { Ok(()) }
    }
    fn start_next(&mut self) -> QrxResult<()> {
        let mut s = self.0.lock().unwrap();
        s.calls.push(Call::StartNext);
        if s.fail_start { Err(QrxError::TransportFailed) } else { Ok(()) }
    }
    fn send_result(&mut self, elapsed_ms: u64) -> QrxResult<()> {
        let mut s = self.0.lock().unwrap();
        s.calls.push(Call::SendResult(elapsed_ms));
        if s.fail_send { Err(QrxError::TransportFailed) } else { Ok(()) }
    }
}

/// Decoder whose answers are scripted by the test.
/// Chunks starting with "bad" fail to decode, "broken" ones make the
/// decoder itself fail; every good chunk adds 10%.
#[derive(Default)]
pub struct DecoderState {
    pub resets: u32,
    pub chunks: Vec<String>,
    pub progress: u8,
    pub completed: bool,
    pub elapsed_ms: u64,
    pub read_interval_ms: u64,
}

#[derive(Clone, Default)]
pub struct ScriptedDecoder(pub Arc<Mutex<DecoderState>>);

impl ScriptedDecoder {
    pub fn set(&self, f: impl FnOnce(&mut DecoderState)) { f(&mut *self.0.lock().unwrap()) }
    pub fn resets(&self) -> u32 { self.0.lock().unwrap().resets }
    pub fn chunks(&self) -> Vec<String> { self.0.lock().unwrap().chunks.clone() }
}

impl ChunkDecoder for ScriptedDecoder {
    fn reset(&mut self) {
        let mut s = self.0.lock().unwrap();
        s.resets += 1;
        s.chunks.clear();
        s.progress = 0;
        s.completed = false;
        s.elapsed_ms = 0;
        s.read_interval_ms = 0;
    }
    fn decode_chunk(&mut self, payload: &str) -> QrxResult<()> {
        let mut s = self.0.lock().unwrap();
        s.chunks.push(payload.to_string());
        if payload.starts_with("bad") { return Err(QrxError::MalformedChunk); }
        if payload.starts_with("broken") { return Err(QrxError::InvalidState); }
        s.progress = (s.progress + 10).min(100);
        Ok(())
    }
    fn is_completed(&self) -> bool { self.0.lock().unwrap().completed }
    fn progress(&self) -> u8 { self.0.lock().unwrap().progress }
    fn speed(&self) -> String { "1.5 KB/s".to_string() }
    fn read_interval_ms(&self) -> u64 { self.0.lock().unwrap().read_interval_ms }
    fn total_time_ms(&self) -> u64 { self.0.lock().unwrap().elapsed_ms }
    fn total_size(&self) -> String { "66 B".to_string() }
    fn total_time(&self) -> String { "4s 200ms".to_string() }
}

pub type MockSession = qrx_session::ScanSession<MockTransport, ScriptedDecoder>;

pub fn new_session() -> (MockSession, MockTransport, ScriptedDecoder) {
    let transport = MockTransport::default();
    let decoder = ScriptedDecoder::default();
    let session = qrx_session::ScanSession::new(transport.clone(), decoder.clone());
    (session, transport, decoder)
}

/// A session already connected and inside a round.
pub fn receiving_session() -> (MockSession, MockTransport, ScriptedDecoder) {
    let (mut session, transport, decoder) = new_session();
    session.handle("ws://host:1234");
    session.handle("nextRound");
    (session, transport, decoder)
}
