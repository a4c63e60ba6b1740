use std::time::Instant;

use log::{info, warn};
use url::Url;

use qrx_core::{QrxError, QrxResult};
use qrx_hal::{PlatformClock, Transport};

pub mod replay;
pub use replay::ReplaySource;

pub struct SystemClock(Instant);
impl SystemClock { pub fn new() -> Self { Self(Instant::now()) } }
impl Default for SystemClock { fn default() -> Self { Self::new() } }
impl PlatformClock for SystemClock {
    fn now_ms(&self) -> u64 { self.0.elapsed().as_millis() as u64 }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Connect(String),
    StartNext,
    SendResult(u64),
}

/// Transport that validates the endpoint and records every call instead
/// of talking to a peer. Used for replaying captured scans.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    endpoint: Option<Url>,
    history: Vec<TransportCall>,
}

impl RecordingTransport {
    pub fn new() -> Self { Self::default() }
    pub fn endpoint(&self) -> Option<&Url> { self.endpoint.as_ref() }
    pub fn history(&self) -> &[TransportCall] { &self.history }

    fn ensure_connected(&self) -> QrxResult<&Url> {
        self.endpoint.as_ref().ok_or(QrxError::NotConnected)
    }
}

fn parse_endpoint(uri: &str) -> QrxResult<Url> {
    let url = Url::parse(uri).map_err(|_| QrxError::InvalidUri)?;
    match url.scheme() {
        "ws" | "wss" => {}
        _ => return Err(QrxError::InvalidUri),
    }
    if url.host_str().is_none() { return Err(QrxError::InvalidUri); }
    Ok(url)
}

impl Transport for RecordingTransport {
    fn connect(&mut self, uri: &str) -> QrxResult<()> {
        self.history.push(TransportCall::Connect(uri.to_string()));
        // One endpoint per session.
        if self.endpoint.is_some() { return Err(QrxError::InvalidState); }

        let url = parse_endpoint(uri).map_err(|e| {
            warn!("Rejected endpoint {:?}: {}", uri, e);
            e
        })?;
        info!("Endpoint {} accepted", url);
        self.endpoint = Some(url);
        Ok(())
    }

    fn start_next(&mut self) -> QrxResult<()> {
        self.history.push(TransportCall::StartNext);
        let url = self.ensure_connected()?;
        info!("-> {} startNext", url);
        Ok(())
    }

    fn send_result(&mut self, elapsed_ms: u64) -> QrxResult<()> {
        self.history.push(TransportCall::SendResult(elapsed_ms));
        let url = self.ensure_connected()?;
        info!("-> {} result {}ms", url, elapsed_ms);
        Ok(())
    }
}
