use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Context;
use log::{debug, info};

/// Capture source that replays recorded observations, one per line.
///
/// Lines are read on a dedicated capture thread and handed over a channel
/// to whichever thread owns the session, so transitions stay serialized.
/// Blank lines stand for frames where no code was detected.
pub struct ReplaySource {
    rx: Receiver<String>,
    capture: Option<JoinHandle<anyhow::Result<usize>>>,
}

impl ReplaySource {
    pub fn spawn<R: BufRead + Send + 'static>(reader: R) -> Self {
        let (tx, rx) = mpsc::channel();
        let capture = thread::spawn(move || -> anyhow::Result<usize> {
            let mut forwarded = 0;
            for line in reader.lines() {
                let line = line.context("capture source read failed")?;
                let observed = line.trim_end_matches('\r');
                if observed.is_empty() { continue; }
                // Receiver gone: the scanner stopped.
                if tx.send(observed.to_string()).is_err() { break; }
                forwarded += 1;
            }
            debug!("Capture thread done after {} observations", forwarded);
            Ok(forwarded)
        });
        Self { rx, capture: Some(capture) }
    }

    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path).with_context(|| format!("cannot open capture file {}", path.display()))?;
        info!("Replaying observations from {}", path.display());
        Ok(Self::spawn(BufReader::new(file)))
    }

    pub fn stdin() -> Self {
        Self::spawn(BufReader::new(io::stdin()))
    }

    /// Next observation. `Disconnected` once the source is exhausted.
    pub fn next_timeout(&self, timeout: Duration) -> Result<String, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }

    /// Wait for the capture thread and collect its outcome.
    /// Only meaningful once the source is exhausted; an interactive reader
    /// would block here. Dropping the source instead detaches the thread.
    pub fn join(mut self) -> anyhow::Result<usize> {
        match self.capture.take() {
            Some(capture) => capture.join().map_err(|_| anyhow::anyhow!("capture thread panicked"))?,
            None => Ok(0),
        }
    }
}

impl Iterator for ReplaySource {
    type Item = String;
    fn next(&mut self) -> Option<String> {
        self.rx.recv().ok()
    }
}
