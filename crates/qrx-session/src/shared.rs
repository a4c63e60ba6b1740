use spin::Mutex;

use qrx_hal::{ChunkDecoder, Transport};

use crate::{ScanSession, SessionEvent, SessionPhase};

/// A session that may be fed from several threads.
///
/// Each `handle` holds the lock for the whole transition, including the
/// adapter calls, so no two observations ever see a half-applied phase.
///
/// The lock is a spin lock. A transition that reaches the transport keeps
/// every other caller spinning until the peer answers, so threads that must
/// not burn CPU on a slow network should use [`SharedSession::try_handle`]
/// and drop the observation when it returns `None`.
pub struct SharedSession<T: Transport, D: ChunkDecoder> {
    inner: Mutex<ScanSession<T, D>>,
}

impl<T: Transport, D: ChunkDecoder> SharedSession<T, D> {
    pub fn new(session: ScanSession<T, D>) -> Self {
        Self { inner: Mutex::new(session) }
    }

    pub fn handle(&self, raw: &str) -> SessionEvent {
        self.inner.lock().handle(raw)
    }

    /// Like `handle`, but gives up instead of waiting for a transition in
    /// flight. The observation is not queued.
    pub fn try_handle(&self, raw: &str) -> Option<SessionEvent> {
        self.inner.try_lock().map(|mut session| session.handle(raw))
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.lock().phase()
    }

    /// Run `f` against the session with the lock held.
    pub fn with<R>(&self, f: impl FnOnce(&ScanSession<T, D>) -> R) -> R {
        let session = self.inner.lock();
        f(&*session)
    }

    pub fn into_inner(self) -> ScanSession<T, D> {
        self.inner.into_inner()
    }
}
