// SPDX-License-Identifier: Apache-2.0 OR MIT
// Ready/done signalling between producers and the writer thread
//
// Both signals are condition variables over one shared `pending` count
// instead of single-slot events. The count is raised before a message
// becomes visible in the queue and lowered only after the writer has
// written and flushed it, so `pending == 0` means "everything accepted so
// far is on the sink" with no window for a lost or coalesced wakeup.

use super::error::LogError;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
struct GateState {
    /// Messages accepted by producers and not yet written
    pending: usize,
    /// Shutdown requested; no new messages are accepted
    shutdown: bool,
    /// Set when the writer thread has exited for any reason
    stopped: bool,
    /// Writer failure that stopped the thread
    failure: Option<String>,
}

/// What the writer thread should do after waking up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Wakeup {
    /// At least one message is queued
    Work,
    /// Shutdown requested and nothing left to write
    Shutdown,
}

/// Completion gate shared by producers and the writer thread
#[derive(Debug, Default)]
pub struct CompletionGate {
    state: Mutex<GateState>,
    /// Producers -> writer: work may be available
    ready: Condvar,
    /// Writer -> waiters: pending reached zero, or the writer stopped
    done: Condvar,
}

impl CompletionGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Accept one message: count it, run `enqueue`, wake the writer
    ///
    /// `enqueue` runs while the gate is held, which makes admission order
    /// identical to queue order and guarantees the writer never sees a
    /// queued message that is not yet counted.
    pub(crate) fn admit(&self, enqueue: impl FnOnce()) -> Result<(), LogError> {
        let mut state = self.lock();
        if let Some(reason) = &state.failure {
            return Err(LogError::WorkerFailed(reason.clone()));
        }
        if state.shutdown || state.stopped {
            return Err(LogError::Closed);
        }
        state.pending += 1;
        enqueue();
        self.ready.notify_one();
        Ok(())
    }

    /// Block the writer thread until there is work or it should exit
    pub(crate) fn wait_for_work(&self) -> Wakeup {
        let mut state = self.lock();
        loop {
            if state.pending > 0 {
                return Wakeup::Work;
            }
            if state.shutdown {
                return Wakeup::Shutdown;
            }
            state = self
                .ready
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Record the end of a drain pass that wrote `written` messages
    pub(crate) fn complete(&self, written: usize) {
        let mut state = self.lock();
        debug_assert!(written <= state.pending, "wrote more than was admitted");
        state.pending = state.pending.saturating_sub(written);
        if state.pending == 0 {
            self.done.notify_all();
        }
    }

    /// Record a fatal writer failure and release every waiter
    pub(crate) fn fail(&self, reason: String) {
        let mut state = self.lock();
        state.failure = Some(reason);
        state.stopped = true;
        self.done.notify_all();
    }

    /// Mark the writer thread as gone
    pub(crate) fn stop(&self) {
        let mut state = self.lock();
        state.stopped = true;
        self.done.notify_all();
    }

    /// Ask the writer thread to finish the queue and exit
    pub(crate) fn request_shutdown(&self) {
        let mut state = self.lock();
        state.shutdown = true;
        self.ready.notify_all();
    }

    /// Block until every accepted message has been written
    ///
    /// Returns immediately when nothing is pending, so repeated calls are
    /// cheap. Fails instead of blocking forever if the writer thread has
    /// stopped with messages still outstanding.
    pub fn wait_for_drain(&self) -> Result<(), LogError> {
        let mut state = self.lock();
        loop {
            if let Some(result) = Self::drain_outcome(&state) {
                return result;
            }
            state = self
                .done
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Like [`wait_for_drain`](Self::wait_for_drain) but gives up after
    /// `timeout`, returning `Ok(false)` if messages are still pending
    pub fn wait_for_drain_timeout(&self, timeout: Duration) -> Result<bool, LogError> {
        let state = self.lock();
        let (state, _) = self
            .done
            .wait_timeout_while(state, timeout, |state| {
                Self::drain_outcome(state).is_none()
            })
            .unwrap_or_else(PoisonError::into_inner);
        match Self::drain_outcome(&state) {
            Some(result) => result.map(|()| true),
            None => Ok(false),
        }
    }

    fn drain_outcome(state: &GateState) -> Option<Result<(), LogError>> {
        if state.pending == 0 {
            return Some(Ok(()));
        }
        if let Some(reason) = &state.failure {
            return Some(Err(LogError::WorkerFailed(reason.clone())));
        }
        if state.stopped {
            return Some(Err(LogError::WorkerStopped {
                pending: state.pending,
            }));
        }
        None
    }

    /// Messages accepted and not yet written
    pub fn pending(&self) -> usize {
        self.lock().pending
    }

    /// Check if shutdown was requested or the writer thread stopped
    pub fn is_closed(&self) -> bool {
        let state = self.lock();
        state.shutdown || state.stopped
    }
}
