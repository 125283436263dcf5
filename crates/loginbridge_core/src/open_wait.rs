//! Open-wait coordination.
//!
//! Entry-touching operations must not run against a closed database. When the
//! store is closed the calling thread asks the UI thread to prompt the user,
//! then parks until the prompt completes, the host reports an open by other
//! means, the optional timeout elapses or the coordinator shuts down.
//!
//! Every signal advances an epoch under the coordinator lock. A waiter checks
//! the store and records the epoch under that same lock, so an open reported
//! between the check and the wait is never missed.

use crate::host::{OpenPrompt, UiDispatcher};
use crate::store::EntryStore;
use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Default)]
struct WaitState {
    epoch: u64,
    prompt_pending: bool,
    shut_down: bool,
}

struct Shared {
    store: Arc<dyn EntryStore>,
    dispatcher: Arc<dyn UiDispatcher>,
    prompt: Arc<dyn OpenPrompt>,
    timeout: Option<Duration>,
    state: Mutex<WaitState>,
    signal: Condvar,
}

impl Shared {
    fn advance(&self, state: &mut WaitState) {
        state.epoch = state.epoch.wrapping_add(1);
        self.signal.notify_all();
    }
}

/// Completes the prompt when dropped, so a task the UI thread never runs
/// still releases its waiters.
struct PromptCompletion(Arc<Shared>);

impl Drop for PromptCompletion {
    fn drop(&mut self) {
        let mut state = self.0.state.lock();
        state.prompt_pending = false;
        self.0.advance(&mut state);
        debug!(epoch = state.epoch, "open prompt completed");
    }
}

/// Parks callers until a database is open.
#[derive(Clone)]
pub struct OpenWaitCoordinator {
    shared: Arc<Shared>,
}

impl OpenWaitCoordinator {
    /// Creates a coordinator that waits without a timeout.
    pub fn new(
        store: Arc<dyn EntryStore>,
        dispatcher: Arc<dyn UiDispatcher>,
        prompt: Arc<dyn OpenPrompt>,
    ) -> Self {
        Self::with_timeout(store, dispatcher, prompt, None)
    }

    /// Creates a coordinator whose waits give up after `timeout`.
    pub fn with_timeout(
        store: Arc<dyn EntryStore>,
        dispatcher: Arc<dyn UiDispatcher>,
        prompt: Arc<dyn OpenPrompt>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                store,
                dispatcher,
                prompt,
                timeout,
                state: Mutex::new(WaitState::default()),
                signal: Condvar::new(),
            }),
        }
    }

    /// Returns the wait timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.shared.timeout
    }

    /// Returns true once a database is open, prompting the user if needed.
    ///
    /// Blocks the calling thread while the prompt is outstanding. Returns false
    /// if the database is still closed after the wait.
    pub fn ensure_open(&self) -> bool {
        let shared = &self.shared;
        if shared.store.is_open() {
            return true;
        }

        let mut state = shared.state.lock();
        if shared.store.is_open() {
            return true;
        }
        if state.shut_down {
            return false;
        }

        let armed = state.epoch;
        if !state.prompt_pending {
            state.prompt_pending = true;
            drop(state);
            info!("no database open; prompting");
            let completion = PromptCompletion(Arc::clone(shared));
            shared.dispatcher.dispatch(Box::new(move || {
                let shared = &completion.0;
                shared.prompt.prompt_open(shared.store.as_ref());
                drop(completion);
            }));
            state = shared.state.lock();
        }

        let deadline = shared.timeout.map(|timeout| Instant::now() + timeout);
        while state.epoch == armed && !state.shut_down {
            match deadline {
                Some(deadline) => {
                    if shared.signal.wait_until(&mut state, deadline).timed_out() {
                        debug!("open wait timed out");
                        break;
                    }
                }
                None => shared.signal.wait(&mut state),
            }
        }
        drop(state);

        let open = shared.store.is_open();
        debug!(open, "open wait finished");
        open
    }

    /// Releases waiters after the host opened a database outside the prompt.
    ///
    /// Call after the store reports open.
    pub fn notify_database_opened(&self) {
        let mut state = self.shared.state.lock();
        self.shared.advance(&mut state);
    }

    /// Releases every waiter and fails later waits immediately.
    pub fn shutdown(&self) {
        let mut state = self.shared.state.lock();
        state.shut_down = true;
        self.shared.signal.notify_all();
    }
}

impl fmt::Debug for OpenWaitCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("OpenWaitCoordinator")
            .field("timeout", &self.shared.timeout)
            .field("state", &*state)
            .finish()
    }
}
