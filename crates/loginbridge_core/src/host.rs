//! Host application collaborators.
//!
//! The host owns a UI thread that must perform database opens and saves. The
//! core reaches it through [`UiDispatcher`] and asks the user to open a
//! database through [`OpenPrompt`].

use crate::error::CoreResult;
use crate::store::EntryStore;
use parking_lot::Mutex;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// Work handed to the host's UI thread.
pub type HostTask = Box<dyn FnOnce() + Send + 'static>;

/// Marshals work onto the host's UI thread.
///
/// Dispatch is fire-and-forget: the caller gets no completion signal.
pub trait UiDispatcher: Send + Sync {
    /// Queues `task` for the UI thread.
    fn dispatch(&self, task: HostTask);
}

/// Runs each task immediately on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineDispatcher;

impl UiDispatcher for InlineDispatcher {
    fn dispatch(&self, task: HostTask) {
        task();
    }
}

/// A dedicated thread standing in for a host UI thread.
///
/// Tasks run one at a time in dispatch order. Dropping the dispatcher lets the
/// queued tasks finish and joins the thread.
#[derive(Debug)]
pub struct ThreadDispatcher {
    sender: Mutex<Option<Sender<HostTask>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl ThreadDispatcher {
    /// Spawns the UI thread under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread cannot be spawned.
    pub fn spawn(name: impl Into<String>) -> CoreResult<Self> {
        let (sender, receiver) = mpsc::channel::<HostTask>();
        let handle = thread::Builder::new()
            .name(name.into())
            .spawn(move || {
                for task in receiver {
                    task();
                }
            })?;

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            handle: Mutex::new(Some(handle)),
        })
    }
}

impl UiDispatcher for ThreadDispatcher {
    fn dispatch(&self, task: HostTask) {
        let sender = self.sender.lock();
        let delivered = sender.as_ref().is_some_and(|s| s.send(task).is_ok());
        if !delivered {
            warn!("UI thread is gone; task dropped");
        }
    }
}

impl Drop for ThreadDispatcher {
    fn drop(&mut self) {
        self.sender.lock().take();
        if let Some(handle) = self.handle.lock().take() {
            // A task holding the last reference drops us on the UI thread itself.
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                warn!("UI thread panicked");
            }
        }
    }
}

/// Asks the user to open a database.
///
/// Called on the UI thread. Returning (whether a database was opened or the
/// user cancelled) completes the prompt.
pub trait OpenPrompt: Send + Sync {
    /// Shows the prompt against `store`.
    fn prompt_open(&self, store: &dyn EntryStore);
}

/// Reopens the last used database without user interaction.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReopenLastUsed;

impl OpenPrompt for ReopenLastUsed {
    fn prompt_open(&self, store: &dyn EntryStore) {
        match store.open(None) {
            Ok(()) => debug!("reopened last used database"),
            Err(e) => warn!(error = %e, "could not reopen last used database"),
        }
    }
}

/// A prompt the user always dismisses.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPrompt;

impl OpenPrompt for NoPrompt {
    fn prompt_open(&self, _store: &dyn EntryStore) {}
}
