//! Test fixtures and server helpers.
//!
//! Provides sample logins, callback receivers that record or fail, and
//! convenience builders for servers over in-memory or file-backed vaults.

use loginbridge_core::{
    EntryStore, FieldMapper, InlineDispatcher, JsonFileStore, MemoryProtection, MemoryStore,
    NativeEntry, NoPrompt, OpenPrompt, ReopenLastUsed, UiDispatcher,
};
use loginbridge_protocol::{ClientIdentity, CredentialEntry, FormField};
use loginbridge_server::{
    DeliveryError, LoginServer, ServerConfig, Subscriber, SubscriberFactory,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Builds a form login with a user name and password.
pub fn login(host: &str, title: &str, username: &str, password: &str) -> CredentialEntry {
    CredentialEntry::new(host, title)
        .with_field(FormField::username("username", username))
        .with_field(FormField::password("password", password))
}

/// Converts a wire login into a native entry with a fresh id.
pub fn native_entry(login: &CredentialEntry) -> NativeEntry {
    let mut entry = NativeEntry::new();
    FieldMapper::new(MemoryProtection::default()).apply_wire(login, &mut entry);
    entry
}

/// A small vault covering form logins, a realm login and an unrelated site.
///
/// In order:
/// 0. `https://example.com` form login posting to `https://example.com/login`
/// 1. `https://example.com/forum` form login posting to `https://example.com/forum/login`
/// 2. `https://intranet.example.org` realm login (`Staff`)
/// 3. `https://other.net` form login posting to `https://other.net/session`
pub fn sample_logins() -> Vec<CredentialEntry> {
    vec![
        login("https://example.com", "Example", "alice", "pw-alice")
            .with_form_action_url("https://example.com/login"),
        login("https://example.com/forum", "Forum", "bob", "pw-bob")
            .with_form_action_url("https://example.com/forum/login"),
        login("https://intranet.example.org", "Intranet", "carol", "pw-carol")
            .with_http_realm("Staff"),
        login("https://other.net", "Other", "dave", "pw-dave")
            .with_form_action_url("https://other.net/session"),
    ]
}

/// Native entries for [`sample_logins`].
pub fn sample_entries() -> Vec<NativeEntry> {
    sample_logins().iter().map(native_entry).collect()
}

/// A callback receiver that records every sequence number it gets.
pub struct RecordingSubscriber {
    identity: ClientIdentity,
    received: Arc<Mutex<Vec<i64>>>,
}

impl RecordingSubscriber {
    /// Creates a receiver writing into `received`.
    pub fn new(identity: ClientIdentity, received: Arc<Mutex<Vec<i64>>>) -> Self {
        Self { identity, received }
    }
}

impl Subscriber for RecordingSubscriber {
    fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    fn deliver(&self, sequence: i64) -> Result<(), DeliveryError> {
        self.received.lock().push(sequence);
        Ok(())
    }
}

/// A callback receiver that is always unreachable.
pub struct FailingSubscriber {
    identity: ClientIdentity,
}

impl FailingSubscriber {
    /// Creates an unreachable receiver.
    pub fn new(identity: ClientIdentity) -> Self {
        Self { identity }
    }
}

impl Subscriber for FailingSubscriber {
    fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    fn deliver(&self, _sequence: i64) -> Result<(), DeliveryError> {
        Err(DeliveryError::new("connection refused"))
    }
}

/// Connects recording receivers, or failing ones for names marked as
/// unreachable.
#[derive(Default)]
pub struct TestFactory {
    unreachable: Mutex<HashSet<String>>,
    received: Mutex<HashMap<String, Arc<Mutex<Vec<i64>>>>>,
}

impl TestFactory {
    /// Creates a factory where every receiver is reachable.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes receivers connected for `name` from now on fail.
    pub fn mark_unreachable(&self, name: &str) {
        self.unreachable.lock().insert(name.to_string());
    }

    /// Sequence numbers delivered to the receiver named `name`.
    pub fn received(&self, name: &str) -> Vec<i64> {
        self.received
            .lock()
            .get(name)
            .map(|received| received.lock().clone())
            .unwrap_or_default()
    }
}

impl SubscriberFactory for TestFactory {
    fn connect(&self, identity: &ClientIdentity) -> Arc<dyn Subscriber> {
        if self.unreachable.lock().contains(&identity.name) {
            return Arc::new(FailingSubscriber::new(identity.clone()));
        }
        let received = Arc::clone(
            self.received
                .lock()
                .entry(identity.name.clone())
                .or_default(),
        );
        Arc::new(RecordingSubscriber::new(identity.clone(), received))
    }
}

/// A login server together with the pieces a test wants to poke at.
pub struct TestServer {
    /// The server.
    pub server: LoginServer,
    /// The store behind it.
    pub store: Arc<dyn EntryStore>,
    /// The callback factory behind it.
    pub factory: Arc<TestFactory>,
}

impl TestServer {
    /// Builds a server from parts.
    pub fn build(
        config: ServerConfig,
        store: Arc<dyn EntryStore>,
        dispatcher: Arc<dyn UiDispatcher>,
        prompt: Arc<dyn OpenPrompt>,
    ) -> Self {
        let factory = TestFactory::new();
        let server = LoginServer::new(
            config,
            Arc::clone(&store),
            dispatcher,
            prompt,
            Arc::clone(&factory) as Arc<dyn SubscriberFactory>,
        );
        Self {
            server,
            store,
            factory,
        }
    }

    /// A server over an open in-memory vault.
    pub fn open(entries: Vec<NativeEntry>) -> Self {
        Self::build(
            ServerConfig::default(),
            Arc::new(MemoryStore::open_with("Test", entries)),
            Arc::new(InlineDispatcher),
            Arc::new(NoPrompt),
        )
    }

    /// A server over a closed in-memory vault that the user never opens.
    pub fn closed(entries: Vec<NativeEntry>) -> Self {
        Self::build(
            ServerConfig::default(),
            Arc::new(MemoryStore::with_entries("Test", entries)),
            Arc::new(InlineDispatcher),
            Arc::new(NoPrompt),
        )
    }

    /// A server over a closed in-memory vault that opens when prompted.
    pub fn reopening(entries: Vec<NativeEntry>) -> Self {
        Self::build(
            ServerConfig::default(),
            Arc::new(MemoryStore::with_entries("Test", entries)),
            Arc::new(InlineDispatcher),
            Arc::new(ReopenLastUsed),
        )
    }
}

impl std::ops::Deref for TestServer {
    type Target = LoginServer;

    fn deref(&self) -> &Self::Target {
        &self.server
    }
}

/// A JSON vault file in a temporary directory.
pub struct TestVault {
    path: PathBuf,
    _temp_dir: TempDir,
}

impl TestVault {
    /// Writes an empty vault named `name`.
    pub fn empty(name: &str) -> Self {
        Self::with_logins(name, &[])
    }

    /// Writes a vault named `name` holding `logins`.
    pub fn with_logins(name: &str, logins: &[CredentialEntry]) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join(format!("{name}.json"));
        let store = JsonFileStore::create(&path, name).expect("Failed to create vault");
        for login in logins {
            store
                .insert(native_entry(login))
                .expect("Failed to insert login");
        }
        store.save().expect("Failed to save vault");

        Self {
            path,
            _temp_dir: temp_dir,
        }
    }

    /// Location of the vault file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A closed store that reopens this vault when asked for the last used
    /// database.
    pub fn store(&self) -> JsonFileStore {
        JsonFileStore::with_last_used(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_entries_keep_order() {
        let entries = sample_entries();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].url(), "https://example.com");
        assert_eq!(entries[2].http_realm(), "Staff");
        assert_eq!(entries[3].username(), "dave");
    }

    #[test]
    fn factory_marks_unreachable() {
        let factory = TestFactory::new();
        factory.mark_unreachable("gone");

        let ok = factory.connect(&ClientIdentity::new("ok"));
        let gone = factory.connect(&ClientIdentity::new("gone"));
        assert!(ok.deliver(3).is_ok());
        assert!(gone.deliver(3).is_err());
        assert_eq!(factory.received("ok"), vec![3]);
        assert!(factory.received("gone").is_empty());
    }

    #[test]
    fn vault_reopens_from_last_used() {
        let vault = TestVault::with_logins("Personal", &sample_logins());
        let store = vault.store();
        assert!(!store.is_open());

        store.open(None).unwrap();
        assert_eq!(store.name().as_deref(), Some("Personal"));
        assert_eq!(store.entries().unwrap().len(), 4);
    }
}
