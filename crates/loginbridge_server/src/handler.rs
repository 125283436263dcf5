//! Request handlers for the login operations.

use crate::config::{CountSource, ServerConfig};
use crate::error::{ServerError, ServerResult};
use crate::registry::{SubscriberFactory, SubscriberRegistry};
use crate::version::VersionGate;
use loginbridge_core::{
    CoreError, EntryStore, FieldMapper, LoginCounter, MatchEngine, NativeEntry, OpenPrompt,
    OpenWaitCoordinator, PlaintextUrlIndex, UiDispatcher,
};
use loginbridge_protocol::{
    ClientIdentity, Compatibility, CredentialEntry, LoginList, Request, Response, SearchQuery,
    Version,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Shared state for request handling.
pub struct HandlerContext {
    /// Server configuration.
    pub config: ServerConfig,
    /// The password database.
    pub store: Arc<dyn EntryStore>,
    /// The host's UI thread.
    pub dispatcher: Arc<dyn UiDispatcher>,
    /// Callback subscribers.
    pub registry: SubscriberRegistry,
    /// Parks callers while no database is open.
    pub open_wait: OpenWaitCoordinator,
    gate: VersionGate,
    engine: MatchEngine,
    counter: Arc<dyn LoginCounter>,
}

impl HandlerContext {
    /// Creates a handler context.
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn EntryStore>,
        dispatcher: Arc<dyn UiDispatcher>,
        prompt: Arc<dyn OpenPrompt>,
        factory: Arc<dyn SubscriberFactory>,
    ) -> Self {
        let engine = MatchEngine::new(Arc::clone(&store));
        let counter: Arc<dyn LoginCounter> = match &config.count_source {
            CountSource::Store => Arc::new(engine.clone()),
            CountSource::Plaintext(path) => Arc::new(PlaintextUrlIndex::new(path.clone())),
        };
        let open_wait = OpenWaitCoordinator::with_timeout(
            Arc::clone(&store),
            Arc::clone(&dispatcher),
            prompt,
            config.open_wait_timeout,
        );

        Self {
            gate: VersionGate::new(config.server_version, config.min_client_version),
            config,
            store,
            dispatcher,
            registry: SubscriberRegistry::new(factory),
            open_wait,
            engine,
            counter,
        }
    }
}

/// Handler for login requests.
pub struct RequestHandler {
    context: Arc<HandlerContext>,
}

impl RequestHandler {
    /// Creates a new request handler.
    pub fn new(context: Arc<HandlerContext>) -> Self {
        Self { context }
    }

    /// Dispatches a request to its handler.
    ///
    /// # Errors
    ///
    /// Returns an error for caller mistakes such as an unresolvable unique id.
    /// A closed database is not an error; it yields the sentinel response.
    pub fn handle(&self, request: Request) -> ServerResult<Response> {
        match request {
            Request::CheckVersion {
                client_version,
                min_server_version,
            } => Ok(Response::Version(
                self.check_version(client_version, min_server_version),
            )),
            Request::GetDatabaseName => Ok(Response::DatabaseName(self.database_name())),
            Request::GetDatabaseFileName => {
                Ok(Response::DatabaseFileName(self.database_file_name()))
            }
            Request::ChangeDatabase {
                path,
                close_current,
            } => {
                self.change_database(path.as_deref(), close_current);
                Ok(Response::Done)
            }
            Request::AddClient { identity } => {
                self.add_client(&identity)?;
                Ok(Response::Done)
            }
            Request::AddLogin { login } => {
                let unique_id = self.add_login(&login)?;
                Ok(Response::Applied {
                    applied: unique_id.is_some(),
                    unique_id,
                })
            }
            Request::ModifyLogin {
                old_login,
                new_login,
            } => {
                let unique_id = self.modify_login(&old_login, &new_login)?;
                Ok(Response::Applied {
                    applied: unique_id.is_some(),
                    unique_id,
                })
            }
            Request::GetAllLogins => Ok(Response::Logins(self.all_logins()?)),
            Request::FindLogins { query } => Ok(Response::Logins(self.find_logins(&query)?)),
            Request::CountLogins { query } => Ok(Response::Count(self.count_logins(&query)?)),
        }
    }

    /// Checks a caller's version against this server.
    pub fn check_version(&self, client_version: Version, min_server_version: Version) -> Compatibility {
        let verdict = self.context.gate.check(client_version, min_server_version);
        debug!(%client_version, %min_server_version, ?verdict, "version check");
        verdict
    }

    /// Name of the open database: empty when closed, `"no name"` when unnamed.
    pub fn database_name(&self) -> String {
        match self.context.store.name() {
            None => String::new(),
            Some(name) if name.is_empty() => "no name".to_string(),
            Some(name) => name,
        }
    }

    /// Path of the open database, empty when there is none.
    pub fn database_file_name(&self) -> String {
        self.context
            .store
            .path()
            .map(|path| path.display().to_string())
            .unwrap_or_default()
    }

    /// Switches the active database.
    ///
    /// The current database is closed first when asked. The open itself runs
    /// on the UI thread; callers parked on the open-wait are released once it
    /// completes. An empty or missing path reopens the last used database.
    pub fn change_database(&self, path: Option<&str>, close_current: bool) {
        let context = &self.context;
        if close_current && context.store.is_open() {
            info!("closing current database");
            context.store.close();
        }

        let path = path.filter(|p| !p.is_empty()).map(PathBuf::from);
        let store = Arc::clone(&context.store);
        let open_wait = context.open_wait.clone();
        context.dispatcher.dispatch(Box::new(move || {
            match store.open(path.as_deref()) {
                Ok(()) => {
                    info!(name = ?store.name(), "database opened");
                    open_wait.notify_database_opened();
                }
                Err(e) => warn!(error = %e, "could not open database"),
            }
        }));
    }

    /// Registers a callback receiver.
    ///
    /// # Errors
    ///
    /// Returns `ShutDown` once the server is shut down.
    pub fn add_client(&self, identity: &ClientIdentity) -> ServerResult<()> {
        self.context.registry.add_client(identity)
    }

    /// Stores a new login and schedules a save.
    ///
    /// Returns the new entry's unique id, or `None` if no database could be
    /// opened. Any unique id on `login` is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the entry.
    pub fn add_login(&self, login: &CredentialEntry) -> ServerResult<Option<String>> {
        if !self.context.open_wait.ensure_open() {
            return Ok(None);
        }

        let mut entry = NativeEntry::new();
        self.mapper().apply_wire(login, &mut entry);
        let unique_id = entry.id().to_hex();

        match self.context.store.insert(entry) {
            Ok(()) => {}
            Err(CoreError::DatabaseClosed) => return Ok(None),
            Err(e) => return Err(e.into()),
        }
        debug!(%unique_id, host = %login.host_name, "login added");
        self.schedule_save();
        Ok(Some(unique_id))
    }

    /// Overwrites the entry `old_login` came from with `new_login`.
    ///
    /// Returns the entry's unique id, or `None` if no database could be opened.
    ///
    /// # Errors
    ///
    /// Fails if `old_login` carries no unique id or the id resolves to nothing.
    pub fn modify_login(
        &self,
        old_login: &CredentialEntry,
        new_login: &CredentialEntry,
    ) -> ServerResult<Option<String>> {
        if old_login.unique_id.is_empty() {
            return Err(ServerError::InvalidRequest(
                "old login doesn't contain a unique id".to_string(),
            ));
        }
        if !self.context.open_wait.ensure_open() {
            return Ok(None);
        }

        let mut entry = match self.context.engine.find_entry(&old_login.unique_id) {
            Ok(entry) => entry,
            Err(CoreError::DatabaseClosed) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        self.mapper().apply_wire(new_login, &mut entry);
        let unique_id = entry.id().to_hex();

        match self.context.store.update(entry) {
            Ok(()) => {}
            Err(CoreError::DatabaseClosed) => return Ok(None),
            Err(e) => return Err(e.into()),
        }
        debug!(%unique_id, "login modified");
        self.schedule_save();
        Ok(Some(unique_id))
    }

    /// Lists every login.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn all_logins(&self) -> ServerResult<LoginList> {
        if !self.context.open_wait.ensure_open() {
            return Ok(LoginList::closed());
        }
        closed_as_sentinel(self.context.engine.all_logins().map(LoginList::new), LoginList::closed())
    }

    /// Finds logins matching `query`.
    ///
    /// # Errors
    ///
    /// A non-empty unique id that resolves to nothing is an error.
    pub fn find_logins(&self, query: &SearchQuery) -> ServerResult<LoginList> {
        if !self.context.open_wait.ensure_open() {
            return Ok(LoginList::closed());
        }
        closed_as_sentinel(
            self.context.engine.find_logins(query).map(LoginList::new),
            LoginList::closed(),
        )
    }

    /// Counts logins matching `query`, ignoring its unique id. Returns -1 when
    /// no database could be opened.
    ///
    /// # Errors
    ///
    /// Returns an error if the count source cannot be read.
    pub fn count_logins(&self, query: &SearchQuery) -> ServerResult<i64> {
        let query = SearchQuery {
            unique_id: None,
            ..query.clone()
        };
        let needs_open = matches!(self.context.config.count_source, CountSource::Store);
        if needs_open && !self.context.open_wait.ensure_open() {
            return Ok(-1);
        }
        closed_as_sentinel(
            self.context
                .counter
                .count_logins(&query)
                .map(|count| i64::try_from(count).unwrap_or(i64::MAX)),
            -1,
        )
    }

    fn mapper(&self) -> FieldMapper {
        FieldMapper::new(self.context.store.memory_protection())
    }

    fn schedule_save(&self) {
        let store = Arc::clone(&self.context.store);
        self.context.dispatcher.dispatch(Box::new(move || {
            if let Err(e) = store.save() {
                error!(error = %e, "failed to save database");
            }
        }));
    }
}

/// Maps a database that closed mid-request to the closed sentinel.
fn closed_as_sentinel<T>(result: Result<T, CoreError>, sentinel: T) -> ServerResult<T> {
    match result {
        Ok(value) => Ok(value),
        Err(CoreError::DatabaseClosed) => Ok(sentinel),
        Err(e) => Err(e.into()),
    }
}
