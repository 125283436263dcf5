//! Main login server.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::{HandlerContext, RequestHandler};
use crate::registry::{BroadcastReport, SubscriberFactory, SubscriberRegistry};
use loginbridge_core::{EntryStore, OpenPrompt, UiDispatcher};
use loginbridge_protocol::{Request, Response};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// The login server.
///
/// Answers login requests against an [`EntryStore`] and sends sequence
/// numbers to registered callback receivers. Transports feed it decoded
/// [`Request`]s or raw CBOR frames.
///
/// # Example
///
/// ```
/// use loginbridge_core::{InlineDispatcher, MemoryStore, NoPrompt};
/// use loginbridge_protocol::{ClientIdentity, Request, Response};
/// use loginbridge_server::{
///     DeliveryError, LoginServer, ServerConfig, Subscriber, SubscriberFactory,
/// };
/// use std::sync::Arc;
///
/// struct Quiet(ClientIdentity);
///
/// impl Subscriber for Quiet {
///     fn identity(&self) -> &ClientIdentity {
///         &self.0
///     }
///
///     fn deliver(&self, _sequence: i64) -> Result<(), DeliveryError> {
///         Ok(())
///     }
/// }
///
/// struct QuietFactory;
///
/// impl SubscriberFactory for QuietFactory {
///     fn connect(&self, identity: &ClientIdentity) -> Arc<dyn Subscriber> {
///         Arc::new(Quiet(identity.clone()))
///     }
/// }
///
/// let server = LoginServer::new(
///     ServerConfig::default(),
///     Arc::new(MemoryStore::open_with("Personal", Vec::new())),
///     Arc::new(InlineDispatcher),
///     Arc::new(NoPrompt),
///     Arc::new(QuietFactory),
/// );
/// let response = server.handle_message(Request::GetDatabaseName);
/// assert_eq!(response, Response::DatabaseName("Personal".into()));
///
/// let response = server.handle_message(Request::AddClient {
///     identity: ClientIdentity::new("browser"),
/// });
/// assert_eq!(response, Response::Done);
/// assert_eq!(server.broadcast(1).delivered, 1);
/// ```
pub struct LoginServer {
    handler: RequestHandler,
    context: Arc<HandlerContext>,
    sequence: AtomicI64,
}

impl LoginServer {
    /// Creates a new login server.
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn EntryStore>,
        dispatcher: Arc<dyn UiDispatcher>,
        prompt: Arc<dyn OpenPrompt>,
        factory: Arc<dyn SubscriberFactory>,
    ) -> Self {
        let context = Arc::new(HandlerContext::new(
            config, store, dispatcher, prompt, factory,
        ));
        let handler = RequestHandler::new(Arc::clone(&context));

        Self {
            handler,
            context,
            sequence: AtomicI64::new(0),
        }
    }

    /// Returns the request handler.
    pub fn handler(&self) -> &RequestHandler {
        &self.handler
    }

    /// Returns the shared handler context.
    pub fn context(&self) -> &Arc<HandlerContext> {
        &self.context
    }

    /// Returns the subscriber registry.
    pub fn registry(&self) -> &SubscriberRegistry {
        &self.context.registry
    }

    /// Handles a request. Failures become [`Response::Error`].
    pub fn handle_message(&self, request: Request) -> Response {
        let type_code = request.type_code();
        debug!(type_code, "handling request");
        match self.handler.handle(request) {
            Ok(response) => response,
            Err(e) => {
                if e.is_server_error() {
                    warn!(type_code, error = %e, "request failed");
                } else {
                    debug!(type_code, error = %e, "request rejected");
                }
                Response::error(e.to_string())
            }
        }
    }

    /// Handles one CBOR-encoded request and returns the encoded response.
    ///
    /// An undecodable frame is answered with an error response.
    ///
    /// # Errors
    ///
    /// Returns an error only if the response cannot be encoded.
    pub fn handle_frame(&self, frame: &[u8]) -> ServerResult<Vec<u8>> {
        let response = match Request::decode(frame) {
            Ok(request) => self.handle_message(request),
            Err(e) => {
                let e = ServerError::from(e);
                debug!(error = %e, "undecodable frame");
                Response::error(e.to_string())
            }
        };
        Ok(response.encode()?)
    }

    /// Sends `sequence` to every registered receiver.
    pub fn broadcast(&self, sequence: i64) -> BroadcastReport {
        self.context.registry.broadcast(sequence)
    }

    /// Sends the next sequence number (starting at 1) to every receiver.
    pub fn notify_subscribers(&self) -> BroadcastReport {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.broadcast(sequence)
    }

    /// Releases callers waiting for a database after the host opened one.
    pub fn notify_database_opened(&self) {
        self.context.open_wait.notify_database_opened();
    }

    /// Stops the registry and releases every waiting caller.
    pub fn shutdown(&self) {
        self.context.registry.shutdown();
        self.context.open_wait.shutdown();
    }
}
