//! CLI command implementations.

pub mod add;
pub mod check_version;
pub mod count;
pub mod find;
pub mod list;

use clap::Args;
use loginbridge_core::{EntryStore, InlineDispatcher, JsonFileStore, ReopenLastUsed};
use loginbridge_protocol::{
    ClientIdentity, CredentialEntry, FormFieldType, Response, SearchQuery, SearchType,
};
use loginbridge_server::{DeliveryError, LoginServer, ServerConfig, Subscriber, SubscriberFactory};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Query options shared by `find` and `count`.
#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    /// Site URL; empty matches every login
    #[arg(default_value = "")]
    pub hostname: String,

    /// Form action URL
    #[arg(long, default_value = "")]
    pub action_url: String,

    /// HTTP realm
    #[arg(long, default_value = "")]
    pub realm: String,

    /// Ignore form logins
    #[arg(long, conflicts_with = "exclude_realms")]
    pub exclude_forms: bool,

    /// Ignore HTTP realm logins
    #[arg(long)]
    pub exclude_realms: bool,

    /// Only accept logins whose URLs equal the given ones
    #[arg(long)]
    pub full: bool,
}

impl SearchArgs {
    /// Builds the protocol query.
    pub fn to_query(&self) -> SearchQuery {
        let search_type = if self.exclude_forms {
            SearchType::ExcludeForms
        } else if self.exclude_realms {
            SearchType::ExcludeRealms
        } else {
            SearchType::All
        };
        SearchQuery::new(self.hostname.as_str())
            .with_action_url(self.action_url.as_str())
            .with_http_realm(self.realm.as_str())
            .with_search_type(search_type)
            .require_full_url_match(self.full)
    }
}

/// Receives callbacks by logging them; the CLI has no remote receivers.
struct LogSubscriber(ClientIdentity);

impl Subscriber for LogSubscriber {
    fn identity(&self) -> &ClientIdentity {
        &self.0
    }

    fn deliver(&self, sequence: i64) -> Result<(), DeliveryError> {
        info!(client = %self.0, sequence, "callback");
        Ok(())
    }
}

struct LogFactory;

impl SubscriberFactory for LogFactory {
    fn connect(&self, identity: &ClientIdentity) -> Arc<dyn Subscriber> {
        Arc::new(LogSubscriber(identity.clone()))
    }
}

/// Builds a server over the vault at `vault`.
///
/// The vault starts closed and is opened on the first request that needs it,
/// the way a host reopens its last used database.
pub fn server_for(vault: &Path, config: ServerConfig) -> LoginServer {
    server_with_store(Arc::new(JsonFileStore::with_last_used(vault)), config)
}

/// Builds a server over an explicit store.
pub fn server_with_store(store: Arc<dyn EntryStore>, config: ServerConfig) -> LoginServer {
    LoginServer::new(
        config,
        store,
        Arc::new(InlineDispatcher),
        Arc::new(ReopenLastUsed),
        Arc::new(LogFactory),
    )
}

/// Turns an error response into an error.
pub fn check(response: Response) -> Result<Response, Box<dyn std::error::Error>> {
    match response {
        Response::Error(message) => Err(message.into()),
        other => Ok(other),
    }
}

/// Prints logins in the requested format.
pub fn print_logins(
    logins: &[CredentialEntry],
    reveal: bool,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let masked: Vec<CredentialEntry>;
    let logins = if reveal {
        logins
    } else {
        masked = logins.iter().map(mask_passwords).collect();
        &masked
    };

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(logins)?);
        }
        _ => {
            for login in logins {
                print_login(login);
            }
            println!("{} login(s)", logins.len());
        }
    }
    Ok(())
}

fn mask_passwords(login: &CredentialEntry) -> CredentialEntry {
    let mut login = login.clone();
    for field in &mut login.form_fields {
        if field.field_type == FormFieldType::Password && !field.value.is_empty() {
            field.value = "********".to_string();
        }
    }
    login
}

fn print_login(login: &CredentialEntry) {
    let marker = if login.is_exact_match { " (exact)" } else { "" };
    println!("{} [{}]{}", login.title, login.unique_id, marker);
    println!("  URL:          {}", login.host_name);
    if !login.form_action_url.is_empty() {
        println!("  Form action:  {}", login.form_action_url);
    }
    if !login.http_realm.is_empty() {
        println!("  HTTP realm:   {}", login.http_realm);
    }
    for field in &login.form_fields {
        println!(
            "  {:<13} {} ({})",
            format!("{}:", field.display_name),
            field.value,
            field.field_type.as_str()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_args_to_query() {
        let args = SearchArgs {
            hostname: "https://example.com".into(),
            action_url: String::new(),
            realm: "Staff".into(),
            exclude_forms: true,
            exclude_realms: false,
            full: true,
        };
        let query = args.to_query();
        assert_eq!(query.search_type, SearchType::ExcludeForms);
        assert_eq!(query.http_realm, "Staff");
        assert!(query.require_full_url_match);
        assert!(query.unique_id.is_none());
    }

    #[test]
    fn passwords_are_masked() {
        let login = CredentialEntry::new("https://example.com", "Example")
            .with_field(loginbridge_protocol::FormField::password("p", "secret"))
            .with_field(loginbridge_protocol::FormField::username("u", "alice"));
        let masked = mask_passwords(&login);
        assert_eq!(masked.form_fields[0].value, "********");
        assert_eq!(masked.form_fields[1].value, "alice");
    }
}
