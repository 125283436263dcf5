//! Add command implementation.

use super::{check, server_for};
use loginbridge_core::JsonFileStore;
use loginbridge_protocol::{CredentialEntry, FormField, Request, Response};
use loginbridge_server::ServerConfig;
use std::path::Path;

/// Builds the login to store from command-line values.
///
/// Extra fields are `name=value` text fields.
pub fn build_login(
    host: String,
    title: String,
    action_url: String,
    realm: String,
    username: Option<String>,
    password: Option<String>,
    fields: &[String],
) -> Result<CredentialEntry, Box<dyn std::error::Error>> {
    let mut login = CredentialEntry::new(host, title)
        .with_form_action_url(action_url)
        .with_http_realm(realm);
    if let Some(username) = username {
        login = login.with_field(FormField::username("username", username));
    }
    if let Some(password) = password {
        login = login.with_field(FormField::password("password", password));
    }
    for field in fields {
        let (name, value) = field
            .split_once('=')
            .filter(|(name, _)| !name.is_empty())
            .ok_or_else(|| format!("field must be name=value: {field}"))?;
        login = login.with_field(FormField::text(name, value));
    }
    Ok(login)
}

/// Runs the add command.
pub fn run(vault: &Path, login: CredentialEntry, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !vault.exists() {
        JsonFileStore::open_or_create(vault)?;
    }

    let server = server_for(vault, ServerConfig::default());
    let unique_id = match check(server.handle_message(Request::AddLogin { login }))? {
        Response::Applied {
            applied: true,
            unique_id: Some(unique_id),
        } => unique_id,
        Response::Applied { .. } => {
            return Err(format!("could not open vault {}", vault.display()).into())
        }
        other => return Err(format!("unexpected response: {other:?}").into()),
    };

    match format {
        "json" => println!("{}", serde_json::json!({ "unique_id": unique_id })),
        _ => println!("added {unique_id}"),
    }
    Ok(())
}
