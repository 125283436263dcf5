//! Count command implementation.

use super::{check, server_for, server_with_store, SearchArgs};
use loginbridge_core::MemoryStore;
use loginbridge_protocol::{Request, Response};
use loginbridge_server::ServerConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Runs the count command.
///
/// With a plaintext index the vault is not consulted and may be omitted.
pub fn run(
    vault: Option<&Path>,
    plaintext: Option<PathBuf>,
    search: &SearchArgs,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let server = match (plaintext, vault) {
        (Some(index), Some(vault)) => {
            server_for(vault, ServerConfig::new().with_plaintext_index(index))
        }
        (Some(index), None) => server_with_store(
            Arc::new(MemoryStore::new()),
            ServerConfig::new().with_plaintext_index(index),
        ),
        (None, Some(vault)) => server_for(vault, ServerConfig::default()),
        (None, None) => return Err("Vault path or --plaintext required for count".into()),
    };

    let query = search.to_query();
    let count = match check(server.handle_message(Request::CountLogins { query }))? {
        Response::Count(count) if count >= 0 => count,
        Response::Count(_) => return Err("could not open vault".into()),
        other => return Err(format!("unexpected response: {other:?}").into()),
    };

    match format {
        "json" => println!("{}", serde_json::json!({ "count": count })),
        _ => println!("{count}"),
    }
    Ok(())
}
