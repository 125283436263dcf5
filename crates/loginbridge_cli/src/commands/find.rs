//! Find command implementation.

use super::{check, print_logins, server_for, SearchArgs};
use loginbridge_protocol::{Request, Response, SearchQuery};
use loginbridge_server::ServerConfig;
use std::path::Path;

/// Runs the find command.
pub fn run(
    vault: &Path,
    search: &SearchArgs,
    unique_id: Option<String>,
    reveal: bool,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let query = SearchQuery {
        unique_id,
        ..search.to_query()
    };

    let server = server_for(vault, ServerConfig::default());
    match check(server.handle_message(Request::FindLogins { query }))? {
        Response::Logins(list) if !list.is_closed() => print_logins(list.entries(), reveal, format),
        Response::Logins(_) => Err(format!("could not open vault {}", vault.display()).into()),
        other => Err(format!("unexpected response: {other:?}").into()),
    }
}
