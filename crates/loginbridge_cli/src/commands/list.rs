//! List command implementation.

use super::{check, print_logins, server_for};
use loginbridge_protocol::{Request, Response};
use loginbridge_server::ServerConfig;
use std::path::Path;

/// Runs the list command.
pub fn run(vault: &Path, reveal: bool, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let server = server_for(vault, ServerConfig::default());
    match check(server.handle_message(Request::GetAllLogins))? {
        Response::Logins(list) if !list.is_closed() => print_logins(list.entries(), reveal, format),
        Response::Logins(_) => Err(format!("could not open vault {}", vault.display()).into()),
        other => Err(format!("unexpected response: {other:?}").into()),
    }
}
