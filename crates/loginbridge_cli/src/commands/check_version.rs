//! Check-version command implementation.

use loginbridge_protocol::{Compatibility, Version};
use loginbridge_server::VersionGate;
use serde::Serialize;

/// Version check result.
#[derive(Debug, Serialize)]
pub struct CheckVersionResult {
    /// Client version checked.
    pub client_version: String,
    /// Oldest server version the client accepts.
    pub min_server_version: String,
    /// This server's version.
    pub server_version: String,
    /// Whether the client may talk to this server.
    pub compatible: bool,
    /// Legacy result code: 0 compatible, 1 client too old, -1 server too old.
    pub result: i32,
}

fn check(
    client: &str,
    min_server: &str,
) -> Result<(CheckVersionResult, Compatibility), Box<dyn std::error::Error>> {
    let client_version: Version = client.parse()?;
    let min_server_version: Version = min_server.parse()?;
    let gate = VersionGate::default();
    let verdict = gate.check(client_version, min_server_version);

    let result = CheckVersionResult {
        client_version: client_version.to_string(),
        min_server_version: min_server_version.to_string(),
        server_version: gate.server_version().to_string(),
        compatible: verdict.is_compatible(),
        result: verdict.code(),
    };
    Ok((result, verdict))
}

/// Runs the check-version command.
pub fn run(client: &str, min_server: &str, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (result, verdict) = check(client, min_server)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => {
            let text = match verdict {
                Compatibility::Compatible => "compatible",
                Compatibility::ClientTooOld => "client too old",
                Compatibility::ServerTooOld => "server too old",
            };
            println!(
                "client {} / server {}: {}",
                result.client_version, result.server_version, text
            );
        }
    }
    Ok(())
}
