//! Request and response bodies exchanged with the browser client.
//!
//! The client drives the server with small JSON requests; run progress comes
//! back as an NDJSON stream of [`Event`](crate::events::Event)s.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// Identity the provisioner connects to the fleet with.
///
/// `Debug` never prints the key material.
#[derive(Clone, Serialize, Deserialize, TS)]
pub struct Credentials {
    /// Remote login user passed to the provisioner.
    pub username: String,

    /// PEM/OpenSSH private key text. Staged to disk only for one run.
    pub private_key: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            private_key: private_key.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Hosts to check for SSH reachability.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ProbeRequest {
    pub hosts: Vec<String>,

    /// TCP port to probe; defaults to 22.
    #[serde(default)]
    pub port: Option<u16>,
}

/// Outcome of probing one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct ProbeResult {
    pub host: String,
    pub port: u16,
    pub reachable: bool,
}

/// Generic acknowledgement body.
///
/// ```json
/// { "status": "success" }
/// { "status": "error", "error": "conflict", "message": "a run is already in progress" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct Reply {
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Reply {
    pub fn status(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            error: None,
            message: None,
        }
    }

    pub fn success() -> Self {
        Self::status("success")
    }

    pub fn error(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            error: Some(kind.into()),
            message: Some(message.into()),
        }
    }
}
