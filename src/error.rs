use std::fmt;

#[derive(Debug)]
pub enum ScoutError {
    /// Malformed transport configuration. Fatal before any connection attempt.
    Config(String),
    /// Network or HTTP failure while reaching the server.
    Connection(String),
    /// The server rejected our credentials (HTTP 401/403).
    Auth(String),
    /// A handshake or read deadline elapsed.
    Timeout(String),
    /// Client-side argument validation failed before the request was sent.
    Validation { tool: String, message: String },
    /// JSON-RPC error reported by the server.
    Rpc { code: i64, message: String },
    /// The server sent something that does not fit the protocol.
    Protocol(String),
    Network(reqwest::Error),
    Json(serde_json::Error),
    Yaml(serde_yaml::Error),
    Io(std::io::Error),
}

impl fmt::Display for ScoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoutError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ScoutError::Connection(msg) => write!(f, "Connection error: {}", msg),
            ScoutError::Auth(msg) => write!(f, "Authentication rejected: {}", msg),
            ScoutError::Timeout(msg) => write!(f, "Timed out: {}", msg),
            ScoutError::Validation { tool, message } => {
                write!(f, "Invalid arguments for tool '{}': {}", tool, message)
            }
            ScoutError::Rpc { code, message } => {
                write!(f, "Server error {}: {}", code, message)
            }
            ScoutError::Protocol(msg) => write!(f, "Protocol error: {}", msg),
            ScoutError::Network(e) => write!(f, "Network error: {}", e),
            ScoutError::Json(e) => write!(f, "JSON error: {}", e),
            ScoutError::Yaml(e) => write!(f, "YAML error: {}", e),
            ScoutError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ScoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScoutError::Network(e) => Some(e),
            ScoutError::Json(e) => Some(e),
            ScoutError::Yaml(e) => Some(e),
            ScoutError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ScoutError {
    fn from(err: reqwest::Error) -> Self {
        ScoutError::Network(err)
    }
}

impl From<serde_json::Error> for ScoutError {
    fn from(err: serde_json::Error) -> Self {
        ScoutError::Json(err)
    }
}

impl From<serde_yaml::Error> for ScoutError {
    fn from(err: serde_yaml::Error) -> Self {
        ScoutError::Yaml(err)
    }
}

impl From<std::io::Error> for ScoutError {
    fn from(err: std::io::Error) -> Self {
        ScoutError::Io(err)
    }
}

impl From<anyhow::Error> for ScoutError {
    fn from(err: anyhow::Error) -> Self {
        ScoutError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ScoutError>;
