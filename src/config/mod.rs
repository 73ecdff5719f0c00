mod transport;
mod validation;

use crate::cli::ConnectionArgs;
use crate::error::{Result, ScoutError};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use transport::{TransportConfig, TransportKind};
pub use validation::{expand_header_value, expand_headers};

/// Wire header carrying the API key on kaleido-hosted FDA servers.
pub const AUTH_KEY_HEADER: &str = "emcp-key";
/// Wire header carrying the user code.
pub const AUTH_USERCODE_HEADER: &str = "emcp-usercode";

const DEFAULT_READ_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServerFileConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub transport: Option<String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub connect_timeout: Option<u64>,
    #[serde(default)]
    pub read_timeout: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionFileConfig {
    #[serde(default)]
    pub verbose: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerFileConfig,
    #[serde(default)]
    pub session: SessionFileConfig,
}

impl FileConfig {
    pub fn load() -> anyhow::Result<Self> {
        for path in Self::config_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        Ok(FileConfig::default())
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: FileConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // Local override first
        paths.push(PathBuf::from(".drugscout.yaml"));
        paths.push(PathBuf::from(".drugscout.yml"));

        // Then the user's global config
        if let Some(home_dir) = dirs::home_dir() {
            let config_dir = home_dir.join(".config").join("drugscout");
            paths.push(config_dir.join("drugscout.yaml"));
            paths.push(config_dir.join("drugscout.yml"));
        }

        paths
    }
}

pub struct ScoutConfig {
    pub transport: TransportConfig,
    pub verbose: bool,
}

impl ScoutConfig {
    /// Resolve the effective configuration: CLI args > environment > YAML
    /// config file > defaults.
    pub fn from_env_and_args(args: &ConnectionArgs) -> Result<Self> {
        let file = FileConfig::load().unwrap_or_default();
        Self::resolve(args, &file)
    }

    /// Same precedence chain with the file layer injected, so tests do not
    /// have to write to the real config paths.
    pub fn resolve(args: &ConnectionArgs, file: &FileConfig) -> Result<Self> {
        let kind_name = args
            .transport
            .clone()
            .or_else(|| env::var("DRUGSCOUT_TRANSPORT").ok())
            .or_else(|| file.server.transport.clone())
            .unwrap_or_else(|| "http".to_string());
        let kind = TransportKind::parse(&kind_name)?;

        let endpoint = args
            .endpoint
            .clone()
            .or_else(|| env::var("DRUGSCOUT_ENDPOINT").ok())
            .or_else(|| file.server.endpoint.clone())
            .ok_or_else(|| {
                ScoutError::Config(
                    "no endpoint configured: pass --endpoint, set DRUGSCOUT_ENDPOINT, \
                     or add server.endpoint to .drugscout.yaml"
                        .to_string(),
                )
            })?;

        // Header values from the file may reference ${VAR}; the dedicated
        // auth env vars win over file entries for the same header.
        let mut headers = expand_headers(&file.server.headers);
        if let Ok(key) = env::var("DRUGSCOUT_AUTH_KEY") {
            headers.insert(AUTH_KEY_HEADER.to_string(), key);
        }
        if let Ok(usercode) = env::var("DRUGSCOUT_AUTH_USERCODE") {
            headers.insert(AUTH_USERCODE_HEADER.to_string(), usercode);
        }

        let connect_timeout = args
            .connect_timeout
            .or_else(|| parse_secs_env("DRUGSCOUT_CONNECT_TIMEOUT"))
            .or(file.server.connect_timeout)
            .map(Duration::from_secs)
            .unwrap_or_else(|| kind.default_connect_timeout());

        let read_timeout = args
            .read_timeout
            .or_else(|| parse_secs_env("DRUGSCOUT_READ_TIMEOUT"))
            .or(file.server.read_timeout)
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_READ_TIMEOUT_SECS));

        let verbose = args.verbose
            || env::var("DRUGSCOUT_VERBOSE")
                .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
                .unwrap_or(false)
            || file.session.verbose.unwrap_or(false);

        let transport =
            TransportConfig::new(kind, &endpoint, headers, connect_timeout, read_timeout)?;

        Ok(ScoutConfig { transport, verbose })
    }
}

fn parse_secs_env(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|s| s.parse::<u64>().ok())
}
