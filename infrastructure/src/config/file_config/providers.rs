//! Provider adapter definitions from TOML (`[providers.<name>]` sections)

use chorus_domain::LOCAL_PROVIDER;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const KIND_LOCAL: &str = "local";
pub const KIND_COMMAND: &str = "command";

/// One provider definition
///
/// # Example
///
/// ```toml
/// [providers.openai]
/// kind = "command"
/// command = "chorus-openai"
/// args = ["--stream=false"]
/// api_key_env = "OPENAI_API_KEY"
/// cost_per_1k_tokens = 0.005
/// timeout_seconds = 60
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// "local" or "command"
    pub kind: String,
    /// Program to run (command providers)
    pub command: Option<String>,
    pub args: Vec<String>,
    /// Environment variable that must be set for the provider to be available
    pub api_key_env: Option<String>,
    pub cost_per_1k_tokens: f64,
    pub timeout_seconds: u64,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            kind: KIND_COMMAND.to_string(),
            command: None,
            args: Vec::new(),
            api_key_env: None,
            cost_per_1k_tokens: 0.0,
            timeout_seconds: 60,
        }
    }
}

impl FileProviderConfig {
    pub fn local() -> Self {
        Self {
            kind: KIND_LOCAL.to_string(),
            ..Self::default()
        }
    }
}

/// The built-in provider set: just the offline responder
pub fn default_providers() -> BTreeMap<String, FileProviderConfig> {
    BTreeMap::from([(LOCAL_PROVIDER.to_string(), FileProviderConfig::local())])
}
