//! Provider failure classification

use serde::{Deserialize, Serialize};

/// Why a provider call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    /// Provider has no credentials / is not set up
    Configuration,
    /// Authentication or payment rejected (401/402/403)
    Auth,
    /// Rate limited (429)
    RateLimit,
    /// Provider-side error (>= 500)
    Server,
    /// Timeout or connection failure
    Transport,
    /// Malformed request; another provider would reject it too
    Client,
}

impl FailureClass {
    /// Classify an HTTP-like status code
    pub fn from_status(status: u16) -> Self {
        match status {
            401..=403 => FailureClass::Auth,
            429 => FailureClass::RateLimit,
            500.. => FailureClass::Server,
            _ => FailureClass::Client,
        }
    }

    /// Whether the failure should rotate to the next provider serving the same model
    pub fn triggers_rotation(&self) -> bool {
        matches!(
            self,
            FailureClass::Auth
                | FailureClass::RateLimit
                | FailureClass::Server
                | FailureClass::Transport
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            FailureClass::Configuration => "configuration",
            FailureClass::Auth => "auth",
            FailureClass::RateLimit => "rate_limit",
            FailureClass::Server => "server",
            FailureClass::Transport => "transport",
            FailureClass::Client => "client",
        }
    }
}

impl std::fmt::Display for FailureClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
