//! Backend catalog value objects
//!
//! A backend is one selectable model. Which providers can actually serve it is
//! decided by the [`EquivalenceTable`](crate::reliability::EquivalenceTable).

use serde::{Deserialize, Serialize};

/// Name of the guaranteed-available offline backend.
pub const LOCAL_FALLBACK_BACKEND: &str = "local-fallback";

/// Name of the provider that serves offline backends.
pub const LOCAL_PROVIDER: &str = "local";

/// Vendor and family tokens that must never leak into a final answer.
pub const VENDOR_IDENTITY_TOKENS: &[&str] = &[
    "openai",
    "anthropic",
    "google",
    "deepmind",
    "gemini",
    "claude",
    "chatgpt",
    "gpt",
    "mistral",
    "llama",
    "meta ai",
    "cohere",
    "deepseek",
];

/// Capability tags used by the router's keyword heuristics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Good at writing and explaining code
    Code,
    /// Strong multi-step reasoning and math
    Reasoning,
    /// Open-ended or creative writing
    Creative,
    /// Runs locally without network access
    Offline,
}

impl Capability {
    pub fn as_str(&self) -> &str {
        match self {
            Capability::Code => "code",
            Capability::Reasoning => "reasoning",
            Capability::Creative => "creative",
            Capability::Offline => "offline",
        }
    }

    /// Query keywords that make a backend with this capability more relevant
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Capability::Code => &[
                "code",
                "algorithm",
                "function",
                "compile",
                "debug",
                "rust",
                "python",
                "api",
            ],
            Capability::Reasoning => &["prove", "proof", "math", "calculate", "derive", "logic"],
            Capability::Creative => &["story", "poem", "creative", "brainstorm", "slogan"],
            Capability::Offline => &[],
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "code" => Ok(Capability::Code),
            "reasoning" => Ok(Capability::Reasoning),
            "creative" => Ok(Capability::Creative),
            "offline" | "local" => Ok(Capability::Offline),
            other => Err(format!("unknown capability '{}'", other)),
        }
    }
}

/// A routable backend and what it is good at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendProfile {
    /// Canonical backend (model) name, e.g. "gpt-4o"
    pub name: String,
    /// Capability tags
    #[serde(default)]
    pub capabilities: Vec<Capability>,
}

impl BackendProfile {
    pub fn new(name: impl Into<String>, capabilities: Vec<Capability>) -> Self {
        Self {
            name: name.into(),
            capabilities,
        }
    }

    /// Profile for a backend known only by name (e.g. seen in a scorecard)
    pub fn unknown(name: impl Into<String>) -> Self {
        let name = name.into();
        let capabilities = if is_local_name(&name) {
            vec![Capability::Offline]
        } else {
            Vec::new()
        };
        Self { name, capabilities }
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Whether this backend runs locally / offline
    pub fn is_local(&self) -> bool {
        self.has(Capability::Offline) || is_local_name(&self.name)
    }

    /// The fixed default candidate set
    pub fn default_candidates() -> Vec<BackendProfile> {
        vec![
            BackendProfile::new("gpt-4o", vec![Capability::Code, Capability::Reasoning]),
            BackendProfile::new(
                "claude-3-5-sonnet",
                vec![Capability::Code, Capability::Reasoning, Capability::Creative],
            ),
            BackendProfile::new(
                "gemini-1.5-pro",
                vec![Capability::Reasoning, Capability::Creative],
            ),
            BackendProfile::new("mistral-large", vec![Capability::Code]),
            BackendProfile::new("llama-3-8b-local", vec![Capability::Offline]),
        ]
    }
}

fn is_local_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower == LOCAL_FALLBACK_BACKEND || lower.ends_with("-local") || lower.starts_with("local")
}
