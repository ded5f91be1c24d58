//! Configuration issues reported by validation.
//!
//! Validation never aborts loading: every problem is collected as a
//! [`ConfigIssue`] and the caller decides what to do with it.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A command provider has no program to run.
    EmptyProviderCommand { provider: String },
    /// A provider declares a kind nobody implements.
    UnknownProviderKind { provider: String, kind: String },
    /// An equivalence row names a provider that is not defined.
    UndefinedProvider { model: String, provider: String },
    /// A candidate lists an unrecognized capability tag.
    UnknownCapability { backend: String, value: String },
    /// The SLA error threshold is zero, which disables error gating.
    ZeroErrorThreshold,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
