//! Provider adapters and registry construction

pub mod command;
pub mod local;

pub use command::CommandAdapter;
pub use local::LocalAdapter;

use crate::config::{FileConfig, KIND_COMMAND, KIND_LOCAL};
use chorus_application::AdapterRegistry;
use std::sync::Arc;
use tracing::{debug, warn};

/// Build the adapter registry from `[providers]`.
///
/// The offline responder is always installed as the fallback, whatever the
/// configuration says, so at least one backend is usable.
pub fn build_registry(config: &FileConfig) -> AdapterRegistry {
    let mut registry = AdapterRegistry::new().with_fallback(Arc::new(LocalAdapter::new()));

    for (name, provider) in &config.providers {
        match provider.kind.as_str() {
            KIND_LOCAL => registry.register(Arc::new(LocalAdapter::named(name.clone()))),
            KIND_COMMAND => match CommandAdapter::from_config(name, provider) {
                Some(adapter) => registry.register(Arc::new(adapter)),
                None => warn!("Provider {} has no command, skipping", name),
            },
            other => warn!("Provider {} has unknown kind '{}', skipping", name, other),
        }
    }

    debug!("Registered providers: {:?}", registry.providers());
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FileProviderConfig;
    use chorus_domain::LOCAL_PROVIDER;

    #[test]
    fn test_default_registry_has_local_and_fallback() {
        let registry = build_registry(&FileConfig::default());
        assert_eq!(registry.providers(), vec![LOCAL_PROVIDER.to_string()]);
        assert!(registry.fallback().is_some());
    }

    #[test]
    fn test_invalid_providers_skipped() {
        let mut config = FileConfig::default();
        config.providers.clear();
        config.providers.insert(
            "openai".to_string(),
            FileProviderConfig {
                command: Some("chorus-openai".to_string()),
                ..FileProviderConfig::default()
            },
        );
        config.providers.insert("empty".to_string(), FileProviderConfig::default());
        config.providers.insert(
            "grpc".to_string(),
            FileProviderConfig {
                kind: "grpc".to_string(),
                ..FileProviderConfig::default()
            },
        );

        let registry = build_registry(&config);
        assert_eq!(registry.providers(), vec!["openai".to_string()]);
        // fallback survives an empty provider table
        assert!(!registry.is_empty());
    }
}
