//! Provider registry for runtime provider lookup.
//!
//! Maps service keys (the `ai_service` request field) to boxed providers.
//! The `default` pseudo-key resolves to an explicitly configured provider;
//! there is no implicit fallback.

use std::collections::BTreeMap;

use parley_types::config::{DEFAULT_SERVICE_KEY, DEFAULT_SERVICE_LABEL};
use parley_types::error::ChatError;

use super::box_provider::BoxChatProvider;

struct RegisteredProvider {
    label: String,
    provider: BoxChatProvider,
}

/// Registry of available providers, indexed by service key.
pub struct ProviderRegistry {
    providers: BTreeMap<String, RegisteredProvider>,
    default_key: Option<String>,
}

impl ProviderRegistry {
    /// Create an empty registry with no default.
    pub fn new() -> Self {
        Self {
            providers: BTreeMap::new(),
            default_key: None,
        }
    }

    /// Register a provider under `key`, replacing any previous one.
    pub fn register(
        &mut self,
        key: impl Into<String>,
        label: impl Into<String>,
        provider: BoxChatProvider,
    ) {
        self.providers.insert(
            key.into(),
            RegisteredProvider {
                label: label.into(),
                provider,
            },
        );
    }

    /// Set the key that `default` resolves to.
    pub fn set_default(&mut self, key: Option<String>) {
        self.default_key = key;
    }

    pub fn default_key(&self) -> Option<&str> {
        self.default_key.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&BoxChatProvider> {
        self.providers.get(key).map(|entry| &entry.provider)
    }

    pub fn list_names(&self) -> Vec<&str> {
        self.providers.keys().map(|s| s.as_str()).collect()
    }

    /// Resolve a request's `ai_service` value to a provider.
    ///
    /// Blank or `default` uses the configured default key. An unknown
    /// explicit key is a validation error; a missing default is a
    /// configuration error.
    pub fn resolve(&self, service: &str) -> Result<(&str, &BoxChatProvider), ChatError> {
        let service = service.trim();
        if service.is_empty() || service == DEFAULT_SERVICE_KEY {
            return self
                .default_key
                .as_deref()
                .and_then(|key| self.providers.get_key_value(key))
                .map(|(key, entry)| (key.as_str(), &entry.provider))
                .ok_or_else(|| ChatError::Config("No AI service configured".to_string()));
        }

        self.providers
            .get_key_value(service)
            .map(|(key, entry)| (key.as_str(), &entry.provider))
            .ok_or_else(|| ChatError::Validation(format!("Unknown AI service: {service}")))
    }

    /// Service picker entries. Always contains `default`.
    pub fn available_services(&self) -> BTreeMap<String, String> {
        let mut services = BTreeMap::new();
        services.insert(
            DEFAULT_SERVICE_KEY.to_string(),
            DEFAULT_SERVICE_LABEL.to_string(),
        );
        for (key, entry) in &self.providers {
            services.insert(key.clone(), entry.label.clone());
        }
        services
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;

    fn registry() -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        registry.register(
            "openai",
            "OpenAI GPT",
            BoxChatProvider::new(ScriptedProvider::replying("a")),
        );
        registry.register(
            "ramses",
            "RAMSES",
            BoxChatProvider::new(ScriptedProvider::replying("b")),
        );
        registry
    }

    #[test]
    fn test_empty_registry_still_lists_default() {
        let services = ProviderRegistry::new().available_services();
        assert_eq!(services.len(), 1);
        assert_eq!(services["default"], "Use Global Default");
    }

    #[test]
    fn test_services_include_labels() {
        let services = registry().available_services();
        assert_eq!(services["openai"], "OpenAI GPT");
        assert_eq!(services["ramses"], "RAMSES");
        assert!(services.contains_key("default"));
    }

    #[test]
    fn test_default_resolves_to_configured_key() {
        let mut registry = registry();
        registry.set_default(Some("ramses".to_string()));
        let (key, _) = registry.resolve("default").unwrap();
        assert_eq!(key, "ramses");
        let (key, _) = registry.resolve("").unwrap();
        assert_eq!(key, "ramses");
        let (key, _) = registry.resolve("openai").unwrap();
        assert_eq!(key, "openai");
    }

    #[test]
    fn test_missing_default_is_config_error() {
        let registry = registry();
        assert!(matches!(
            registry.resolve("default"),
            Err(ChatError::Config(_))
        ));

        let mut dangling = super::ProviderRegistry::new();
        dangling.set_default(Some("gone".to_string()));
        assert!(matches!(dangling.resolve("default"), Err(ChatError::Config(_))));
    }

    #[test]
    fn test_unknown_key_is_validation_error() {
        let err = registry().resolve("gpt5").err().unwrap();
        assert!(matches!(err, ChatError::Validation(_)));
        assert_eq!(err.to_string(), "Unknown AI service: gpt5");
    }

    #[test]
    fn test_list_names_sorted() {
        assert_eq!(registry().list_names(), vec!["openai", "ramses"]);
    }
}
