//! LLM provider implementations.
//!
//! Every configured service speaks the OpenAI chat completions protocol, so
//! there is a single concrete provider ([`OpenAiCompatProvider`]). This module
//! turns `[providers.*]` config tables into a [`ProviderRegistry`].

pub mod openai_compat;

use secrecy::SecretString;

use parley_core::llm::box_provider::BoxChatProvider;
use parley_core::llm::registry::ProviderRegistry;
use parley_types::config::{ProviderSettings, ServiceConfig};
use parley_types::error::ChatError;

use self::openai_compat::OpenAiCompatProvider;
use self::openai_compat::config::OpenAiCompatConfig;

/// Resolve the credential for a provider.
///
/// `api_key_env` wins over an inline `api_key`. Blank values count as absent.
fn resolve_api_key(settings: &ProviderSettings) -> Option<SecretString> {
    let non_blank = |key: &String| !key.trim().is_empty();
    let from_env = settings
        .api_key_env
        .as_deref()
        .and_then(|var| std::env::var(var).ok())
        .filter(non_blank);

    from_env
        .or_else(|| settings.api_key.clone().filter(non_blank))
        .map(SecretString::from)
}

/// Create a [`BoxChatProvider`] for the service `key`.
///
/// # Errors
///
/// Returns [`ChatError::Config`] when the base URL or model cannot be
/// resolved, or the HTTP client cannot be built.
pub fn create_provider(key: &str, settings: &ProviderSettings) -> Result<BoxChatProvider, ChatError> {
    let api_key = resolve_api_key(settings);
    if api_key.is_none() {
        tracing::debug!(provider = key, "no API key configured, sending unauthenticated requests");
    }

    let config =
        OpenAiCompatConfig::from_settings(key, settings, api_key).map_err(ChatError::Config)?;
    let provider = OpenAiCompatProvider::new(config).map_err(ChatError::Config)?;
    Ok(BoxChatProvider::new(provider))
}

/// Build the registry from every enabled provider in `config`.
///
/// A provider that fails to build is skipped with a warning so one broken
/// table does not take the service down. `default_provider` is applied as
/// configured; [`ProviderRegistry::resolve`] reports it when unusable.
pub fn build_registry(config: &ServiceConfig) -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();

    for (key, settings) in &config.providers {
        if !settings.enabled {
            tracing::debug!(provider = %key, "provider disabled, skipping");
            continue;
        }
        match create_provider(key, settings) {
            Ok(provider) => {
                tracing::info!(provider = %key, model = provider.model(), "registered provider");
                registry.register(key.clone(), settings.label_for(key), provider);
            }
            Err(err) => {
                tracing::warn!(provider = %key, error = %err, "skipping provider");
            }
        }
    }

    match config.default_provider.as_deref() {
        Some(key) if registry.get(key).is_none() => {
            tracing::warn!(provider = key, "default provider is not registered");
        }
        None => tracing::warn!("no default_provider configured"),
        _ => {}
    }
    registry.set_default(config.default_provider.clone());
    registry
}
