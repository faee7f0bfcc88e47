//! Connection settings for an OpenAI-compatible provider.
//!
//! [`OpenAiCompatConfig`] is the resolved form of one `[providers.<key>]`
//! table: presets applied, credential looked up, URL normalized.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use parley_types::config::ProviderSettings;
use parley_types::llm::Delivery;

/// Configuration for an [`super::OpenAiCompatProvider`].
pub struct OpenAiCompatConfig {
    /// Service key (e.g. "openai", "ramses").
    pub provider_name: String,
    /// Base URL up to the API version, without trailing slash.
    pub base_url: String,
    /// Bearer credential. Local servers such as Ollama may need none.
    pub api_key: Option<SecretString>,
    pub model: String,
    pub temperature: f64,
    pub delivery: Delivery,
    pub timeout: Duration,
    pub ca_cert_path: Option<PathBuf>,
    pub proxy: Option<String>,
}

impl OpenAiCompatConfig {
    /// Minimal config with default temperature, buffered delivery and a 120s timeout.
    pub fn new(provider_name: &str, base_url: &str, model: &str) -> Self {
        Self {
            provider_name: provider_name.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
            model: model.to_string(),
            temperature: 0.5,
            delivery: Delivery::Buffered,
            timeout: Duration::from_secs(120),
            ca_cert_path: None,
            proxy: None,
        }
    }

    pub fn with_api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn with_delivery(mut self, delivery: Delivery) -> Self {
        self.delivery = delivery;
        self
    }

    /// Resolve `[providers.<key>]` against the built-in presets.
    ///
    /// Errors name the missing setting.
    pub fn from_settings(
        key: &str,
        settings: &ProviderSettings,
        api_key: Option<SecretString>,
    ) -> Result<Self, String> {
        let base_url = settings
            .base_url_for(key)
            .ok_or_else(|| format!("provider '{key}' has no base_url"))?;
        let model = settings
            .model_for(key)
            .ok_or_else(|| format!("provider '{key}' has no model"))?;

        let mut config = Self::new(key, &base_url, &model);
        config.api_key = api_key;
        config.temperature = settings.temperature;
        config.delivery = if settings.streaming {
            Delivery::Streaming
        } else {
            Delivery::Buffered
        };
        config.timeout = Duration::from_secs(settings.timeout_secs);
        config.ca_cert_path = settings.ca_cert_path.clone();
        config.proxy = settings.proxy.clone();
        Ok(config)
    }
}
