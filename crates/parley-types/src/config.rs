//! Service configuration types for Parley.
//!
//! `ServiceConfig` is the top-level `config.toml`. It is loaded once at
//! startup and handed to every component that needs it.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Label of the pseudo-service that resolves to `default_provider`.
pub const DEFAULT_SERVICE_KEY: &str = "default";
pub const DEFAULT_SERVICE_LABEL: &str = "Use Global Default";

/// Top-level configuration for the chat service.
///
/// All fields have sensible defaults, so an empty file is valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// SQLite URL for the durable store. Resolved from the data dir when unset.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Provider key that `ai_service = "default"` resolves to.
    #[serde(default)]
    pub default_provider: Option<String>,

    /// Window cap used when a request does not carry `max_memory`.
    #[serde(default = "default_max_memory")]
    pub default_max_memory: u32,

    /// Ephemeral sessions idle longer than this are dropped. 0 disables eviction.
    #[serde(default = "default_session_idle_timeout_secs")]
    pub session_idle_timeout_secs: u64,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    /// Named providers, keyed by the `ai_service` value that selects them.
    #[serde(default)]
    pub providers: BTreeMap<String, ProviderSettings>,
}

fn default_max_memory() -> u32 {
    10
}

fn default_session_idle_timeout_secs() -> u64 {
    3600
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            default_provider: None,
            default_max_memory: default_max_memory(),
            session_idle_timeout_secs: default_session_idle_timeout_secs(),
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            providers: BTreeMap::new(),
        }
    }
}

impl ServiceConfig {
    /// Idle timeout for ephemeral sessions, or `None` when eviction is off.
    pub fn session_idle_timeout(&self) -> Option<Duration> {
        (self.session_idle_timeout_secs > 0)
            .then(|| Duration::from_secs(self.session_idle_timeout_secs))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// How the host application proves it is the one forwarding identities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Environment variable holding the shared host token. When unset,
    /// identity headers are trusted as-is.
    #[serde(default)]
    pub host_token_env: Option<String>,
}

/// Settings for one OpenAI-compatible provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default)]
    pub label: Option<String>,

    /// Base URL up to and including the API version, e.g. `https://api.openai.com/v1`.
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Ask the provider for server-sent events instead of one JSON document.
    #[serde(default)]
    pub streaming: bool,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Environment variable holding the bearer credential.
    #[serde(default)]
    pub api_key_env: Option<String>,

    /// Inline credential. Prefer `api_key_env`.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra PEM root certificate for providers behind a private CA.
    #[serde(default)]
    pub ca_cert_path: Option<PathBuf>,

    /// HTTP(S) proxy URL.
    #[serde(default)]
    pub proxy: Option<String>,
}

fn default_temperature() -> f64 {
    0.5
}

fn default_enabled() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            label: None,
            base_url: None,
            model: None,
            temperature: default_temperature(),
            streaming: false,
            enabled: default_enabled(),
            api_key_env: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
            ca_cert_path: None,
            proxy: None,
        }
    }
}

/// Built-in defaults for well-known provider keys.
struct Preset {
    key: &'static str,
    label: &'static str,
    base_url: Option<&'static str>,
    model: Option<&'static str>,
}

const PRESETS: &[Preset] = &[
    Preset {
        key: "openai",
        label: "OpenAI GPT",
        base_url: Some("https://api.openai.com/v1"),
        model: Some("gpt-4o-mini"),
    },
    Preset {
        key: "ramses",
        label: "RAMSES",
        base_url: Some("https://ramses-oski.itcc.uni-koeln.de/v1"),
        model: Some("mistral-small-3-2-24b-instruct-2506"),
    },
    Preset {
        key: "ollama",
        label: "Ollama",
        base_url: Some("http://localhost:11434/v1"),
        model: None,
    },
    Preset {
        key: "gwdg",
        label: "GWDG",
        base_url: None,
        model: None,
    },
];

fn preset(key: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.key == key)
}

impl ProviderSettings {
    /// Label shown in the widget's service picker.
    pub fn label_for(&self, key: &str) -> String {
        self.label
            .clone()
            .or_else(|| preset(key).map(|p| p.label.to_string()))
            .unwrap_or_else(|| key.to_string())
    }

    pub fn base_url_for(&self, key: &str) -> Option<String> {
        self.base_url
            .clone()
            .or_else(|| preset(key).and_then(|p| p.base_url).map(str::to_string))
    }

    pub fn model_for(&self, key: &str) -> Option<String> {
        self.model
            .clone()
            .or_else(|| preset(key).and_then(|p| p.model).map(str::to_string))
    }
}
