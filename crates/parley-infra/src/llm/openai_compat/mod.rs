//! OpenAI-compatible chat completions provider.
//!
//! One implementation serves every configured service (OpenAI, RAMSES,
//! Ollama, GWDG, ...): they differ only in base URL, model and credential.
//! Requests go to `{base_url}/chat/completions` with a bearer token when one
//! is configured.
//!
//! The API key is held as a [`SecretString`] and only exposed when building
//! the `Authorization` header.

pub mod config;
pub(crate) mod streaming;
pub(crate) mod types;

use secrecy::{ExposeSecret, SecretString};

use parley_core::llm::provider::{ChatProvider, ChunkSender};
use parley_types::error::ProviderError;
use parley_types::llm::{Delivery, PromptMessage};

use self::config::OpenAiCompatConfig;
use self::streaming::read_event_stream;
use self::types::{ChatCompletionRequest, ChatCompletionResponse, ErrorEnvelope};

/// Provider for any endpoint speaking the OpenAI chat completions protocol.
pub struct OpenAiCompatProvider {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
    name: String,
    model: String,
    temperature: f64,
    delivery: Delivery,
}

impl OpenAiCompatProvider {
    /// Build the provider and its HTTP client.
    ///
    /// Fails when the CA bundle cannot be read or parsed, or the proxy URL is invalid.
    pub fn new(config: OpenAiCompatConfig) -> Result<Self, String> {
        let mut builder = reqwest::Client::builder().timeout(config.timeout);

        if let Some(path) = &config.ca_cert_path {
            let pem = std::fs::read(path)
                .map_err(|e| format!("failed to read CA bundle {}: {e}", path.display()))?;
            let cert = reqwest::Certificate::from_pem(&pem)
                .map_err(|e| format!("invalid CA bundle {}: {e}", path.display()))?;
            builder = builder.add_root_certificate(cert);
        }
        if let Some(proxy) = &config.proxy {
            let proxy =
                reqwest::Proxy::all(proxy).map_err(|e| format!("invalid proxy '{proxy}': {e}"))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| format!("failed to create HTTP client: {e}"))?;

        Ok(Self {
            client,
            api_key: config.api_key,
            base_url: config.base_url,
            name: config.provider_name,
            model: config.model,
            temperature: config.temperature,
            delivery: config.delivery,
        })
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    async fn post(&self, window: &[PromptMessage]) -> Result<reqwest::Response, ProviderError> {
        let body = ChatCompletionRequest {
            messages: window,
            model: &self.model,
            temperature: self.temperature,
            stream: self.delivery == Delivery::Streaming,
        };

        let mut request = self.client.post(self.url()).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }
        if body.stream {
            request = request.header(reqwest::header::ACCEPT, "text/event-stream");
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(response)
    }

    async fn read_buffered(
        response: reqwest::Response,
        forward: Option<&ChunkSender>,
    ) -> Result<String, ProviderError> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if let Some(tx) = forward {
            tx.send(bytes.to_vec())
                .await
                .map_err(|_| ProviderError::Disconnected)?;
        }

        let parsed: ChatCompletionResponse = serde_json::from_slice(&bytes)
            .map_err(|e| ProviderError::Protocol(format!("invalid JSON response: {e}")))?;
        parsed
            .into_content()
            .ok_or_else(|| ProviderError::Protocol("unexpected response structure".to_string()))
    }
}

impl ChatProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn delivery(&self) -> Delivery {
        self.delivery
    }

    async fn complete(
        &self,
        window: &[PromptMessage],
        forward: Option<&ChunkSender>,
    ) -> Result<String, ProviderError> {
        let response = self.post(window).await?;
        match self.delivery {
            Delivery::Buffered => Self::read_buffered(response, forward).await,
            Delivery::Streaming => read_event_stream(response, forward).await,
        }
    }
}

/// Map a non-2xx response to a [`ProviderError`].
///
/// The message comes from the body's `error.message` (or a string `error`),
/// falling back to `HTTP {status}`.
async fn error_from_response(response: reqwest::Response) -> ProviderError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .ok()
        .and_then(ErrorEnvelope::message)
        .unwrap_or_else(|| format!("HTTP {status}"));

    tracing::debug!(status, "provider returned an error response");
    match status {
        401 => ProviderError::Auth { message },
        _ => ProviderError::Http { status, message },
    }
}
