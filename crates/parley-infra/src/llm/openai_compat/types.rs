//! Wire types for the OpenAI chat completions protocol.
//!
//! Only the fields the service reads or writes are modelled.

use serde::{Deserialize, Serialize};

use parley_types::llm::PromptMessage;

/// Request body for `POST {base_url}/chat/completions`.
#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest<'a> {
    pub messages: &'a [PromptMessage],
    pub model: &'a str,
    pub temperature: f64,
    pub stream: bool,
}

/// Buffered response body. Everything is optional so that a structurally
/// wrong body is reported as a protocol error rather than a parse error.
#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// `choices[0].message.content`, if present.
    pub fn into_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
    }
}

/// Error body of a non-2xx response.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorDetail {
    Object { message: Option<String> },
    Text(String),
}

impl ErrorEnvelope {
    pub fn message(self) -> Option<String> {
        let message = match self.error {
            ErrorDetail::Object { message } => message,
            ErrorDetail::Text(text) => Some(text),
        };
        message.filter(|m| !m.trim().is_empty())
    }
}
