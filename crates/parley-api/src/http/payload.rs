//! Request payload decoding.
//!
//! The widget sends the same fields as a GET query string, a JSON body, or a
//! form-encoded body. All three are normalized into a [`RawPayload`] and then
//! validated into exactly one [`ChatRequest`]; nothing past this module sees
//! untyped input.

use std::collections::BTreeMap;

use serde_json::Value;

use parley_types::chat::ChatId;
use parley_types::config::DEFAULT_SERVICE_KEY;
use parley_types::error::ChatError;
use parley_types::request::{ChatRequest, ChatTarget, SendMessage};

/// Field name to value, before validation.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RawPayload(BTreeMap<String, Value>);

impl RawPayload {
    /// Decode a query string. `None` or empty yields an empty payload.
    pub fn from_query(query: Option<&str>) -> Result<Self, ChatError> {
        Self::from_form(query.unwrap_or_default().as_bytes())
    }

    /// Decode a POST body: JSON when it starts with `{` or `[`, form-encoded otherwise.
    pub fn from_body(body: &[u8]) -> Result<Self, ChatError> {
        let text = String::from_utf8_lossy(body);
        let trimmed = text.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            let value: Value = serde_json::from_str(trimmed).map_err(|e| {
                ChatError::Validation(format!("Invalid JSON in request body: {e}"))
            })?;
            return Ok(match value {
                Value::Object(fields) => Self(fields.into_iter().collect()),
                _ => Self::default(),
            });
        }
        Self::from_form(body)
    }

    fn from_form(raw: &[u8]) -> Result<Self, ChatError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(raw)
            .map_err(|e| ChatError::Validation(format!("Invalid form body: {e}")))?;
        // Repeated keys: last one wins.
        Ok(Self(
            pairs
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect(),
        ))
    }

    /// A scalar field as text. Objects, arrays and null count as absent.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    fn text_or_default(&self, key: &str) -> String {
        self.text(key).unwrap_or_default()
    }

    /// Boolean-like field; absent means false.
    pub fn flag(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(parse_bool_like)
    }

    /// `max_memory` as a window cap. Non-numeric input falls back to
    /// `default`; negative values mean no limit.
    pub fn max_memory(&self, default: u32) -> u32 {
        let parsed = match self.0.get("max_memory") {
            Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        match parsed {
            Some(n) => u32::try_from(n.max(0)).unwrap_or(u32::MAX),
            None => default,
        }
    }

    fn target(&self) -> Result<ChatTarget, ChatError> {
        Ok(ChatTarget {
            chat_id: ChatId::parse(&self.text_or_default("chat_id"))?,
            persistent: self.flag("persistent"),
        })
    }

    /// Validate into a typed request.
    pub fn into_request(self, default_max_memory: u32) -> Result<ChatRequest, ChatError> {
        let action = self.text_or_default("action");
        match action.trim() {
            "send_message" => {
                let message = self.text_or_default("message");
                let chat_id = self.text_or_default("chat_id");
                if message.trim().is_empty() || chat_id.trim().is_empty() {
                    return Err(ChatError::Validation(
                        "Missing required parameters".to_string(),
                    ));
                }
                let ai_service = self
                    .text("ai_service")
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_SERVICE_KEY.to_string());

                Ok(ChatRequest::SendMessage(SendMessage {
                    target: self.target()?,
                    message,
                    system_prompt: self.text_or_default("system_prompt"),
                    max_memory: self.max_memory(default_max_memory),
                    ai_service,
                }))
            }
            "load_chat" | "get_chat" => Ok(ChatRequest::LoadChat(self.target()?)),
            "clear_chat" => Ok(ChatRequest::ClearChat(self.target()?)),
            "get_available_services" => Ok(ChatRequest::ListServices),
            other => Err(ChatError::Validation(format!("Invalid action: {other}"))),
        }
    }
}

/// `true`, `"true"` (any case), `"1"`, or a non-zero number.
pub fn parse_bool_like(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => s.eq_ignore_ascii_case("true") || s == "1",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(body: &str) -> Result<ChatRequest, ChatError> {
        RawPayload::from_body(body.as_bytes())?.into_request(10)
    }

    fn validation_message(result: Result<ChatRequest, ChatError>) -> String {
        match result {
            Err(ChatError::Validation(message)) => message,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_bool_like() {
        let cases = [
            (json!(true), true),
            (json!(false), false),
            (json!("true"), true),
            (json!("TRUE"), true),
            (json!("1"), true),
            (json!("0"), false),
            (json!("yes"), false),
            (json!(""), false),
            (json!(1), true),
            (json!(0), false),
            (json!(null), false),
        ];
        for (value, expected) in cases {
            assert_eq!(parse_bool_like(&value), expected, "{value}");
        }
    }

    #[test]
    fn test_max_memory_parsing() {
        let cases = [
            (r#"{"max_memory": 4}"#, 4),
            (r#"{"max_memory": "6"}"#, 6),
            (r#"{"max_memory": " 8 "}"#, 8),
            (r#"{"max_memory": -3}"#, 0),
            (r#"{"max_memory": "lots"}"#, 10),
            (r#"{"max_memory": null}"#, 10),
            (r#"{}"#, 10),
        ];
        for (body, expected) in cases {
            let payload = RawPayload::from_body(body.as_bytes()).unwrap();
            assert_eq!(payload.max_memory(10), expected, "{body}");
        }
    }

    #[test]
    fn test_json_send_message() {
        let request = decode(
            r#"{"action":"send_message","chat_id":"c1","message":"Hi","system_prompt":"Be brief.",
                "max_memory":5,"persistent":"1","ai_service":"ramses"}"#,
        )
        .unwrap();
        let ChatRequest::SendMessage(send) = request else {
            panic!("expected send_message");
        };
        assert_eq!(send.target.chat_id.as_str(), "c1");
        assert!(send.target.persistent);
        assert_eq!(send.message, "Hi");
        assert_eq!(send.system_prompt, "Be brief.");
        assert_eq!(send.max_memory, 5);
        assert_eq!(send.ai_service, "ramses");
    }

    #[test]
    fn test_form_send_message_defaults() {
        let request = decode("action=send_message&chat_id=c1&message=Hello+there").unwrap();
        let ChatRequest::SendMessage(send) = request else {
            panic!("expected send_message");
        };
        assert_eq!(send.message, "Hello there");
        assert!(!send.target.persistent);
        assert_eq!(send.max_memory, 10);
        assert_eq!(send.system_prompt, "");
        assert_eq!(send.ai_service, "default");
    }

    #[test]
    fn test_query_load_chat_alias() {
        let payload = RawPayload::from_query(Some("action=get_chat&chat_id=c9&persistent=true")).unwrap();
        assert_eq!(
            payload.into_request(10).unwrap(),
            ChatRequest::LoadChat(ChatTarget {
                chat_id: ChatId::parse("c9").unwrap(),
                persistent: true,
            })
        );
    }

    #[test]
    fn test_numeric_chat_id_is_coerced() {
        let request = decode(r#"{"action":"clear_chat","chat_id":42}"#).unwrap();
        let ChatRequest::ClearChat(target) = request else {
            panic!("expected clear_chat");
        };
        assert_eq!(target.chat_id.as_str(), "42");
    }

    #[test]
    fn test_list_services_needs_no_chat_id() {
        assert_eq!(
            decode(r#"{"action":"get_available_services"}"#).unwrap(),
            ChatRequest::ListServices
        );
    }

    #[test]
    fn test_validation_messages() {
        let cases = [
            (r#"{"action":"send_message","chat_id":"c1","message":"  "}"#, "Missing required parameters"),
            (r#"{"action":"send_message","message":"Hi"}"#, "Missing required parameters"),
            (r#"{"action":"load_chat"}"#, "Missing chat_id parameter"),
            (r#"{"action":"clear_chat","chat_id":" "}"#, "Missing chat_id parameter"),
            (r#"{"action":"explode","chat_id":"c1"}"#, "Invalid action: explode"),
            (r#"{"chat_id":"c1"}"#, "Invalid action: "),
            ("[1,2,3]", "Invalid action: "),
        ];
        for (body, expected) in cases {
            assert_eq!(validation_message(decode(body)), expected, "{body}");
        }
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let message = validation_message(decode(r#"{"action": "#));
        assert!(message.starts_with("Invalid JSON in request body: "));
    }

    #[test]
    fn test_empty_query_is_empty_payload() {
        assert_eq!(RawPayload::from_query(None).unwrap(), RawPayload::default());
    }
}
