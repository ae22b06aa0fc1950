use futures_util::future::BoxFuture;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Prefix on every assistant message produced from a failed request
pub const ERROR_PREFIX: &str = "Erro:";

/// Body posted to the generation endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateRequest {
    pub prompt: String,
    /// Empty until the server has assigned a conversation
    pub chat_id: String,
}

/// How one request ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 2xx with a reply, and the conversation id if the server sent one
    Reply { text: String, chat_id: Option<String> },
    /// The body could not be read as the expected JSON object
    DecodeError { status: u16 },
    /// Non-2xx status, with the server's error message when it gave one
    ServerError { status: u16, message: Option<String> },
    /// The request never produced a response
    TransportError { message: String },
}

impl Outcome {
    pub fn is_error(&self) -> bool {
        !matches!(self, Outcome::Reply { .. })
    }

    /// Text the assistant placeholder is replaced with
    pub fn display_text(&self) -> String {
        match self {
            Outcome::Reply { text, .. } => text.clone(),
            Outcome::DecodeError { status } => {
                format!("{} HTTP {}: invalid server response", ERROR_PREFIX, status)
            }
            Outcome::ServerError {
                message: Some(message),
                ..
            } => format!("{} {}", ERROR_PREFIX, message),
            Outcome::ServerError {
                status,
                message: None,
            } => format!("{} HTTP {}: request failed", ERROR_PREFIX, status),
            Outcome::TransportError { message } => format!("{} {}", ERROR_PREFIX, message),
        }
    }
}

fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Conversation ids are opaque; accept numbers as well as strings
fn chat_id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Turn a status code and raw body into an `Outcome`.
///
/// The body is parsed as JSON whatever the status is. Fields are read
/// individually, so a field of an unexpected type only loses that field.
pub fn classify(status: u16, body: &[u8]) -> Outcome {
    let parsed: Value = match serde_json::from_slice(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!(status, error = %e, "response body is not JSON");
            return Outcome::DecodeError { status };
        }
    };

    if !(200..300).contains(&status) {
        let message = ["error", "detail"]
            .into_iter()
            .find_map(|field| parsed.get(field).and_then(message_text));
        return Outcome::ServerError { status, message };
    }

    match parsed.get("response").and_then(Value::as_str) {
        Some(text) => Outcome::Reply {
            text: text.to_string(),
            chat_id: parsed.get("chat_id").and_then(chat_id_text),
        },
        None => {
            debug!(status, "success body has no string response field");
            Outcome::DecodeError { status }
        }
    }
}

/// Something that can answer a prompt.
///
/// The returned future owns everything it needs so it can be spawned.
pub trait Backend {
    fn generate(&self, request: GenerateRequest) -> BoxFuture<'static, Outcome>;
}

#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    endpoint: String,
}

impl HttpBackend {
    pub fn with_client(client: Client, endpoint: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Backend for HttpBackend {
    fn generate(&self, request: GenerateRequest) -> BoxFuture<'static, Outcome> {
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();

        Box::pin(async move {
            let response = match client.post(&endpoint).json(&request).send().await {
                Ok(response) => response,
                Err(e) => {
                    warn!(%endpoint, error = %e, "request failed before a response arrived");
                    return Outcome::TransportError {
                        message: e.to_string(),
                    };
                }
            };

            let status = response.status().as_u16();
            match response.bytes().await {
                Ok(body) => classify(status, &body),
                Err(e) => {
                    warn!(status, error = %e, "could not read response body");
                    Outcome::DecodeError { status }
                }
            }
        })
    }
}
