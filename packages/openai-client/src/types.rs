//! OpenAI API request and response types.

use serde::{Deserialize, Serialize};

// =============================================================================
// Chat Completion
// =============================================================================

/// Chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model to use (e.g., "gpt-4", "gpt-4o")
    pub model: String,

    /// Conversation messages
    pub messages: Vec<Message>,

    /// Sampling temperature (0.0 to 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens in completion (for older models)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Maximum completion tokens (for o1, o3, gpt-5)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,
}

impl ChatRequest {
    /// Create a new chat request with the given model.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
            max_tokens: None,
            max_completion_tokens: None,
        }
    }

    /// Add a message to the conversation.
    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Set temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the output token budget, picking the field the model understands.
    pub fn token_budget(mut self, tokens: u32) -> Self {
        if Self::uses_max_completion_tokens(&self.model) {
            self.max_completion_tokens = Some(tokens);
            self.max_tokens = None;
        } else {
            self.max_tokens = Some(tokens);
            self.max_completion_tokens = None;
        }
        self
    }

    /// Check if a model requires max_completion_tokens instead of max_tokens.
    pub fn uses_max_completion_tokens(model: &str) -> bool {
        model.starts_with("o1")
            || model.starts_with("o3")
            || model.starts_with("gpt-5")
            || model.contains("-o1")
            || model.contains("-o3")
    }
}

/// Chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role: "system", "user", "assistant"
    pub role: String,

    /// Message content
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion response.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Response content
    pub content: String,

    /// Why generation stopped ("stop", "length", ...)
    pub finish_reason: Option<String>,

    /// Token usage statistics
    pub usage: Option<Usage>,
}

/// Raw chat response from API (for internal parsing).
#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponseRaw {
    pub choices: Vec<ChatChoice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatMessageResponse,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatMessageResponse {
    /// Null when the model refuses or only emits tool calls.
    #[serde(default)]
    pub content: Option<String>,
}

/// Token usage statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

// =============================================================================
// Embeddings
// =============================================================================

/// Embedding request. `input` is a single string or a batch.
#[derive(Debug, Serialize)]
pub(crate) struct EmbeddingRequest<'a> {
    pub model: &'a str,
    pub input: EmbeddingInput<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum EmbeddingInput<'a> {
    Single(&'a str),
    Batch(&'a [&'a str]),
}

/// Embedding response.
#[derive(Debug, Deserialize)]
pub(crate) struct EmbeddingResponse {
    pub data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmbeddingData {
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub index: usize,
}

impl EmbeddingResponse {
    /// Embeddings in input order, checking that one came back per input.
    pub(crate) fn into_ordered(self, expected: usize) -> Option<Vec<Vec<f32>>> {
        if self.data.len() != expected {
            return None;
        }
        let mut data = self.data;
        data.sort_by_key(|d| d.index);
        Some(data.into_iter().map(|d| d.embedding).collect())
    }
}

// =============================================================================
// API errors
// =============================================================================

/// Error envelope returned with non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorDetail {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_builder() {
        let req = ChatRequest::new("gpt-4")
            .message(Message::system("You are a CV writer"))
            .message(Message::user("Hello"))
            .temperature(0.3)
            .token_budget(2000);

        assert_eq!(req.model, "gpt-4");
        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[0].role, "system");
        assert_eq!(req.temperature, Some(0.3));
        assert_eq!(req.max_tokens, Some(2000));
        assert_eq!(req.max_completion_tokens, None);
    }

    #[test]
    fn test_token_budget_for_reasoning_models() {
        let req = ChatRequest::new("o3-mini").token_budget(500);
        assert_eq!(req.max_tokens, None);
        assert_eq!(req.max_completion_tokens, Some(500));

        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("max_tokens").is_none());
        assert_eq!(json["max_completion_tokens"], 500);
    }

    #[test]
    fn test_embedding_input_serializes_untagged() {
        let single = EmbeddingRequest {
            model: "text-embedding-ada-002",
            input: EmbeddingInput::Single("hello"),
        };
        assert_eq!(serde_json::to_value(&single).unwrap()["input"], "hello");

        let texts = ["a", "b"];
        let batch = EmbeddingRequest {
            model: "text-embedding-ada-002",
            input: EmbeddingInput::Batch(&texts),
        };
        assert_eq!(
            serde_json::to_value(&batch).unwrap()["input"],
            serde_json::json!(["a", "b"])
        );
    }

    #[test]
    fn test_embedding_response_reorders_by_index() {
        let response: EmbeddingResponse = serde_json::from_value(serde_json::json!({
            "data": [
                {"embedding": [2.0], "index": 1},
                {"embedding": [1.0], "index": 0}
            ]
        }))
        .unwrap();

        let ordered = response.into_ordered(2).unwrap();
        assert_eq!(ordered, vec![vec![1.0], vec![2.0]]);
    }

    #[test]
    fn test_embedding_response_count_mismatch() {
        let response: EmbeddingResponse = serde_json::from_value(serde_json::json!({
            "data": [{"embedding": [1.0], "index": 0}]
        }))
        .unwrap();
        assert!(response.into_ordered(2).is_none());
    }

    #[test]
    fn test_null_content_is_accepted() {
        let raw: ChatResponseRaw = serde_json::from_value(serde_json::json!({
            "choices": [{"message": {"content": null}, "finish_reason": "stop"}],
            "usage": null
        }))
        .unwrap();
        assert!(raw.choices[0].message.content.is_none());
    }
}
