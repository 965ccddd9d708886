//! Chat assistant and suggested-reply DTOs

use serde::{Deserialize, Serialize};

/// A reply the user could send next, with the reason it helps
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SuggestedResponse {
    pub text: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct SuggestionsRequest<'a> {
    pub conversation_text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SuggestionsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub suggestions: Vec<SuggestedResponse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<&'a str>,
}

/// Assistant turn returned by `/analysis/chat`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub response: String,
}
