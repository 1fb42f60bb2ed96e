use naturecard_common::{Category, SpeciesRecord};
use serde::{Deserialize, Serialize};

// --- Card input/output ---

/// Everything the writer needs to know about one selected species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRequest {
    pub common_name: String,
    pub scientific_name: String,
    pub category: Category,
    /// Plain-text encyclopedia summary; may be empty.
    #[serde(default)]
    pub summary: String,
    pub place_name: String,
    /// Month of year, 1-12.
    pub month: u32,
}

impl CardRequest {
    pub fn for_species(record: &SpeciesRecord, summary: Option<String>, place_name: &str, month: u32) -> Self {
        Self {
            common_name: record.common_name.clone(),
            scientific_name: record.scientific_name.clone(),
            category: record.category,
            summary: summary.unwrap_or_default(),
            place_name: place_name.to_string(),
            month,
        }
    }
}

/// Generated card text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardText {
    /// How to recognize it, in visual terms a small child understands.
    pub recognition: String,
    /// Its most memorable habit or trait.
    pub fun_fact: String,
    /// A line the parent can say aloud, with a prompt for the child.
    pub talk_to_kid: String,
}

// --- Chat completion wire types ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct WireMessage {
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl WireMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(content.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChatRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Choice {
    pub message: WireMessage,
}
