//! Prompt construction for chat explanations

use serde::{Deserialize, Serialize};
use std::fmt;

use item_predictor_core::PredictionRecord;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Builder for the explanation conversation
#[derive(Debug, Default)]
pub struct PromptBuilder {
    messages: Vec<Message>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// System prompt for the catalog assistant
    pub fn system_prompt(mut self) -> Self {
        let system = r#"You are a procurement assistant for an industrial parts catalog.

## Your Role
- Explain item predictions made by the catalog model
- Describe what the predicted item number and quantity mean for the order
- Say plainly when a prediction came from a fallback rather than a direct match

## Guidelines
- Only use the prediction details you are given; never invent item numbers
- Keep answers short (2-4 sentences)
- If no prediction is available, ask the user to submit an item description first"#;

        self.messages.push(Message::system(system));
        self
    }

    /// Attach the most recent prediction as context
    pub fn with_prediction(mut self, record: Option<&PredictionRecord>) -> Self {
        let context = match record {
            Some(record) => format!("## Latest Prediction\n{}", describe_record(record)),
            None => "## Latest Prediction\nNo prediction has been made yet.".to_string(),
        };
        self.messages.push(Message::system(context));
        self
    }

    pub fn user_message(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::user(content));
        self
    }

    pub fn build(self) -> Vec<Message> {
        self.messages
    }
}

/// Plain-text summary of a served prediction
pub fn describe_record(record: &PredictionRecord) -> String {
    let prediction = &record.prediction;
    format!(
        "- Description: {}\n- Unit of measure: {}\n- Market: {}\n- Predicted item (MasterItemNo): {}\n- Expected quantity (QtyShipped): {:.2}\n- Item source: {}\n- Quantity source: {}\n- Strategy: {}",
        record.description,
        record.uom.as_deref().unwrap_or("not given"),
        record.core_market.as_deref().unwrap_or("not given"),
        prediction.item,
        prediction.quantity,
        prediction.item_source.as_str(),
        prediction.quantity_source.as_str(),
        record.strategy,
    )
}
