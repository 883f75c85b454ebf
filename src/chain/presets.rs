//! Chains with fixed prompts used by the standalone tools

use serde_json::{json, Value};
use std::sync::Arc;

use crate::backend::TextBackend;
use crate::chain::runnable::Chain;
use crate::chain::template::ChatPromptTemplate;
use crate::error::Result;

pub const ASSISTANT_SYSTEM_PROMPT: &str = "You are a helpful chatbot, please answer queries";

/// Two-turn question answering chain; expects `{"question": ...}`
pub fn question_chain(backend: Arc<dyn TextBackend>) -> Result<Chain> {
    let prompt = ChatPromptTemplate::from_messages([
        ("system", ASSISTANT_SYSTEM_PROMPT),
        ("user", "Question:{question}"),
    ])?;
    Ok(Chain::new("question", Some(prompt), backend))
}

/// Input for [`question_chain`]; `None` when the text is blank.
///
/// The text is passed through as typed, surrounding whitespace included.
pub fn question_input(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        None
    } else {
        Some(json!({ "question": text }))
    }
}
