//! A prompt template piped into a text backend and a string output parser

use futures::future::try_join_all;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::backend::{ChatMessage, TextBackend};
use crate::chain::template::ChatPromptTemplate;
use crate::error::{AppError, Result};

/// Reduces a backend reply to its text content
#[derive(Debug, Clone, Copy, Default)]
pub struct StrOutputParser;

impl StrOutputParser {
    pub fn parse(&self, message: ChatMessage) -> String {
        message.content
    }
}

/// `prompt | backend | parser`.
///
/// Without a prompt the chain passes its input straight to the backend, which then
/// accepts a plain string or a list of `{role, content}` messages.
pub struct Chain {
    name: String,
    prompt: Option<ChatPromptTemplate>,
    backend: Arc<dyn TextBackend>,
    parser: StrOutputParser,
}

impl Chain {
    pub fn new(
        name: impl Into<String>,
        prompt: Option<ChatPromptTemplate>,
        backend: Arc<dyn TextBackend>,
    ) -> Self {
        Self {
            name: name.into(),
            prompt,
            backend,
            parser: StrOutputParser,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backend(&self) -> &Arc<dyn TextBackend> {
        &self.backend
    }

    pub fn is_passthrough(&self) -> bool {
        self.prompt.is_none()
    }

    pub fn input_variables(&self) -> Vec<String> {
        self.prompt
            .as_ref()
            .map(|p| p.input_variables().to_vec())
            .unwrap_or_default()
    }

    /// Turn an `input` payload into the messages sent to the backend
    pub fn build_messages(&self, input: &Value) -> Result<Vec<ChatMessage>> {
        match (&self.prompt, input) {
            (Some(prompt), Value::Object(values)) => prompt.format(values),
            (Some(prompt), _) => Err(AppError::InvalidInput(format!(
                "expected an object with keys: {}",
                prompt.input_variables().join(", ")
            ))),
            (None, Value::String(text)) => Ok(vec![ChatMessage::new("user", text.clone())]),
            (None, Value::Array(_)) => {
                let messages: Vec<ChatMessage> = serde_json::from_value(input.clone())
                    .map_err(|e| AppError::InvalidInput(format!("invalid message list: {}", e)))?;
                if messages.is_empty() {
                    return Err(AppError::InvalidInput("message list is empty".to_string()));
                }
                Ok(messages)
            }
            (None, _) => Err(AppError::InvalidInput(
                "expected a string or a list of messages".to_string(),
            )),
        }
    }

    /// Run the chain once
    pub async fn invoke(&self, input: &Value) -> Result<String> {
        let messages = self.build_messages(input)?;
        debug!(
            chain = %self.name,
            backend = %self.backend.name(),
            messages = messages.len(),
            "Invoking chain"
        );
        let reply = self.backend.generate(&messages).await?;
        Ok(self.parser.parse(reply))
    }

    /// Run the chain over several inputs concurrently; outputs keep input order
    pub async fn batch(&self, inputs: &[Value]) -> Result<Vec<String>> {
        try_join_all(inputs.iter().map(|input| self.invoke(input))).await
    }

    /// JSON Schema of the accepted `input`
    pub fn input_schema(&self) -> Value {
        match &self.prompt {
            Some(prompt) => {
                let properties: serde_json::Map<String, Value> = prompt
                    .input_variables()
                    .iter()
                    .map(|v| (v.clone(), json!({"title": title_case(v), "type": "string"})))
                    .collect();
                json!({
                    "title": "PromptInput",
                    "type": "object",
                    "properties": properties,
                    "required": prompt.input_variables(),
                })
            }
            None => json!({
                "title": format!("{}Input", title_case(&self.name)),
                "anyOf": [
                    {"type": "string"},
                    {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "role": {"type": "string"},
                                "content": {"type": "string"}
                            },
                            "required": ["role", "content"]
                        }
                    }
                ]
            }),
        }
    }

    /// JSON Schema of the produced `output`
    pub fn output_schema(&self) -> Value {
        json!({
            "title": format!("{}Output", title_case(&self.name)),
            "type": "string",
        })
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
