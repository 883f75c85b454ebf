//! Chat prompt templates with `{name}` placeholders

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::backend::ChatMessage;
use crate::error::{AppError, Result};

/// Speaker of a template turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Parse a role name; `human` and `ai` are accepted as aliases
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "system" => Ok(Role::System),
            "user" | "human" => Ok(Role::User),
            "assistant" | "ai" => Ok(Role::Assistant),
            other => Err(AppError::Template(format!("unknown message role '{}'", other))),
        }
    }

    /// Wire name used by chat completion APIs
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    /// Prefix used when a conversation is flattened into a single prompt
    pub fn transcript_prefix(&self) -> &'static str {
        match self {
            Role::System => "System",
            Role::User => "Human",
            Role::Assistant => "AI",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

#[derive(Debug, Clone)]
struct MessageTemplate {
    role: Role,
    segments: Vec<Segment>,
}

/// An immutable sequence of `(role, content)` turns.
///
/// Placeholders are written `{name}`; `{{` and `}}` produce literal braces.
#[derive(Debug, Clone)]
pub struct ChatPromptTemplate {
    messages: Vec<MessageTemplate>,
    variables: Vec<String>,
}

impl ChatPromptTemplate {
    /// Template with a single user turn
    pub fn from_template(template: &str) -> Result<Self> {
        Self::from_messages([("user", template)])
    }

    /// Template from ordered `(role, content)` pairs
    pub fn from_messages<'a, I>(turns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut messages = Vec::new();
        let mut variables: Vec<String> = Vec::new();

        for (role, content) in turns {
            let segments = parse_segments(content)?;
            for segment in &segments {
                if let Segment::Variable(name) = segment {
                    if !variables.contains(name) {
                        variables.push(name.clone());
                    }
                }
            }
            messages.push(MessageTemplate {
                role: Role::parse(role)?,
                segments,
            });
        }

        if messages.is_empty() {
            return Err(AppError::Template("template has no messages".to_string()));
        }

        Ok(Self { messages, variables })
    }

    /// Placeholder names in order of first appearance
    pub fn input_variables(&self) -> &[String] {
        &self.variables
    }

    /// Fill every placeholder from `values`.
    ///
    /// Strings are substituted verbatim, other JSON values by their JSON text.
    pub fn format(&self, values: &Map<String, Value>) -> Result<Vec<ChatMessage>> {
        self.messages
            .iter()
            .map(|message| {
                let mut content = String::new();
                for segment in &message.segments {
                    match segment {
                        Segment::Literal(text) => content.push_str(text),
                        Segment::Variable(name) => match values.get(name) {
                            Some(Value::String(s)) => content.push_str(s),
                            Some(other) => content.push_str(&other.to_string()),
                            None => return Err(AppError::MissingVariable(name.clone())),
                        },
                    }
                }
                Ok(ChatMessage::new(message.role.as_str(), content))
            })
            .collect()
    }
}

/// Flatten chat messages into one prompt, one `Prefix: content` line per turn
pub fn render_transcript(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|m| {
            let prefix = Role::parse(&m.role)
                .map(|r| r.transcript_prefix())
                .unwrap_or(m.role.as_str());
            format!("{}: {}", prefix, m.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn parse_segments(content: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut name = String::new();
                let mut closed = false;
                for n in chars.by_ref() {
                    if n == '}' {
                        closed = true;
                        break;
                    }
                    name.push(n);
                }
                if !closed {
                    return Err(AppError::Template(format!(
                        "unclosed placeholder in '{}'",
                        content
                    )));
                }
                let name = name.trim().to_string();
                if name.is_empty() || !name.chars().all(|ch| ch.is_alphanumeric() || ch == '_') {
                    return Err(AppError::Template(format!(
                        "invalid placeholder '{{{}}}' in '{}'",
                        name, content
                    )));
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Variable(name));
            }
            '}' => {
                return Err(AppError::Template(format!(
                    "single '}}' encountered in '{}'",
                    content
                )));
            }
            other => literal.push(other),
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}
