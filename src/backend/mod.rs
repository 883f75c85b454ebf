//! Backend module - text generation clients and their registry

pub mod text_backend;
pub mod text_registry;

// Re-export text backend types for convenience
pub use text_backend::{
    TextBackend, TextBackendStatus,
    ChatMessage, ChatCompletionRequest, ChatCompletionResponse, ChatChoice, Usage,
    GenerateRequest, GenerateResponse,
    OpenAIChatBackend, OllamaBackend,
    create_text_backend,
};

pub use text_registry::TextBackendRegistry;
