//! Prompt chains - templates, the runnable pipeline and the route registry

pub mod presets;
pub mod registry;
pub mod runnable;
pub mod template;

pub use registry::ChainRegistry;
pub use runnable::{Chain, StrOutputParser};
pub use template::{render_transcript, ChatPromptTemplate, Role};
