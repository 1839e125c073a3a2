pub mod attachment;
pub mod chat;
pub mod config;
pub mod error;
pub mod gemini;
pub mod lock;
pub mod logging;
pub mod media;
pub mod model;
pub mod options;
pub mod orchestrator;
pub mod prompt;
pub mod provider;
pub mod state;
pub mod wire;

// Re-export main types for convenience
pub use chat::{ChatSession, PendingTurn};
pub use config::Config;
pub use error::{Error, Result};
pub use gemini::GeminiClient;
pub use lock::SessionLock;
pub use model::{select_chat_model, Model};
pub use orchestrator::{ChatRequest, ChatStream, Orchestrator, PollPolicy};
pub use prompt::ChatMode;
pub use provider::GenerationBackend;
pub use state::{ChatMessage, ChatRole, GeneratedMedia, ImageAttachment, MediaKind, NewsItem, NewsSource};
