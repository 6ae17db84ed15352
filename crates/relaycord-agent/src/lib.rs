pub mod completion;
pub mod gemini;
pub mod pipeline;
pub mod prompt;
pub mod provider;

pub use completion::{CompletionClient, FALLBACK_REPLY};
pub use gemini::GeminiProvider;
pub use pipeline::Relay;
