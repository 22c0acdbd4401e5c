//! Backend client implementations.

pub mod azure;
pub mod ollama;

// Re-export commonly used client types
pub use azure::AzureClient;
pub use ollama::OllamaClient;
