//! A unified streaming abstraction over multiple LLM backends.
//!
//! This library provides a consistent API for generating and analyzing text
//! against a remote gateway or a local inference daemon, each with its own
//! streaming wire protocol, with backend selection driven by configuration.

pub mod accumulator;
pub mod error;
pub mod event_stream;
pub mod json_lines;
pub mod lines;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod selector;
pub mod sink;
pub mod types;

// Re-export core types for easy usage
pub use accumulator::accumulate;
pub use error::Error;
pub use event_stream::EventStream;
pub use json_lines::JsonLines;
pub use provider::TextProvider;
pub use providers::*;
pub use selector::ProviderSelector;
pub use sink::ProgressSink;
pub use types::*;
