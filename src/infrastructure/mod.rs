//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with the answer backend, recognizer processes, etc.

pub mod config;
pub mod credentials;
pub mod dispatch;
pub mod recognition;

// Re-export adapters
pub use config::XdgConfigStore;
pub use credentials::EnvCredentialSource;
pub use dispatch::HttpAnswerDispatcher;
pub use recognition::{CommandRecognizer, StdinRecognizer};
