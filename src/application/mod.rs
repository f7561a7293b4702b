//! Application layer - Use cases and port interfaces
//!
//! Contains the session orchestration surface and trait definitions
//! for external system interactions.

pub mod controller;
pub mod ports;

// Re-export the orchestration surface
pub use controller::{ControllerEvent, SessionController};
