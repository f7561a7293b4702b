//! LiveAsk - continuous voice capture and Q&A
//!
//! This crate keeps a live speech-capture session running despite the
//! recognition engine's own silence timeouts, merges interim and finalized
//! text into one utterance, and hands the result to a backend Q&A endpoint
//! exactly once per session.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: The capture session state machine, transcript aggregation,
//!   value objects, and errors
//! - **Application**: The session controller use case and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (HTTP dispatcher, recognizer
//!   processes, credentials, config storage)
//! - **CLI**: Command-line interface, argument parsing, and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
