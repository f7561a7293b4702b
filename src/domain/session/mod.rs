//! Capture session lifecycle

pub mod capture;

pub use capture::{
    CaptureSession, Effect, IntentError, SessionError, SessionEvent, SessionState,
};
