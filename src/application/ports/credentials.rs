//! Credential source port interface

/// Port for bearer credential lookup.
///
/// Token absence is surfaced as a dispatch-time authorization failure, not a
/// capture-time error, so capture can run before the user signs in.
pub trait CredentialSource: Send + Sync {
    /// Get the bearer token used to authorize answer calls, if present
    fn bearer_token(&self) -> Option<String>;
}
