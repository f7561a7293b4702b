//! Credential source adapters

pub mod env;

pub use env::EnvCredentialSource;
