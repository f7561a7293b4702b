//! Recognition engine adapters

pub mod stdin;
pub mod subprocess;

pub use stdin::StdinRecognizer;
pub use subprocess::CommandRecognizer;
