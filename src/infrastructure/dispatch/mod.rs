//! Answer dispatch adapters

pub mod http;

pub use http::HttpAnswerDispatcher;
