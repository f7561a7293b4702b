//! CLI argument definitions using Clap

use clap::{Parser, Subcommand};

use crate::domain::duration::Duration;

/// LiveAsk - ask questions by voice, get answers from your backend
#[derive(Parser, Debug)]
#[command(name = "live-ask")]
#[command(version = "1.0.0")]
#[command(about = "Continuous voice capture and Q&A")]
#[command(long_about = None)]
pub struct Cli {
    /// Recognizer command to run (emits JSON result lines on stdout)
    #[arg(long, value_name = "CMD", conflicts_with = "stdin")]
    pub engine_cmd: Option<String>,

    /// Type the question on stdin instead of running a recognizer
    #[arg(long)]
    pub stdin: bool,

    /// Backend base URL
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Answer request timeout (e.g., 30s, 1m)
    #[arg(short = 't', long, value_name = "TIME")]
    pub timeout: Option<String>,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit a typed question directly, skipping capture
    Ask {
        /// The question text
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Which recognition capability a session runs with
#[derive(Debug, Clone)]
pub enum EngineChoice {
    /// External recognizer command
    Command(String),
    /// Interactive stdin capture
    Stdin,
    /// No capability available
    None,
}

/// Parsed session options
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub engine: EngineChoice,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub token: Option<String>,
    pub dispatch_timeout: Duration,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "api_url",
    "api_key",
    "token",
    "dispatch_timeout",
    "engine.command",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
