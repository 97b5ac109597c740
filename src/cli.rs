//! Command-line interface definitions for Awful Digest.
//!
//! Credentials can be passed as flags but are normally read from the
//! environment (`GMAIL_USER`, `GMAIL_PASSWORD`, `RECIPIENT_EMAIL` and the
//! optional `HUGGINGFACE_TOKEN`).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the Awful Digest application.
///
/// # Examples
///
/// ```sh
/// # Full run with credentials from the environment
/// awful_digest
///
/// # Verify configuration without touching the network
/// awful_digest check
///
/// # Write a sample digest to disk
/// awful_digest demo --output ./preview/demo_email.html
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Gmail address used to log in and as the From address
    #[arg(long, env = "GMAIL_USER", global = true, hide_env_values = true)]
    pub gmail_user: Option<String>,

    /// Gmail app password (not the account password)
    #[arg(long, env = "GMAIL_PASSWORD", global = true, hide_env_values = true)]
    pub gmail_password: Option<String>,

    /// Address the digest is delivered to
    #[arg(long, env = "RECIPIENT_EMAIL", global = true, hide_env_values = true)]
    pub recipient_email: Option<String>,

    /// Hugging Face access token; enables hosted summarization
    #[arg(long, env = "HUGGINGFACE_TOKEN", global = true, hide_env_values = true)]
    pub huggingface_token: Option<String>,

    /// YAML file overriding the built-in feeds, keywords and limits
    #[arg(short, long, global = true)]
    pub settings: Option<PathBuf>,

    /// Maximum number of articles to process
    #[arg(long, global = true)]
    pub max_articles: Option<usize>,

    /// Seconds to wait between articles
    #[arg(long, global = true)]
    pub delay_secs: Option<u64>,

    /// Mail submission host
    #[arg(long, global = true, default_value = "smtp.gmail.com")]
    pub smtp_host: String,

    /// Mail submission port (465 uses implicit TLS, others STARTTLS)
    #[arg(long, global = true, default_value_t = 465)]
    pub smtp_port: u16,

    /// Base URL of the local Ollama server
    #[arg(long, global = true, default_value = "http://localhost:11434")]
    pub ollama_url: String,

    /// Model requested from the local Ollama server
    #[arg(long, global = true, default_value = "llama2")]
    pub ollama_model: String,

    /// Hosted summarization model endpoint
    #[arg(
        long,
        global = true,
        default_value = "https://api-inference.huggingface.co/models/facebook/bart-large-cnn"
    )]
    pub huggingface_url: String,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch, summarize and mail the digest (default)
    Run,
    /// Report which configuration values are set and preview the subject
    Check,
    /// Render a digest of sample articles to an HTML file
    Demo {
        /// Where to write the rendered HTML
        #[arg(short, long, default_value = "demo_email.html")]
        output: PathBuf,
    },
}
