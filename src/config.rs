//! Run configuration assembled once at startup.
//!
//! [`Config::from_cli`] merges command-line flags, environment variables and
//! an optional YAML settings file into an immutable [`Config`]. Missing
//! required values are collected into a single [`ConfigError`] so the user
//! sees every problem at once, before any network traffic.

use crate::cli::Cli;
use lettre::message::Mailbox;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// RSS feeds polled when no settings file overrides them.
pub const DEFAULT_FEEDS: &[&str] = &[
    "https://techcrunch.com/feed/",
    "https://www.theverge.com/rss/index.xml",
    "https://feeds.arstechnica.com/arstechnica/index",
    "https://www.wired.com/feed/rss",
    "https://feeds.feedburner.com/TechCrunch/",
];

/// Keywords used both to filter feed links and to score relevance.
///
/// "innovation" appears twice and therefore counts twice when scoring.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "tech",
    "technology",
    "digital",
    "online",
    "web",
    "internet",
    "software",
    "app",
    "mobile",
    "computer",
    "data",
    "cloud",
    "startup",
    "business",
    "innovation",
    "future",
    "trends",
    "artificial intelligence",
    "machine learning",
    "data science",
    "technology trends",
    "digital transformation",
    "innovation",
    "fintech",
    "healthtech",
    "edtech",
];

pub const DEFAULT_MAX_ARTICLES: usize = 5;
pub const DEFAULT_DELAY_SECS: u64 = 2;

/// Environment variables that must be present for a run.
pub const REQUIRED_VARS: [&str; 3] = ["GMAIL_USER", "GMAIL_PASSWORD", "RECIPIENT_EMAIL"];

/// Configuration problems detected at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration: {}", .0.join(", "))]
    MissingRequired(Vec<&'static str>),

    #[error("invalid email address in {var}: {reason}")]
    InvalidAddress { var: &'static str, reason: String },

    #[error("failed to read settings file {path}: {source}")]
    SettingsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file {path}: {source}")]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Feed list, keyword list and pacing.
///
/// Every field is optional in the YAML file; absent keys keep the built-in
/// defaults.
///
/// ```yaml
/// feeds:
///   - https://techcrunch.com/feed/
/// keywords: [rust, wasm]
/// max_articles: 10
/// delay_secs: 1
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub feeds: Vec<String>,
    pub keywords: Vec<String>,
    pub max_articles: usize,
    pub delay_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            feeds: DEFAULT_FEEDS.iter().map(|s| s.to_string()).collect(),
            keywords: DEFAULT_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            max_articles: DEFAULT_MAX_ARTICLES,
            delay_secs: DEFAULT_DELAY_SECS,
        }
    }
}

impl Settings {
    /// Load settings from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::SettingsRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&raw).map_err(|source| ConfigError::SettingsParse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }

    /// How many items each feed may contribute.
    pub fn per_feed_quota(&self) -> usize {
        if self.feeds.is_empty() {
            0
        } else {
            self.max_articles / self.feeds.len()
        }
    }
}

/// Mail account and delivery target.
#[derive(Clone)]
pub struct MailConfig {
    pub username: String,
    pub password: String,
    pub from: Mailbox,
    pub to: Mailbox,
    pub smtp_host: String,
    pub smtp_port: u16,
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("to", &self.to.to_string())
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .finish()
    }
}

/// Endpoints and credentials for the model-backed summarizers.
#[derive(Clone)]
pub struct SummarizerConfig {
    pub huggingface_token: Option<String>,
    pub huggingface_url: String,
    pub ollama_url: String,
    pub ollama_model: String,
}

impl std::fmt::Debug for SummarizerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummarizerConfig")
            .field("huggingface_token", &self.huggingface_token.as_ref().map(|_| "<redacted>"))
            .field("huggingface_url", &self.huggingface_url)
            .field("ollama_url", &self.ollama_url)
            .field("ollama_model", &self.ollama_model)
            .finish()
    }
}

/// Everything a run needs, fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct Config {
    pub mail: MailConfig,
    pub summarizer: SummarizerConfig,
    pub settings: Settings,
}

/// Presence of one configuration variable, as reported by `check`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarStatus {
    pub name: &'static str,
    pub required: bool,
    pub present: bool,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_mailbox(var: &'static str, value: &str) -> Result<Mailbox, ConfigError> {
    value.parse().map_err(|e: lettre::address::AddressError| ConfigError::InvalidAddress {
        var,
        reason: e.to_string(),
    })
}

/// Report which configuration variables are set. Blank values count as unset.
pub fn var_statuses(cli: &Cli) -> Vec<VarStatus> {
    vec![
        VarStatus {
            name: "GMAIL_USER",
            required: true,
            present: present(&cli.gmail_user).is_some(),
        },
        VarStatus {
            name: "GMAIL_PASSWORD",
            required: true,
            present: present(&cli.gmail_password).is_some(),
        },
        VarStatus {
            name: "RECIPIENT_EMAIL",
            required: true,
            present: present(&cli.recipient_email).is_some(),
        },
        VarStatus {
            name: "HUGGINGFACE_TOKEN",
            required: false,
            present: present(&cli.huggingface_token).is_some(),
        },
    ]
}

impl Config {
    /// Build the run configuration from parsed command-line arguments.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::MissingRequired`] listing every absent required variable
    /// - [`ConfigError::InvalidAddress`] when a mail address does not parse
    /// - settings file read/parse errors when `--settings` is given
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let missing: Vec<&'static str> = var_statuses(cli)
            .into_iter()
            .filter(|v| v.required && !v.present)
            .map(|v| v.name)
            .collect();

        let (Some(user), Some(password), Some(recipient)) = (
            present(&cli.gmail_user),
            present(&cli.gmail_password),
            present(&cli.recipient_email),
        ) else {
            return Err(ConfigError::MissingRequired(missing));
        };

        let mail = MailConfig {
            username: user.to_string(),
            password: password.to_string(),
            from: parse_mailbox("GMAIL_USER", user)?,
            to: parse_mailbox("RECIPIENT_EMAIL", recipient)?,
            smtp_host: cli.smtp_host.clone(),
            smtp_port: cli.smtp_port,
        };

        let summarizer = SummarizerConfig {
            huggingface_token: present(&cli.huggingface_token).map(str::to_string),
            huggingface_url: cli.huggingface_url.clone(),
            ollama_url: cli.ollama_url.clone(),
            ollama_model: cli.ollama_model.clone(),
        };

        let mut settings = match &cli.settings {
            Some(path) => {
                let s = Settings::load(path)?;
                info!(path = %path.display(), "Loaded settings file");
                s
            }
            None => Settings::default(),
        };
        if let Some(max) = cli.max_articles {
            settings.max_articles = max;
        }
        if let Some(delay) = cli.delay_secs {
            settings.delay_secs = delay;
        }

        debug!(
            feeds = settings.feeds.len(),
            keywords = settings.keywords.len(),
            max_articles = settings.max_articles,
            delay_secs = settings.delay_secs,
            remote_summaries = summarizer.huggingface_token.is_some(),
            "Configuration assembled"
        );

        Ok(Self {
            mail,
            summarizer,
            settings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn cli(args: &[&str]) -> Cli {
        let mut full = vec!["awful_digest"];
        full.extend_from_slice(args);
        Cli::try_parse_from(full).unwrap()
    }

    fn with_credentials(extra: &[&str]) -> Cli {
        let mut args = vec![
            "--gmail-user",
            "me@gmail.com",
            "--gmail-password",
            "app-password",
            "--recipient-email",
            "you@example.com",
        ];
        args.extend_from_slice(extra);
        cli(&args)
    }

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert_eq!(s.feeds.len(), 5);
        assert_eq!(s.keywords.len(), 26);
        assert_eq!(s.max_articles, 5);
        assert_eq!(s.per_feed_quota(), 1);
        assert_eq!(s.delay(), Duration::from_secs(2));
    }

    #[test]
    fn test_per_feed_quota_integer_division() {
        let mut s = Settings::default();
        s.max_articles = 4;
        assert_eq!(s.per_feed_quota(), 0);
        s.max_articles = 12;
        assert_eq!(s.per_feed_quota(), 2);
        s.feeds.clear();
        assert_eq!(s.per_feed_quota(), 0);
    }

    #[test]
    fn test_settings_partial_yaml_keeps_defaults() {
        let s = Settings::from_yaml("keywords: [rust, wasm]\nmax_articles: 10\n").unwrap();
        assert_eq!(s.keywords, vec!["rust".to_string(), "wasm".to_string()]);
        assert_eq!(s.max_articles, 10);
        assert_eq!(s.feeds.len(), 5);
        assert_eq!(s.delay_secs, DEFAULT_DELAY_SECS);
    }

    #[test]
    fn test_settings_empty_yaml_is_default() {
        assert_eq!(Settings::from_yaml("  \n").unwrap(), Settings::default());
    }

    #[test]
    fn test_settings_unknown_key_rejected() {
        assert!(Settings::from_yaml("feedz: []\n").is_err());
    }

    #[test]
    fn test_from_cli_reports_all_missing() {
        let mut c = with_credentials(&[]);
        c.gmail_user = None;
        c.recipient_email = Some("   ".to_string());
        match Config::from_cli(&c) {
            Err(ConfigError::MissingRequired(vars)) => {
                assert_eq!(vars, vec!["GMAIL_USER", "RECIPIENT_EMAIL"]);
            }
            other => panic!("expected MissingRequired, got {other:?}"),
        }
    }

    #[test]
    fn test_from_cli_builds_config() {
        let c = with_credentials(&["--max-articles", "9", "--delay-secs", "0"]);
        let config = Config::from_cli(&c).unwrap();
        assert_eq!(config.mail.username, "me@gmail.com");
        assert_eq!(config.mail.to.email.to_string(), "you@example.com");
        assert_eq!(config.mail.smtp_port, 465);
        assert_eq!(config.settings.max_articles, 9);
        assert_eq!(config.settings.delay_secs, 0);
    }

    #[test]
    fn test_from_cli_blank_token_is_none() {
        let mut c = with_credentials(&[]);
        c.huggingface_token = Some(String::new());
        let config = Config::from_cli(&c).unwrap();
        assert!(config.summarizer.huggingface_token.is_none());
    }

    #[test]
    fn test_from_cli_invalid_address() {
        let mut c = with_credentials(&[]);
        c.recipient_email = Some("not an address".to_string());
        assert!(matches!(
            Config::from_cli(&c),
            Err(ConfigError::InvalidAddress {
                var: "RECIPIENT_EMAIL",
                ..
            })
        ));
    }

    #[test]
    fn test_from_cli_reads_settings_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "feeds:\n  - https://example.com/rss\ndelay_secs: 7").unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let c = with_credentials(&["--settings", &path]);
        let config = Config::from_cli(&c).unwrap();
        assert_eq!(config.settings.feeds, vec!["https://example.com/rss".to_string()]);
        assert_eq!(config.settings.delay_secs, 7);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut c = with_credentials(&[]);
        c.huggingface_token = Some("hf_secret".to_string());
        let config = Config::from_cli(&c).unwrap();
        let dbg = format!("{config:?}");
        assert!(!dbg.contains("app-password"));
        assert!(!dbg.contains("hf_secret"));
    }

    #[test]
    fn test_var_statuses() {
        let mut c = with_credentials(&[]);
        c.huggingface_token = None;
        let statuses = var_statuses(&c);
        assert_eq!(statuses.len(), 4);
        assert!(statuses.iter().filter(|s| s.required).all(|s| s.present));
        let hf = statuses.iter().find(|s| s.name == "HUGGINGFACE_TOKEN").unwrap();
        assert!(!hf.required && !hf.present);
    }
}
