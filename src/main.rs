//! # Awful Digest
//!
//! Pulls article links from tech RSS feeds, scrapes each article, summarizes
//! it, and mails the collected summaries as a single HTML digest.
//!
//! ## Usage
//!
//! ```sh
//! GMAIL_USER=me@gmail.com GMAIL_PASSWORD=app-password RECIPIENT_EMAIL=you@example.com awful_digest
//! ```
//!
//! ## Architecture
//!
//! Every step runs in order, one article at a time:
//! 1. **Indexing**: read keyword-matching links from each RSS feed
//! 2. **Fetching**: scrape title, body, byline and date from each page
//! 3. **Summarizing**: hosted model, then local model, then rule-based fallback
//! 4. **Delivery**: render the HTML digest and send it over SMTPS

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod demo;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod summarizer;
mod utils;

use cli::{Cli, Command};
use config::{Config, ConfigError, REQUIRED_VARS, var_statuses};
use outputs::email::SmtpDigestSender;
use outputs::html::subject_line;
use pipeline::{Delivery, run_workflow};
use summarizer::Summarizer;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(command = ?args.command, "Parsed CLI arguments");

    match args.command.clone().unwrap_or(Command::Run) {
        Command::Run => run(&args).await,
        Command::Check => check(&args),
        Command::Demo { output } => {
            demo::write_demo(&output).await?;
            println!("Demo digest saved to {}", output.display());
            println!("Open it in a browser to preview the email layout.");
            Ok(())
        }
    }
}

async fn run(args: &Cli) -> Result<(), Box<dyn Error>> {
    let start_time = std::time::Instant::now();
    info!("awful_digest starting up");

    let config = match Config::from_cli(args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration; nothing was fetched");
            explain_config_error(&e);
            return Err(e.into());
        }
    };

    let client = scrapers::http_client()?;
    let summarizer = Summarizer::from_config(
        &client,
        &config.summarizer,
        config.settings.keywords.clone(),
    );
    let sender = SmtpDigestSender::new(config.mail.clone());

    let report = run_workflow(&client, &config.settings, &summarizer, &sender).await;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        processed = report.processed,
        success = report.succeeded,
        "Execution complete"
    );

    if report.delivery == Delivery::Failed {
        return Err("digest delivery failed".into());
    }
    Ok(())
}

fn check(args: &Cli) -> Result<(), Box<dyn Error>> {
    println!("Checking Awful Digest configuration...");
    for status in var_statuses(args) {
        let state = match (status.present, status.required) {
            (true, _) => "set",
            (false, true) => "MISSING",
            (false, false) => "missing (optional)",
        };
        println!("  {:<18} {}", status.name, state);
    }

    match Config::from_cli(args) {
        Ok(config) => {
            println!();
            println!("All required configuration is set.");
            println!("Subject: {}", subject_line(Local::now().date_naive()));
            println!("From:    {}", config.mail.from);
            println!("To:      {}", config.mail.to);
            println!(
                "Feeds:   {} (up to {} articles)",
                config.settings.feeds.len(),
                config.settings.max_articles
            );
            Ok(())
        }
        Err(e) => {
            explain_config_error(&e);
            Err(e.into())
        }
    }
}

fn explain_config_error(e: &ConfigError) {
    eprintln!("Configuration error: {e}");
    if let ConfigError::MissingRequired(_) = e {
        eprintln!();
        eprintln!("Please set:");
        for var in REQUIRED_VARS {
            let what = match var {
                "GMAIL_USER" => "your Gmail address",
                "GMAIL_PASSWORD" => "your Gmail app password",
                _ => "where to send summaries",
            };
            eprintln!("  - {var} ({what})");
        }
        eprintln!();
        eprintln!("Optional, for model-written summaries:");
        eprintln!("  - HUGGINGFACE_TOKEN (https://huggingface.co/settings/tokens)");
        eprintln!();
        eprintln!("Gmail app password setup:");
        eprintln!("  1. Enable 2-factor authentication on the Google account");
        eprintln!("  2. Generate an app password for Mail");
        eprintln!("  3. Use that password, not the regular account password");
    }
}
