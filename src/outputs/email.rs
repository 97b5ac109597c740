//! Digest delivery over authenticated SMTP.
//!
//! [`DigestSender`] is the seam the workflow talks to; [`SmtpDigestSender`]
//! is the real implementation. A failed delivery is logged and reported as
//! `false`, never retried.
//!
//! Port 465 gets implicit TLS; any other port upgrades with STARTTLS.

use super::html::{render_digest, subject_line};
use crate::config::MailConfig;
use crate::models::SummaryRecord;
use chrono::Local;
use lettre::message::{MultiPart, SinglePart};
use lettre::transport::smtp::AsyncSmtpTransportBuilder;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::error::Error;
use std::time::Instant;
use tracing::{error, info, instrument};

/// The implicit-TLS submission port.
pub const SMTPS_PORT: u16 = 465;

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// TLS from the first byte.
    Implicit,
    /// Plain connection upgraded with `STARTTLS`.
    StartTls,
}

impl TlsMode {
    pub fn for_port(port: u16) -> Self {
        if port == SMTPS_PORT {
            TlsMode::Implicit
        } else {
            TlsMode::StartTls
        }
    }
}

fn transport_builder(
    host: &str,
    port: u16,
) -> Result<AsyncSmtpTransportBuilder, lettre::transport::smtp::Error> {
    let builder = match TlsMode::for_port(port) {
        TlsMode::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(host)?,
        TlsMode::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?,
    };
    Ok(builder.port(port))
}

/// Something that can deliver a digest.
pub trait DigestSender {
    /// Deliver `summaries` as one digest. Returns whether delivery succeeded.
    async fn send_digest(&self, summaries: &[SummaryRecord]) -> bool;
}

/// Sends the digest as a `multipart/alternative` HTML message over SMTP.
#[derive(Debug)]
pub struct SmtpDigestSender {
    mail: MailConfig,
}

impl SmtpDigestSender {
    pub fn new(mail: MailConfig) -> Self {
        Self { mail }
    }

    fn build_message(&self, summaries: &[SummaryRecord]) -> Result<Message, lettre::error::Error> {
        let now = Local::now();
        let html = render_digest(summaries, now);
        Message::builder()
            .from(self.mail.from.clone())
            .to(self.mail.to.clone())
            .subject(subject_line(now.date_naive()))
            .multipart(MultiPart::alternative().singlepart(SinglePart::html(html)))
    }

    async fn try_send(&self, summaries: &[SummaryRecord]) -> Result<(), Box<dyn Error>> {
        let message = self.build_message(summaries)?;
        let transport = transport_builder(&self.mail.smtp_host, self.mail.smtp_port)?
            .credentials(Credentials::new(
                self.mail.username.clone(),
                self.mail.password.clone(),
            ))
            .build();
        transport.send(message).await?;
        Ok(())
    }
}

impl DigestSender for SmtpDigestSender {
    #[instrument(level = "info", skip_all, fields(count = summaries.len(), host = %self.mail.smtp_host))]
    async fn send_digest(&self, summaries: &[SummaryRecord]) -> bool {
        info!("Sending email with {} article summaries", summaries.len());
        let t0 = Instant::now();
        match self.try_send(summaries).await {
            Ok(()) => {
                info!(
                    recipient = %self.mail.to,
                    elapsed_ms = t0.elapsed().as_millis(),
                    "Successfully sent email"
                );
                true
            }
            Err(e) => {
                error!(error = %e, elapsed_ms = t0.elapsed().as_millis(), "Error sending email");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArticleRecord, SummaryStrategy};

    fn mail_config(host: &str, port: u16) -> MailConfig {
        MailConfig {
            username: "me@gmail.com".to_string(),
            password: "app-password".to_string(),
            from: "me@gmail.com".parse().unwrap(),
            to: "you@example.com".parse().unwrap(),
            smtp_host: host.to_string(),
            smtp_port: port,
        }
    }

    fn summary() -> SummaryRecord {
        SummaryRecord {
            article: ArticleRecord {
                url: "https://example.com/a".to_string(),
                title: "Title".to_string(),
                content: "body".to_string(),
                author: None,
                date: None,
                scraped_at: Local::now(),
            },
            summary: "Summary".to_string(),
            insights: vec![],
            topics: vec![],
            takeaways: vec![],
            relevance_score: 5,
            strategy: SummaryStrategy::RuleBased,
            summarized_at: Local::now(),
        }
    }

    #[test]
    fn test_build_message_headers() {
        let sender = SmtpDigestSender::new(mail_config("smtp.gmail.com", 465));
        let message = sender.build_message(&[summary()]).unwrap();
        let raw = String::from_utf8_lossy(&message.formatted()).to_string();
        assert!(raw.contains("From: me@gmail.com"));
        assert!(raw.contains("To: you@example.com"));
        assert!(raw.contains("Subject: "));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("text/html"));
    }

    #[test]
    fn test_tls_mode_for_port() {
        assert_eq!(TlsMode::for_port(465), TlsMode::Implicit);
        assert_eq!(TlsMode::for_port(587), TlsMode::StartTls);
        assert_eq!(TlsMode::for_port(25), TlsMode::StartTls);
    }

    #[test]
    fn test_transport_builder_accepts_both_modes() {
        assert!(transport_builder("smtp.gmail.com", 465).is_ok());
        assert!(transport_builder("smtp.gmail.com", 587).is_ok());
    }

    #[tokio::test]
    async fn test_send_digest_connection_failure_returns_false() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let sender = SmtpDigestSender::new(mail_config("127.0.0.1", port));
        assert!(!sender.send_digest(&[summary()]).await);
    }
}
