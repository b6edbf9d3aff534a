//! Reminder email delivery via SMTP.
//!
//! [`EmailDelivery`] wraps the `lettre` async SMTP transport to send reminder
//! emails with a plain-text and an HTML part. Configuration is loaded from
//! environment variables; if `SMTP_HOST` is not set, [`EmailConfig::from_env`]
//! returns `None` and no mailer should be constructed.

use async_trait::async_trait;
use lettre::message::MultiPart;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{NotifyError, ReminderNotice, ReminderNotifier};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "Dealping <noreply@dealping.local>";

/// Default base URL linked from reminder emails.
const DEFAULT_APP_URL: &str = "http://localhost:3000";

/// Configuration for the SMTP email delivery service.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
    /// Base URL of the web app; emails link to `<app_url>/dashboard`.
    pub app_url: String,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// delivery is not configured.
    ///
    /// | Variable        | Required | Default                              |
    /// |-----------------|----------|--------------------------------------|
    /// | `SMTP_HOST`     | yes      |                                      |
    /// | `SMTP_PORT`     | no       | `587`                                |
    /// | `SMTP_FROM`     | no       | `Dealping <noreply@dealping.local>`  |
    /// | `SMTP_USER`     | no       |                                      |
    /// | `SMTP_PASSWORD` | no       |                                      |
    /// | `APP_URL`       | no       | `http://localhost:3000`              |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
            app_url: std::env::var("APP_URL").unwrap_or_else(|_| DEFAULT_APP_URL.to_string()),
        })
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// A rendered reminder email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Human phrase for the distance to the end date.
pub fn days_phrase(days_until_end: i64) -> String {
    fn plural(n: i64) -> &'static str {
        if n == 1 {
            "day"
        } else {
            "days"
        }
    }

    match days_until_end {
        0 => "ending today".to_string(),
        d if d < 0 => format!("ended {} {} ago", -d, plural(-d)),
        d => format!("ending in {d} {}", plural(d)),
    }
}

/// Render the subject and both bodies of a reminder email.
pub fn render_reminder(notice: &ReminderNotice, app_url: &str) -> RenderedEmail {
    let label = notice.reminder_type.label();
    let phrase = days_phrase(notice.days_until_end);
    let end_date = notice.end_date.format("%B %-d, %Y");
    let dashboard = format!("{}/dashboard", app_url.trim_end_matches('/'));

    let subject = format!("Reminder: {} {label} Due Soon", notice.contract_name);

    let text = format!(
        "Contract {label} Reminder\n\n\
         Your contract \"{name}\" with {client} is {phrase}.\n\
         End date: {end_date}\n\n\
         View your contracts: {dashboard}\n",
        name = notice.contract_name,
        client = notice.client_name,
    );

    let html = format!(
        "<h2>Contract {label} Reminder</h2>\
         <p>Your contract <strong>{name}</strong> with {client} is {phrase}.</p>\
         <p>End date: {end_date}</p>\
         <p><a href=\"{dashboard}\">View your contracts</a></p>",
        name = escape_html(&notice.contract_name),
        client = escape_html(&notice.client_name),
    );

    RenderedEmail {
        subject,
        text,
        html,
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// EmailDelivery
// ---------------------------------------------------------------------------

/// Sends reminder emails via SMTP.
pub struct EmailDelivery {
    config: EmailConfig,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailDelivery {
    /// Build the SMTP transport for the given configuration.
    ///
    /// No connection is opened until the first send.
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            mailer: builder.build(),
            config,
        })
    }

    /// Send one reminder email to `to_email`.
    pub async fn deliver(&self, to_email: &str, notice: &ReminderNotice) -> Result<(), EmailError> {
        let rendered = render_reminder(notice, &self.config.app_url);

        let email = Message::builder()
            .from(self.config.from_address.parse()?)
            .to(to_email.parse()?)
            .subject(rendered.subject)
            .multipart(MultiPart::alternative_plain_html(
                rendered.text,
                rendered.html,
            ))
            .map_err(|e| EmailError::Build(e.to_string()))?;

        self.mailer.send(email).await?;

        tracing::info!(
            to = to_email,
            reminder_type = %notice.reminder_type,
            "Reminder email sent"
        );
        Ok(())
    }
}

#[async_trait]
impl ReminderNotifier for EmailDelivery {
    async fn notify(&self, to: &str, notice: &ReminderNotice) -> Result<(), NotifyError> {
        self.deliver(to, notice).await.map_err(NotifyError::from)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
