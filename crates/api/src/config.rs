use std::path::PathBuf;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except the JWT
/// secret. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT validation settings.
    pub jwt: JwtConfig,
    /// Shared secret the scheduler presents as a bearer token. When unset,
    /// bearer authentication of the dispatch endpoint always fails.
    pub cron_secret: Option<String>,
    /// Accept `x-vercel-cron: 1` as proof of a trusted scheduler.
    pub trust_scheduler_header: bool,
    /// Upper bound on a single notifier call during dispatch (default: `30`).
    pub dispatch_notify_timeout_secs: u64,
    /// Root directory for uploaded contract documents (default: `storage/uploads`).
    pub upload_dir: PathBuf,
    /// Endpoint of the document extraction service, if any.
    pub extraction_url: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                 |
    /// |--------------------------------|-------------------------|
    /// | `HOST`                         | `0.0.0.0`               |
    /// | `PORT`                         | `3000`                  |
    /// | `CORS_ORIGINS`                 | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`         | `30`                    |
    /// | `CRON_SECRET`                  | unset                   |
    /// | `TRUST_SCHEDULER_HEADER`       | `false`                 |
    /// | `DISPATCH_NOTIFY_TIMEOUT_SECS` | `30`                    |
    /// | `UPLOAD_DIR`                   | `storage/uploads`       |
    /// | `EXTRACTION_SERVICE_URL`       | unset                   |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let cron_secret = non_empty_var("CRON_SECRET");

        let trust_scheduler_header = std::env::var("TRUST_SCHEDULER_HEADER")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let dispatch_notify_timeout_secs: u64 = std::env::var("DISPATCH_NOTIFY_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("DISPATCH_NOTIFY_TIMEOUT_SECS must be a valid u64");

        let upload_dir = PathBuf::from(
            std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "storage/uploads".into()),
        );

        let extraction_url = non_empty_var("EXTRACTION_SERVICE_URL");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            cron_secret,
            trust_scheduler_header,
            dispatch_notify_timeout_secs,
            upload_dir,
            extraction_url,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
