//! Scheduler authorisation for the dispatch endpoint.
//!
//! A caller is a trusted scheduler if it presents the shared secret as a
//! bearer token, or, when enabled, the `x-vercel-cron: 1` header set by the
//! hosting platform's cron runner.

use sha2::{Digest, Sha256};

/// Header set by the hosting platform on cron-triggered requests.
pub const SCHEDULER_HEADER: &str = "x-vercel-cron";

/// Whether the presented credentials identify a trusted scheduler.
///
/// `authorization` is the raw `Authorization` header value and
/// `scheduler_header` the raw [`SCHEDULER_HEADER`] value, if present.
pub fn is_trusted_scheduler(
    authorization: Option<&str>,
    scheduler_header: Option<&str>,
    cron_secret: Option<&str>,
    trust_scheduler_header: bool,
) -> bool {
    if trust_scheduler_header && scheduler_header.map(str::trim) == Some("1") {
        return true;
    }

    let (Some(secret), Some(token)) = (
        cron_secret,
        authorization.and_then(|h| h.strip_prefix("Bearer ")),
    ) else {
        return false;
    };

    secrets_match(token.trim(), secret)
}

/// Compare two secrets via their SHA-256 digests so the comparison time does
/// not depend on where the inputs first differ.
fn secrets_match(presented: &str, expected: &str) -> bool {
    let a = Sha256::digest(presented.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
