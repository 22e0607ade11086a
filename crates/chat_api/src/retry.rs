//! Which dispatch failures are worth another attempt, and how long to wait.

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use reqwest::StatusCode;

const BASE_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF_DOUBLINGS: u32 = 6;

fn transient_body_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)rate.?limit|overloaded|temporarily unavailable|service.?unavailable|upstream.?connect|connection.?(refused|reset)",
        )
        .expect("transient body pattern must compile")
    })
}

/// Too-many-requests, gateway-class server errors, or a body that reads like
/// a transient upstream condition.
#[must_use]
pub fn is_transient(status: StatusCode, body: &str) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || (status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED)
        || transient_body_pattern().is_match(body)
}

/// Wait before retry number `attempt` (zero-based): 1s, 2s, 4s, ... capped at 64s.
#[must_use]
pub fn backoff(attempt: u32) -> Duration {
    BASE_BACKOFF.saturating_mul(1 << attempt.min(MAX_BACKOFF_DOUBLINGS))
}
