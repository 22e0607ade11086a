use std::time::Duration;

use chat_api::retry::{backoff, is_transient};
use reqwest::StatusCode;

#[test]
fn throttling_and_gateway_statuses_are_transient() {
    for status in [
        StatusCode::TOO_MANY_REQUESTS,
        StatusCode::INTERNAL_SERVER_ERROR,
        StatusCode::BAD_GATEWAY,
        StatusCode::SERVICE_UNAVAILABLE,
        StatusCode::GATEWAY_TIMEOUT,
    ] {
        assert!(is_transient(status, ""), "{status} should be transient");
    }

    assert!(!is_transient(StatusCode::NOT_IMPLEMENTED, ""));
    assert!(!is_transient(StatusCode::UNAUTHORIZED, "Incorrect API key provided"));
    assert!(!is_transient(StatusCode::BAD_REQUEST, "model not found"));
}

#[test]
fn transient_wording_in_body_is_retried() {
    assert!(is_transient(StatusCode::BAD_REQUEST, "Rate limit reached for gpt-4o"));
    assert!(is_transient(StatusCode::BAD_REQUEST, "The engine is currently overloaded"));
    assert!(is_transient(StatusCode::FORBIDDEN, "upstream connect error"));
}

#[test]
fn backoff_doubles_and_caps() {
    assert_eq!(backoff(0), Duration::from_secs(1));
    assert_eq!(backoff(1), Duration::from_secs(2));
    assert_eq!(backoff(2), Duration::from_secs(4));
    assert_eq!(backoff(6), Duration::from_secs(64));
    assert_eq!(backoff(40), Duration::from_secs(64));
}
