//! Shared HTTP plumbing for the request client and the connection monitor.
//!
//! Both surfaces build their `reqwest::Client` here and run every request
//! through [`send_with_deadline`], so a given transport failure is classified
//! by the same rules whichever surface observed it.

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, StatusCode};
use std::error::Error as StdError;
use std::time::Duration;
use tracing::debug;

pub const USER_AGENT: &str = concat!("health-client/", env!("CARGO_PKG_VERSION"));

/// Coarse classification of a failed request that never produced a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Timeout,
    ConnectFailed,
    CorsBlocked,
    NetworkError,
    Other,
}

/// A request that did not produce an HTTP response
#[derive(Debug, Clone, PartialEq)]
pub struct TransportFailure {
    pub kind: FailureKind,
    pub description: String,
}

/// Raw response, body fully read
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

pub fn build_http_client() -> reqwest::Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .build()
}

/// Sends the request and reads the body, giving up after `deadline`.
///
/// On expiry the in-flight future is dropped, which aborts the connection.
pub async fn send_with_deadline(
    request: RequestBuilder,
    deadline: Duration,
) -> Result<RawResponse, TransportFailure> {
    let exchange = async {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok::<_, reqwest::Error>(RawResponse { status, body })
    };

    match tokio::time::timeout(deadline, exchange).await {
        Ok(Ok(raw)) => Ok(raw),
        Ok(Err(e)) => Err(classify_reqwest(&e)),
        Err(_) => {
            debug!("Request exceeded deadline of {:?}", deadline);
            Err(TransportFailure {
                kind: FailureKind::Timeout,
                description: format!("no response within {} ms", deadline.as_millis()),
            })
        }
    }
}

/// Classifies a `reqwest` error, inspecting the whole source chain
pub fn classify_reqwest(error: &reqwest::Error) -> TransportFailure {
    let mut description = describe_chain(error);
    // The URL is part of reqwest's message and must not feed the keyword match
    if let Some(url) = error.url() {
        description = description.replace(&format!(" for url ({url})"), "");
        description = description.replace(url.as_str(), "");
    }
    let kind = if error.is_timeout() {
        FailureKind::Timeout
    } else {
        match classify_description(&description) {
            FailureKind::Other if error.is_connect() => FailureKind::ConnectFailed,
            FailureKind::Other if error.is_request() => FailureKind::NetworkError,
            kind => kind,
        }
    };
    TransportFailure { kind, description }
}

/// Classifies a failure from its textual description alone
pub fn classify_description(description: &str) -> FailureKind {
    let text = description.to_lowercase();
    let any = |needles: &[&str]| needles.iter().any(|n| text.contains(n));

    if any(&["timed out", "timeout", "aborterror"]) {
        FailureKind::Timeout
    } else if any(&["cors", "cross-origin"]) {
        FailureKind::CorsBlocked
    } else if any(&[
        "failed to fetch",
        "connection refused",
        "dns",
        "failed to lookup",
        "no such host",
        "name or service not known",
    ]) {
        FailureKind::ConnectFailed
    } else if any(&[
        "networkerror",
        "network",
        "connection reset",
        "connection closed",
        "broken pipe",
    ]) {
        FailureKind::NetworkError
    } else {
        FailureKind::Other
    }
}

fn describe_chain(error: &(dyn StdError + 'static)) -> String {
    let mut parts = vec![error.to_string()];
    let mut source = error.source();
    while let Some(inner) = source {
        parts.push(inner.to_string());
        source = inner.source();
    }
    parts.join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_description() {
        assert_eq!(
            classify_description("TypeError: Failed to fetch"),
            FailureKind::ConnectFailed
        );
        assert_eq!(
            classify_description("tcp connect error: Connection refused (os error 111)"),
            FailureKind::ConnectFailed
        );
        assert_eq!(
            classify_description("dns error: failed to lookup address information"),
            FailureKind::ConnectFailed
        );
        assert_eq!(
            classify_description("Access blocked by CORS policy"),
            FailureKind::CorsBlocked
        );
        assert_eq!(
            classify_description("NetworkError when attempting to fetch resource."),
            FailureKind::NetworkError
        );
        assert_eq!(
            classify_description("connection reset by peer"),
            FailureKind::NetworkError
        );
        assert_eq!(
            classify_description("operation timed out"),
            FailureKind::Timeout
        );
        assert_eq!(classify_description("something odd"), FailureKind::Other);
    }

    #[test]
    fn test_user_agent_names_the_client() {
        assert!(USER_AGENT.starts_with("health-client/"));
    }
}
