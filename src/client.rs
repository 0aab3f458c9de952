use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::RequestError;
use crate::models::{AnalysisData, AnalysisResult, Envelope, ErrorBody, HealthInput, RecentRecord};
use crate::transport::{RawResponse, TransportFailure, build_http_client, send_with_deadline};

/// Anything able to turn a validated input into an analysis.
/// The application controller only depends on this seam.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, input: &HealthInput) -> Result<AnalysisResult, RequestError>;
}

/// Client for the remote analysis service
#[derive(Debug, Clone)]
pub struct AnalysisRequestClient {
    http: reqwest::Client,
    config: Config,
}

impl AnalysisRequestClient {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http = build_http_client()?;
        Ok(Self::with_http_client(http, config))
    }

    pub fn with_http_client(http: reqwest::Client, config: Config) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Submits one analysis request.
    ///
    /// Never retried: `retry_attempts` is carried in the configuration but a
    /// failed submission is surfaced as-is and the caller decides whether to
    /// submit again.
    pub async fn submit(&self, input: &HealthInput) -> Result<AnalysisResult, RequestError> {
        let url = self.config.analyze_url();
        info!("Sending health data for '{}' to {}", input.name, url);

        let request = self.http.post(&url).json(input);
        let raw = send_with_deadline(request, self.config.timeout())
            .await
            .map_err(|failure| self.transport_error(failure))?;

        info!("Received response status: {}", raw.status);
        debug!("Response body: {}", raw.body);

        if !raw.status.is_success() {
            return Err(rejection(&raw));
        }

        let data = unwrap_envelope(&raw)?;
        for field in ["userInfo", "analysis"] {
            if data.get(field).is_none() {
                warn!("Analysis response is missing '{}'", field);
                return Err(RequestError::MalformedResponse(format!(
                    "response data has no '{field}' field"
                )));
            }
        }

        let data: AnalysisData = serde_json::from_value(data)
            .map_err(|e| RequestError::MalformedResponse(e.to_string()))?;
        info!(
            "Analysis received: bmi={} category='{}'",
            data.analysis.bmi, data.analysis.category
        );
        Ok(data.into())
    }

    /// Fetches the service's root document
    pub async fn backend_info(&self) -> Result<Value, RequestError> {
        let url = self.config.endpoint("/");
        debug!("Requesting backend info from {}", url);

        let raw = send_with_deadline(self.http.get(&url), self.config.timeout())
            .await
            .map_err(|failure| self.transport_error(failure))?;
        if !raw.status.is_success() {
            return Err(rejection(&raw));
        }
        serde_json::from_str(&raw.body).map_err(|e| RequestError::MalformedResponse(e.to_string()))
    }

    /// Lists the most recent analyses stored by the service
    pub async fn recent_records(&self, limit: usize) -> Result<Vec<RecentRecord>, RequestError> {
        let url = self.config.records_url(limit);
        info!("Loading recent records from {}", url);

        let raw = send_with_deadline(self.http.get(&url), self.config.timeout())
            .await
            .map_err(|failure| self.transport_error(failure))?;
        if !raw.status.is_success() {
            return Err(rejection(&raw));
        }

        let data = unwrap_envelope(&raw)?;
        let records: Vec<RecentRecord> = serde_json::from_value(data)
            .map_err(|e| RequestError::MalformedResponse(e.to_string()))?;
        debug!("Loaded {} recent records", records.len());
        Ok(records)
    }

    fn transport_error(&self, failure: TransportFailure) -> RequestError {
        warn!(
            "Request to backend failed ({:?}): {}",
            failure.kind, failure.description
        );
        RequestError::from_failure(failure.kind, failure.description, self.config.timeout_ms)
    }
}

#[async_trait]
impl Analyzer for AnalysisRequestClient {
    async fn analyze(&self, input: &HealthInput) -> Result<AnalysisResult, RequestError> {
        self.submit(input).await
    }
}

/// Builds `ServerRejected` from a non-2xx response, preferring the body's message
fn rejection(raw: &RawResponse) -> RequestError {
    let message = serde_json::from_str::<ErrorBody>(&raw.body)
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_else(|| {
            format!(
                "HTTP {}: {}",
                raw.status.as_u16(),
                raw.status.canonical_reason().unwrap_or("Unknown Status")
            )
        });
    warn!("Server rejected request ({}): {}", raw.status, message);
    RequestError::ServerRejected {
        message,
        status: raw.status.as_u16(),
    }
}

/// Opens a `{success, data|message}` envelope and returns `data`
fn unwrap_envelope(raw: &RawResponse) -> Result<Value, RequestError> {
    let envelope: Envelope<Value> = serde_json::from_str(&raw.body)
        .map_err(|e| RequestError::MalformedResponse(format!("invalid JSON envelope: {e}")))?;

    if !envelope.success {
        return Err(RequestError::ServerRejected {
            message: envelope
                .message
                .unwrap_or_else(|| "Analysis failed on server".to_string()),
            status: raw.status.as_u16(),
        });
    }

    envelope
        .data
        .ok_or_else(|| RequestError::MalformedResponse("envelope has no 'data'".to_string()))
}
