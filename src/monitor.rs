use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::messages::{self, Locale};
use crate::models::HealthStatus;
use crate::transport::{FailureKind, build_http_client, send_with_deadline};

/// Reachability of the backend as last observed by a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Unknown,
    Online,
    Offline,
    Timeout,
    CorsError,
    NetworkError,
}

impl ConnectionState {
    /// Same table `RequestError::from_failure` uses, read from the probe side
    pub fn from_failure(kind: FailureKind) -> Self {
        match kind {
            FailureKind::Timeout => ConnectionState::Timeout,
            FailureKind::ConnectFailed | FailureKind::NetworkError => ConnectionState::NetworkError,
            FailureKind::CorsBlocked => ConnectionState::CorsError,
            FailureKind::Other => ConnectionState::Offline,
        }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, ConnectionState::Online)
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (ConnectionState::Unknown, _) => messages::checking_backend(locale),
            (ConnectionState::Online, Locale::En) => "Backend Online",
            (ConnectionState::Online, Locale::Id) => "Backend Terhubung",
            (ConnectionState::Offline, Locale::En) => "Backend Offline",
            (ConnectionState::Offline, Locale::Id) => "Backend Tidak Aktif",
            (ConnectionState::Timeout, Locale::En) => "Connection Timeout",
            (ConnectionState::Timeout, Locale::Id) => "Koneksi Timeout",
            (ConnectionState::CorsError, _) => "CORS Error",
            (ConnectionState::NetworkError, Locale::En) => "Network Error",
            (ConnectionState::NetworkError, Locale::Id) => "Kesalahan Jaringan",
        }
    }
}

/// What observers of the monitor receive
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    pub backend_version: Option<String>,
    /// Failure description, shown as a hover/tooltip detail
    pub detail: Option<String>,
}

impl ConnectionStatus {
    fn online(version: Option<String>) -> Self {
        Self {
            state: ConnectionState::Online,
            backend_version: version,
            detail: None,
        }
    }

    fn failed(state: ConnectionState, detail: String) -> Self {
        Self {
            state,
            backend_version: None,
            detail: Some(detail),
        }
    }

    /// Status line text, e.g. "Backend Connected (v1.2.0)"
    pub fn display_text(&self, locale: Locale) -> String {
        match (self.state, locale) {
            (ConnectionState::Online, Locale::En) => format!(
                "Backend Connected (v{})",
                self.backend_version.as_deref().unwrap_or("1.0.0")
            ),
            (ConnectionState::Online, Locale::Id) => format!(
                "Backend Terhubung (v{})",
                self.backend_version.as_deref().unwrap_or("1.0.0")
            ),
            (state, _) => state.label(locale).to_string(),
        }
    }
}

/// Tracks whether the backend answers its health endpoint.
///
/// Cheap to clone; clones share the same state and polling task.
#[derive(Debug, Clone)]
pub struct ConnectionMonitor {
    inner: Arc<MonitorInner>,
}

#[derive(Debug)]
struct MonitorInner {
    http: reqwest::Client,
    config: Config,
    status: watch::Sender<ConnectionStatus>,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for MonitorInner {
    fn drop(&mut self) {
        if let Some(handle) = self.poller.get_mut().take() {
            handle.abort();
        }
    }
}

impl ConnectionMonitor {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http = build_http_client()?;
        Ok(Self::with_http_client(http, config))
    }

    pub fn with_http_client(http: reqwest::Client, config: Config) -> Self {
        let (status, _) = watch::channel(ConnectionStatus::default());
        Self {
            inner: Arc::new(MonitorInner {
                http,
                config,
                status,
                poller: Mutex::new(None),
            }),
        }
    }

    /// Probes the health endpoint once and publishes the outcome
    pub async fn probe(&self) -> ConnectionState {
        let config = &self.inner.config;
        let url = config.health_url();
        debug!("Testing connection to {}", url);

        let status =
            match send_with_deadline(self.inner.http.get(&url), config.probe_timeout()).await {
                Ok(raw) if raw.status.is_success() => {
                    let health: HealthStatus = serde_json::from_str(&raw.body).unwrap_or_default();
                    info!(
                        "Backend connection successful (version {})",
                        health.version.as_deref().unwrap_or("unknown")
                    );
                    ConnectionStatus::online(health.version)
                }
                Ok(raw) => {
                    warn!("Backend health check returned {}", raw.status);
                    ConnectionStatus::failed(
                        ConnectionState::Offline,
                        format!("HTTP {}", raw.status),
                    )
                }
                Err(failure) => {
                    warn!(
                        "Backend connection failed ({:?}): {}",
                        failure.kind, failure.description
                    );
                    ConnectionStatus::failed(
                        ConnectionState::from_failure(failure.kind),
                        failure.description,
                    )
                }
            };

        let state = status.state;
        self.inner.status.send_replace(status);
        state
    }

    /// Re-probes right away, e.g. when the display comes back to the foreground.
    /// Does not touch the polling cadence.
    pub async fn notify_visible(&self) -> ConnectionState {
        debug!("Display visible again, re-probing backend");
        self.probe().await
    }

    /// Starts probing every `interval`, beginning immediately.
    /// A running loop is replaced.
    pub async fn start_polling(&self, interval: Duration) {
        let mut poller = self.inner.poller.lock().await;
        if let Some(previous) = poller.take() {
            previous.abort();
        }

        info!("Polling backend health every {:?}", interval);
        // The task must not keep the monitor alive on its own
        let weak = Arc::downgrade(&self.inner);
        *poller = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    debug!("Monitor dropped, polling loop exiting");
                    break;
                };
                ConnectionMonitor { inner }.probe().await;
            }
        }));
    }

    pub async fn stop_polling(&self) {
        if let Some(handle) = self.inner.poller.lock().await.take() {
            handle.abort();
            info!("Stopped backend health polling");
        }
    }

    pub async fn is_polling(&self) -> bool {
        self.inner
            .poller
            .lock()
            .await
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionStatus> {
        self.inner.status.subscribe()
    }

    pub fn current(&self) -> ConnectionStatus {
        self.inner.status.borrow().clone()
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }
}
