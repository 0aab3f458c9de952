use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::client::Analyzer;
use crate::error::{RequestError, ValidationError};
use crate::messages::{self, Locale};
use crate::models::AnalysisResult;
use crate::monitor::{ConnectionMonitor, ConnectionState};
use crate::render::ResultView;
use crate::validation::HealthForm;

/// How long a notice stays visible
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

/// Initialize tracing and logging for the application.
/// Logs go to stderr so rendered results on stdout stay clean.
pub fn init_tracing(filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(filter).unwrap_or_else(|_| "health_client=info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient message shown above the form
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub lines: Vec<String>,
    pub shown_at: Instant,
}

impl Notice {
    fn new(level: NoticeLevel, lines: Vec<String>) -> Self {
        Self {
            level,
            lines,
            shown_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= NOTICE_TTL
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Result of one form submission
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Analyzed(AnalysisResult),
    Invalid(Vec<ValidationError>),
    Failed(RequestError),
    /// A submission was already pending
    Busy,
}

#[derive(Debug, Default)]
struct ViewState {
    result: Option<AnalysisResult>,
    notice: Option<Notice>,
}

/// Application state and controller for the health form.
///
/// The analyzer and the connection monitor are injected; the controller never
/// reaches for globals.
pub struct HealthApp {
    analyzer: Arc<dyn Analyzer>,
    monitor: ConnectionMonitor,
    locale: Locale,
    loading: AtomicBool,
    view: Mutex<ViewState>,
}

/// Clears the loading flag even if the submission future is dropped
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl HealthApp {
    pub fn new(analyzer: Arc<dyn Analyzer>, monitor: ConnectionMonitor, locale: Locale) -> Self {
        Self {
            analyzer,
            monitor,
            locale,
            loading: AtomicBool::new(false),
            view: Mutex::new(ViewState::default()),
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn monitor(&self) -> &ConnectionMonitor {
        &self.monitor
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Validates the form and, if it passes, submits it for analysis.
    /// Invalid input never reaches the analyzer.
    pub async fn submit_form(&self, form: &HealthForm) -> SubmitOutcome {
        let input = match form.validate() {
            Ok(input) => input,
            Err(errors) => {
                info!("Form rejected by local validation ({} errors)", errors.len());
                let lines = errors.iter().map(|e| e.user_message(self.locale)).collect();
                self.view.lock().await.notice = Some(Notice::new(NoticeLevel::Error, lines));
                return SubmitOutcome::Invalid(errors);
            }
        };

        if self
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Submission ignored, another one is pending");
            return SubmitOutcome::Busy;
        }
        let _guard = LoadingGuard(&self.loading);

        let outcome = self.analyzer.analyze(&input).await;

        let mut view = self.view.lock().await;
        match outcome {
            Ok(result) => {
                view.result = Some(result.clone());
                view.notice = Some(Notice::new(
                    NoticeLevel::Success,
                    vec![messages::analysis_succeeded(self.locale).to_string()],
                ));
                SubmitOutcome::Analyzed(result)
            }
            Err(error) => {
                warn!("Analysis failed: {}", error);
                let base_url = &self.monitor.config().base_url;
                view.result = None;
                view.notice = Some(Notice::new(
                    NoticeLevel::Error,
                    vec![format!(
                        "{}: {}",
                        messages::submission_failed(self.locale),
                        error.user_message(self.locale, base_url)
                    )],
                ));
                SubmitOutcome::Failed(error)
            }
        }
    }

    /// Clears the displayed result and any notice
    pub async fn reset(&self) {
        let mut view = self.view.lock().await;
        view.result = None;
        view.notice = None;
        debug!("Form reset");
    }

    pub async fn result(&self) -> Option<AnalysisResult> {
        self.view.lock().await.result.clone()
    }

    pub async fn result_view(&self) -> Option<ResultView> {
        self.view
            .lock()
            .await
            .result
            .as_ref()
            .map(|result| ResultView::new(result, self.locale))
    }

    /// The notice to display at `now`; expired notices are dropped
    pub async fn current_notice(&self, now: Instant) -> Option<Notice> {
        let mut view = self.view.lock().await;
        if view.notice.as_ref().is_some_and(|n| n.is_expired(now)) {
            view.notice = None;
        }
        view.notice.clone()
    }

    pub fn connection_text(&self) -> String {
        self.monitor.current().display_text(self.locale)
    }

    /// Begins background health polling at the configured interval
    pub async fn start_monitoring(&self) {
        let interval = self.monitor.config().poll_interval();
        self.monitor.start_polling(interval).await;
    }

    pub async fn stop_monitoring(&self) {
        self.monitor.stop_polling().await;
    }

    /// Called when the display regains focus
    pub async fn on_visible(&self) -> ConnectionState {
        self.monitor.notify_visible().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{Gender, HealthInput};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    struct FakeAnalyzer {
        calls: AtomicUsize,
        gate: Option<Arc<Notify>>,
        response: Result<f64, RequestError>,
    }

    impl FakeAnalyzer {
        fn answering(bmi: f64) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                gate: None,
                response: Ok(bmi),
            }
        }

        fn failing(error: RequestError) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                gate: None,
                response: Err(error),
            }
        }
    }

    #[async_trait]
    impl Analyzer for FakeAnalyzer {
        async fn analyze(&self, input: &HealthInput) -> Result<AnalysisResult, RequestError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.response.clone().map(|bmi| AnalysisResult {
                user_info: input.clone(),
                bmi,
                category: "Normal".to_string(),
                color: "#27ae60".to_string(),
                advice: "Keep it up".to_string(),
                ideal_weight_range: None,
                recommendations: None,
            })
        }
    }

    fn app(analyzer: Arc<FakeAnalyzer>) -> HealthApp {
        let monitor = ConnectionMonitor::new(Config::default()).unwrap();
        HealthApp::new(analyzer, monitor, Locale::En)
    }

    fn ana() -> HealthForm {
        HealthForm {
            name: Some("Ana".to_string()),
            age: Some("30".to_string()),
            gender: Some("female".to_string()),
            height: Some("165".to_string()),
            weight: Some("60".to_string()),
        }
    }

    #[tokio::test]
    async fn test_successful_submission_renders_result() {
        let analyzer = Arc::new(FakeAnalyzer::answering(22.0));
        let app = app(analyzer.clone());

        let outcome = app.submit_form(&ana()).await;
        let SubmitOutcome::Analyzed(result) = outcome else {
            panic!("expected analysis, got {outcome:?}");
        };
        assert_eq!(result.user_info.gender, Gender::Female);

        let view = app.result_view().await.unwrap();
        assert_eq!(view.bmi, "22.0");
        assert_eq!(view.category, "Normal");

        let notice = app.current_notice(Instant::now()).await.unwrap();
        assert_eq!(notice.level, NoticeLevel::Success);
        assert!(!app.is_loading());
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_analyzer() {
        let analyzer = Arc::new(FakeAnalyzer::answering(22.0));
        let app = app(analyzer.clone());
        let mut form = ana();
        form.age = Some("130".to_string());

        let outcome = app.submit_form(&form).await;
        assert!(matches!(outcome, SubmitOutcome::Invalid(ref errors) if errors.len() == 1));
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);

        let notice = app.current_notice(Instant::now()).await.unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.text(), "Age must be between 1-120 years");
        assert!(!app.is_loading());
    }

    #[tokio::test]
    async fn test_failure_clears_previous_result() {
        let ok = Arc::new(FakeAnalyzer::answering(22.0));
        let monitor = ConnectionMonitor::new(Config::default()).unwrap();
        let app = HealthApp::new(ok, monitor.clone(), Locale::Id);
        app.submit_form(&ana()).await;
        assert!(app.result().await.is_some());

        let failing = Arc::new(FakeAnalyzer::failing(RequestError::Timeout {
            timeout_ms: 10_000,
        }));
        let app = HealthApp {
            analyzer: failing,
            ..app
        };
        let outcome = app.submit_form(&ana()).await;
        assert!(matches!(outcome, SubmitOutcome::Failed(RequestError::Timeout { .. })));
        assert!(app.result().await.is_none());

        let notice = app.current_notice(Instant::now()).await.unwrap();
        assert_eq!(
            notice.text(),
            "Koneksi ke server gagal: Request timeout (10s) - silakan coba lagi"
        );
    }

    #[tokio::test]
    async fn test_notice_expires_after_ttl() {
        let app = app(Arc::new(FakeAnalyzer::answering(22.0)));
        app.submit_form(&ana()).await;

        let shown_at = app.current_notice(Instant::now()).await.unwrap().shown_at;
        assert!(app.current_notice(shown_at + NOTICE_TTL).await.is_none());
        assert!(app.current_notice(Instant::now()).await.is_none());
    }

    #[tokio::test]
    async fn test_second_submission_while_pending_is_busy() {
        let gate = Arc::new(Notify::new());
        let analyzer = Arc::new(FakeAnalyzer {
            calls: AtomicUsize::new(0),
            gate: Some(gate.clone()),
            response: Ok(22.0),
        });
        let app = Arc::new(app(analyzer.clone()));

        let first = {
            let app = app.clone();
            tokio::spawn(async move { app.submit_form(&ana()).await })
        };
        while analyzer.calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        assert!(app.is_loading());
        assert_eq!(app.submit_form(&ana()).await, SubmitOutcome::Busy);

        let mut invalid = ana();
        invalid.weight = Some("5".to_string());
        assert!(matches!(
            app.submit_form(&invalid).await,
            SubmitOutcome::Invalid(ref errors) if errors.len() == 1
        ));
        assert!(app.is_loading());

        gate.notify_one();
        assert!(matches!(first.await.unwrap(), SubmitOutcome::Analyzed(_)));
        assert_eq!(analyzer.calls.load(Ordering::SeqCst), 1);
        assert!(!app.is_loading());
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let app = app(Arc::new(FakeAnalyzer::answering(22.0)));
        app.submit_form(&ana()).await;
        app.reset().await;
        assert!(app.result().await.is_none());
        assert!(app.current_notice(Instant::now()).await.is_none());
        assert_eq!(app.connection_text(), "Checking backend...");
    }
}
