pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod messages;
pub mod models;
pub mod monitor;
pub mod render;
pub mod transport;
pub mod validation;

// Re-export the main entry points for convenience
pub use app::{HealthApp, SubmitOutcome, init_tracing};
pub use client::{AnalysisRequestClient, Analyzer};
pub use config::Config;
pub use error::{RequestError, ValidationError};
pub use monitor::{ConnectionMonitor, ConnectionState, ConnectionStatus};
