#![allow(dead_code)]

use axum::Router;
use axum::http::HeaderMap;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use health_client::config::Config;
use health_client::validation::HealthForm;

/// Serves `router` on an ephemeral local port and returns its base URL
pub async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock backend");
    let addr = listener.local_addr().expect("mock backend address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("mock backend");
    });
    format!("http://{addr}")
}

/// A URL on which nothing is listening
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe port");
    let addr = listener.local_addr().expect("probe port address");
    drop(listener);
    format!("http://{addr}")
}

pub fn config_for(base_url: &str) -> Config {
    let mut config = Config::default().with_base_url(base_url);
    config.timeout_ms = 2_000;
    config.probe_timeout_ms = 1_000;
    config
}

pub fn ana_form() -> HealthForm {
    HealthForm {
        name: Some("Ana".to_string()),
        age: Some("30".to_string()),
        gender: Some("female".to_string()),
        height: Some("165".to_string()),
        weight: Some("60".to_string()),
    }
}

/// Successful analyze body echoing the submitted user info
pub fn analysis_envelope(user_info: Value) -> Value {
    json!({
        "success": true,
        "data": {
            "userInfo": user_info,
            "analysis": {
                "bmi": 22.0,
                "category": "Normal",
                "color": "#27ae60",
                "advice": "Maintain a balanced diet and regular exercise."
            },
            "idealWeight": {"min": 50.4, "max": 68.1},
            "recommendations": {
                "general": "Keep up the healthy habits.",
                "specific": ["Drink enough water", "Sleep 7-8 hours"]
            }
        }
    })
}

/// Request headers seen by the mock backend
#[derive(Debug, Default, Clone)]
pub struct SeenHeaders(pub Arc<Mutex<Vec<HeaderMap>>>);

impl SeenHeaders {
    pub fn record(&self, headers: HeaderMap) {
        self.0.lock().expect("headers lock").push(headers);
    }

    pub fn last(&self) -> Option<HeaderMap> {
        self.0.lock().expect("headers lock").last().cloned()
    }
}

pub async fn never_respond() -> &'static str {
    tokio::time::sleep(Duration::from_secs(60)).await;
    "too late"
}
