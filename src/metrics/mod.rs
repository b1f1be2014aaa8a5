//! Prometheus metrics and the status surface
//!
//! Exposes:
//! - `/metrics` - prometheus text format
//! - `/status`  - JSON with the last recorded error string

use axum::extract::State;
use axum::response::Json;
use axum::{routing::get, Router};
use lazy_static::lazy_static;
use prometheus::{
    register_int_counter_vec, register_int_gauge_vec, Encoder, IntCounterVec, IntGaugeVec,
    TextEncoder,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};
use tracing::info;

lazy_static! {
    pub static ref NUM_BATCHES: IntGaugeVec = register_int_gauge_vec!(
        "bridge_relayer_num_batches",
        "Last seen batch id on the originating chain",
        &["direction"]
    )
    .unwrap();

    pub static ref CLIENT_ERRORS: IntCounterVec = register_int_counter_vec!(
        "bridge_relayer_client_errors_total",
        "Total chain client errors observed by the executor",
        &["direction"]
    )
    .unwrap();
}

/// Write-through handle for the string metrics and the per-direction gauges.
/// One instance per direction, shared with the executor.
pub struct StatusHandler {
    direction: &'static str,
    last_error: RwLock<String>,
}

impl StatusHandler {
    pub fn new(direction: &'static str) -> Self {
        Self {
            direction,
            last_error: RwLock::new(String::new()),
        }
    }

    pub fn direction(&self) -> &'static str {
        self.direction
    }

    pub fn set_last_error(&self, message: String) {
        CLIENT_ERRORS.with_label_values(&[self.direction]).inc();
        *self.last_error.write().unwrap() = message;
    }

    pub fn last_error(&self) -> String {
        self.last_error.read().unwrap().clone()
    }

    pub fn set_num_batches(&self, num_batches: u64) {
        NUM_BATCHES
            .with_label_values(&[self.direction])
            .set(num_batches as i64);
    }
}

/// Serves `/metrics` and `/status` for the relayer process.
pub struct MetricsServer {
    port: u16,
    handlers: Vec<Arc<StatusHandler>>,
}

impl MetricsServer {
    pub fn new(port: u16, handlers: Vec<Arc<StatusHandler>>) -> Self {
        Self { port, handlers }
    }

    pub async fn run(self) -> std::io::Result<()> {
        let app = Router::new()
            .route("/metrics", get(metrics_handler))
            .route("/status", get(status_handler))
            .with_state(self.handlers);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!("Starting metrics server on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await
    }
}

async fn metrics_handler() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap_or_default();
    String::from_utf8(buffer).unwrap_or_default()
}

async fn status_handler(State(handlers): State<Vec<Arc<StatusHandler>>>) -> Json<Value> {
    let directions: Vec<Value> = handlers
        .iter()
        .map(|handler| {
            json!({
                "direction": handler.direction(),
                "last_error": handler.last_error(),
            })
        })
        .collect();

    Json(json!({ "directions": directions }))
}
