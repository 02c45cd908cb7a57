//! Metrics collection and exposition.
//!
//! # Metrics
//! - `redcheck_fetches_total` (counter): fetches by kind (primary, child,
//!   check name, robots) and outcome (complete or error kind)
//! - `redcheck_fetch_duration_seconds` (histogram): fetch latency by kind
//! - `redcheck_active_checks_total` (counter): checks by name and outcome
//!   (ran, skipped, failed)
//! - `redcheck_notes_total` (counter): notes attached, by level

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::fetch::FetchError;
use crate::message::HttpMessage;
use crate::notes::NoteList;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Outcome label of a terminal message.
pub fn outcome(message: &HttpMessage) -> &'static str {
    error_outcome(message.error.as_ref())
}

/// Outcome label of a fetch that may have failed.
pub fn error_outcome(error: Option<&FetchError>) -> &'static str {
    match error {
        Some(error) => error.kind(),
        None => "complete",
    }
}

pub fn record_fetch(kind: &str, message: &HttpMessage, elapsed: Duration) {
    record_fetch_outcome(kind, outcome(message), elapsed);
}

pub fn record_fetch_outcome(kind: &str, outcome: &'static str, elapsed: Duration) {
    let kind = kind.to_string();
    counter!("redcheck_fetches_total", "kind" => kind.clone(), "outcome" => outcome).increment(1);
    histogram!("redcheck_fetch_duration_seconds", "kind" => kind).record(elapsed.as_secs_f64());
}

pub fn record_check(check: &'static str, outcome: &'static str) {
    counter!("redcheck_active_checks_total", "check" => check, "outcome" => outcome).increment(1);
}

pub fn record_notes(notes: &NoteList) {
    for note in notes {
        counter!("redcheck_notes_total", "level" => note.level().as_str()).increment(1);
    }
}
