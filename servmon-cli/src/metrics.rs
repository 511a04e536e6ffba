// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Prometheus metrics for the gateway.

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};
use std::net::SocketAddr;

use axum::{http::header, response::IntoResponse, routing::get, Router};
use tokio::net::TcpListener;

lazy_static! {
    pub static ref REQUESTS: IntCounterVec = register_int_counter_vec!(
        "inventory_requests_total",
        "Total number of inventory requests by operation and status code",
        &["operation", "status"]
    )
    .unwrap();
    pub static ref REQUEST_DURATION: HistogramVec = register_histogram_vec!(
        "inventory_request_duration_seconds",
        "Time spent handling an inventory request, store round trip included",
        &["operation"],
        vec![0.0005, 0.001, 0.0025, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250]
    )
    .unwrap();
}

/// Serve the Prometheus text exposition on `addr` from a background task.
pub fn start_metrics_server(addr: SocketAddr) {
    lazy_static::initialize(&REQUESTS);
    lazy_static::initialize(&REQUEST_DURATION);

    tokio::spawn(async move {
        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) => {
                tracing::error!(addr = %addr, error = %e, "Failed to bind metrics server");
                return;
            }
        };

        tracing::info!("Metrics server listening on http://{}/metrics", addr);
        if let Err(e) = serve_metrics(listener).await {
            tracing::error!(addr = %addr, error = %e, "Metrics server stopped");
        }
    });
}

async fn serve_metrics(listener: TcpListener) -> std::io::Result<()> {
    let app = Router::new().route("/metrics", get(scrape));
    axum::serve(listener, app).await
}

async fn scrape() -> impl IntoResponse {
    let (content_type, body) = render();
    ([(header::CONTENT_TYPE, content_type)], body)
}

/// Encode every registered metric. Returns the content type and the body.
fn render() -> (String, String) {
    let encoder = TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }

    let body = String::from_utf8(buffer).unwrap_or_else(|_| String::from("Encoding error"));
    (encoder.format_type().to_string(), body)
}
