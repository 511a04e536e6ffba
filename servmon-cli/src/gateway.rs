// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! HTTP Gateway for servmon.
//!
//! Routes REST calls onto the inventory:
//! `GET /servers`, `GET|DELETE /server/{serverId}`, `POST|PUT /server`.
//! Inventory calls block on the store, so each one runs on the blocking pool.

use std::net::SocketAddr;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use servmon_core::{handle, ApiResponse, Operation, Request as InventoryRequest, ServerInventory};

use crate::metrics;

/// Gateway state shared across threads
#[derive(Clone)]
struct GatewayState {
    inventory: ServerInventory,
}

/// Build the gateway router.
pub fn router(inventory: ServerInventory) -> Router {
    let state = GatewayState { inventory };

    Router::new()
        .route("/servers", get(list_servers))
        .route("/server", post(add_server).put(update_server))
        .route("/server/{server_id}", get(get_server).delete(delete_server))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the gateway until `shutdown` resolves.
pub async fn start_gateway(
    addr: SocketAddr,
    inventory: ServerInventory,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = router(inventory);

    tracing::info!("Gateway listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

async fn list_servers(State(state): State<GatewayState>) -> Response {
    dispatch(state, InventoryRequest::List).await
}

async fn get_server(State(state): State<GatewayState>, Path(server_id): Path<String>) -> Response {
    dispatch(state, InventoryRequest::Get { server_id }).await
}

async fn delete_server(
    State(state): State<GatewayState>,
    Path(server_id): Path<String>,
) -> Response {
    dispatch(state, InventoryRequest::Delete { server_id }).await
}

async fn add_server(State(state): State<GatewayState>, body: String) -> Response {
    dispatch(state, InventoryRequest::Add { body }).await
}

async fn update_server(State(state): State<GatewayState>, body: String) -> Response {
    dispatch(state, InventoryRequest::Update { body }).await
}

async fn dispatch(state: GatewayState, request: InventoryRequest) -> Response {
    let operation = request.operation();
    let timer = metrics::REQUEST_DURATION
        .with_label_values(&[operation.name()])
        .start_timer();

    let response = tokio::task::spawn_blocking(move || handle(&state.inventory, request))
        .await
        .unwrap_or_else(|e| {
            tracing::error!(operation = %operation, error = %e, "Inventory task failed");
            ApiResponse::new(500, e.to_string())
        });

    timer.observe_duration();
    let status = response.status_code.to_string();
    metrics::REQUESTS
        .with_label_values(&[operation.name(), status.as_str()])
        .inc();

    into_http(operation, response)
}

fn into_http(operation: Operation, response: ApiResponse) -> Response {
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let returns_json = matches!(operation, Operation::List | Operation::Get);
    if returns_json && status.is_success() {
        (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            response.body,
        )
            .into_response()
    } else {
        (status, response.body).into_response()
    }
}
