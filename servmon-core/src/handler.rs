// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! HTTP-style request handling.
//!
//! Maps API-gateway style events (`httpMethod`, `pathParameters`, `body`) to
//! inventory operations and shapes the status code and body of the reply.
//!
//! | Method | Target     | Operation  | Success | Negative |
//! |--------|------------|------------|---------|----------|
//! | GET    | collection | `list`     | 200     | -        |
//! | GET    | item       | `get`      | 200     | 404      |
//! | POST   | collection | `add`      | 201     | 409      |
//! | PUT    | collection | `update`   | 200     | 404      |
//! | DELETE | item       | `delete`   | 200     | 404      |
//!
//! Malformed input yields 400; any other failure yields 500 carrying the
//! error description.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InventoryError;
use crate::inventory::ServerInventory;
use crate::record::Record;

/// Path parameter carrying the server identifier.
pub const SERVER_ID_PARAM: &str = "serverId";

/// Inbound event as delivered by an API gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    pub http_method: String,
    #[serde(default)]
    pub path_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
}

/// Reply to an [`ApiEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status_code: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }

    fn json<T: Serialize>(status_code: u16, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self::new(status_code, body),
            Err(e) => Self::new(500, e.to_string()),
        }
    }
}

/// Inventory operation a request resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Get,
    Add,
    Update,
    Delete,
}

impl Operation {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Add => "add",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A routed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    List,
    Get { server_id: String },
    Add { body: String },
    Update { body: String },
    Delete { server_id: String },
}

impl Request {
    pub fn operation(&self) -> Operation {
        match self {
            Self::List => Operation::List,
            Self::Get { .. } => Operation::Get,
            Self::Add { .. } => Operation::Add,
            Self::Update { .. } => Operation::Update,
            Self::Delete { .. } => Operation::Delete,
        }
    }

    /// Route an event by method and presence of the `serverId` parameter.
    pub fn from_event(event: &ApiEvent) -> Result<Self, ApiResponse> {
        let server_id = event
            .path_parameters
            .as_ref()
            .and_then(|params| params.get(SERVER_ID_PARAM))
            .cloned();

        match event.http_method.to_ascii_uppercase().as_str() {
            "GET" => Ok(match server_id {
                Some(server_id) => Self::Get { server_id },
                None => Self::List,
            }),
            "DELETE" => server_id
                .map(|server_id| Self::Delete { server_id })
                .ok_or_else(|| ApiResponse::new(400, "missing path parameter serverId")),
            "POST" => required_body(event).map(|body| Self::Add { body }),
            "PUT" => required_body(event).map(|body| Self::Update { body }),
            other => Err(ApiResponse::new(
                405,
                format!("method {} not allowed", other),
            )),
        }
    }
}

fn required_body(event: &ApiEvent) -> Result<String, ApiResponse> {
    event
        .body
        .clone()
        .ok_or_else(|| ApiResponse::new(400, "missing request body"))
}

/// Handle a raw event end to end.
pub fn handle_event(inventory: &ServerInventory, event: &ApiEvent) -> ApiResponse {
    tracing::info!(
        method = %event.http_method,
        path_parameters = ?event.path_parameters,
        "Event received"
    );

    match Request::from_event(event) {
        Ok(request) => handle(inventory, request),
        Err(response) => response,
    }
}

/// Execute a routed request against the inventory.
pub fn handle(inventory: &ServerInventory, request: Request) -> ApiResponse {
    let operation = request.operation();

    match execute(inventory, request) {
        Ok(response) => response,
        Err(e) => {
            let status = status_for_error(&e);
            if status >= 500 {
                tracing::error!(operation = %operation, error = %e, "Request failed");
            } else {
                tracing::warn!(operation = %operation, error = %e, "Rejected request");
            }
            ApiResponse::new(status, e.to_string())
        }
    }
}

fn execute(inventory: &ServerInventory, request: Request) -> Result<ApiResponse, InventoryError> {
    let response = match request {
        Request::List => {
            let servers = inventory.list()?;
            tracing::debug!(count = servers.len(), "Listed servers");
            ApiResponse::json(200, &servers)
        }
        Request::Get { server_id } => match inventory.get(&server_id)? {
            Some(server) => ApiResponse::json(200, &server),
            None => ApiResponse::new(404, "server not found"),
        },
        Request::Add { body } => {
            let server = Record::from_json(&body)?;
            if inventory.add(&server)? {
                ApiResponse::new(201, "server added")
            } else {
                ApiResponse::new(409, "server already exists")
            }
        }
        Request::Update { body } => {
            let server = Record::from_json(&body)?;
            if inventory.update(&server)? {
                ApiResponse::new(200, "server updated")
            } else {
                ApiResponse::new(404, "server not found")
            }
        }
        Request::Delete { server_id } => {
            if inventory.delete(&server_id)? {
                ApiResponse::new(200, "server deleted")
            } else {
                ApiResponse::new(404, "server not found")
            }
        }
    };

    Ok(response)
}

/// Status code a failed request maps to.
pub fn status_for_error(error: &InventoryError) -> u16 {
    match error {
        InventoryError::MalformedBody { .. }
        | InventoryError::MissingKey { .. }
        | InventoryError::InvalidKey { .. } => 400,
        _ => 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{KeyValueStore, MemoryStore};
    use crate::types::TableName;

    fn inventory() -> ServerInventory {
        let store = MemoryStore::new_shared();
        store.create_table("servers", "server_id").unwrap();
        ServerInventory::new(store, TableName::default())
    }

    fn event(method: &str, server_id: Option<&str>, body: Option<&str>) -> ApiEvent {
        ApiEvent {
            http_method: method.to_string(),
            path_parameters: server_id.map(|id| {
                HashMap::from([(SERVER_ID_PARAM.to_string(), id.to_string())])
            }),
            body: body.map(str::to_string),
        }
    }

    const SERVER: &str = r#"{"server_id": "VillaconejosBOSServer02", "iisPresent": "false", "memory": 1073741824, "upToDate": "false"}"#;

    #[test]
    fn test_routing() {
        assert_eq!(Request::from_event(&event("GET", None, None)), Ok(Request::List));
        assert_eq!(
            Request::from_event(&event("get", Some("A"), None)),
            Ok(Request::Get {
                server_id: "A".to_string()
            })
        );
        assert_eq!(
            Request::from_event(&event("DELETE", None, None))
                .unwrap_err()
                .status_code,
            400
        );
        assert_eq!(
            Request::from_event(&event("POST", None, None))
                .unwrap_err()
                .status_code,
            400
        );
        assert_eq!(
            Request::from_event(&event("PATCH", None, Some(SERVER)))
                .unwrap_err()
                .status_code,
            405
        );
    }

    #[test]
    fn test_crud_status_codes() {
        let inventory = inventory();

        let added = handle_event(&inventory, &event("POST", None, Some(SERVER)));
        assert_eq!(added, ApiResponse::new(201, "server added"));

        let conflict = handle_event(&inventory, &event("POST", None, Some(SERVER)));
        assert_eq!(conflict, ApiResponse::new(409, "server already exists"));

        let fetched = handle_event(
            &inventory,
            &event("GET", Some("VillaconejosBOSServer02"), None),
        );
        assert_eq!(fetched.status_code, 200);
        let body: serde_json::Value = serde_json::from_str(&fetched.body).unwrap();
        assert_eq!(body["memory"], serde_json::json!(1073741824));
        assert_eq!(body["upToDate"], serde_json::json!("false"));

        let updated = handle_event(&inventory, &event("PUT", None, Some(SERVER)));
        assert_eq!(updated, ApiResponse::new(200, "server updated"));

        let deleted = handle_event(
            &inventory,
            &event("DELETE", Some("VillaconejosBOSServer02"), None),
        );
        assert_eq!(deleted, ApiResponse::new(200, "server deleted"));

        let gone = handle_event(
            &inventory,
            &event("DELETE", Some("VillaconejosBOSServer02"), None),
        );
        assert_eq!(gone, ApiResponse::new(404, "server not found"));

        let missing = handle_event(&inventory, &event("GET", Some("notExistingServer"), None));
        assert_eq!(missing, ApiResponse::new(404, "server not found"));

        let not_updated = handle_event(&inventory, &event("PUT", None, Some(SERVER)));
        assert_eq!(not_updated, ApiResponse::new(404, "server not found"));
    }

    #[test]
    fn test_list_body_is_json_array() {
        let inventory = inventory();
        handle_event(&inventory, &event("POST", None, Some(SERVER)));

        let listed = handle_event(&inventory, &event("GET", None, None));
        assert_eq!(listed.status_code, 200);
        let body: Vec<serde_json::Value> = serde_json::from_str(&listed.body).unwrap();
        assert_eq!(body.len(), 1);
        assert_eq!(body[0]["server_id"], serde_json::json!("VillaconejosBOSServer02"));
    }

    #[test]
    fn test_malformed_body_is_400() {
        let inventory = inventory();

        let response = handle_event(&inventory, &event("POST", None, Some("{oops")));
        assert_eq!(response.status_code, 400);

        let response = handle_event(&inventory, &event("PUT", None, Some(r#"{"memory": 1}"#)));
        assert_eq!(response.status_code, 400);
        assert!(response.body.contains("server_id"));
    }

    #[test]
    fn test_store_fault_is_500() {
        let inventory = ServerInventory::new(MemoryStore::new_shared(), TableName::default());

        let response = handle_event(&inventory, &event("GET", None, None));
        assert_eq!(response.status_code, 500);
        assert!(response.body.contains("servers"));
    }

    #[test]
    fn test_event_wire_format() {
        let raw = r#"{"httpMethod": "GET", "pathParameters": {"serverId": "A"}, "body": null}"#;
        let event: ApiEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(
            Request::from_event(&event),
            Ok(Request::Get {
                server_id: "A".to_string()
            })
        );

        let response = serde_json::to_string(&ApiResponse::new(404, "server not found")).unwrap();
        assert_eq!(response, r#"{"statusCode":404,"body":"server not found"}"#);
    }
}
