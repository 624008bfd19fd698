use reqwest::Method;
use serde_json::{json, Value};

use spacetraders_intent_agent::client::tools::{resolve_refs, ParamLocation};
use spacetraders_intent_agent::client::{ToolCall, ToolCatalog, ToolError, ToolResponse};

fn sample_spec() -> Value {
    json!({
        "openapi": "3.0.0",
        "paths": {
            "/register": {
                "post": { "operationId": "register", "summary": "Register New Agent" }
            },
            "/my/ships/{shipSymbol}/navigate": {
                "parameters": [
                    { "name": "shipSymbol", "in": "path", "required": true, "schema": { "type": "string" } }
                ],
                "post": {
                    "operationId": "navigate-ship",
                    "summary": "Navigate Ship",
                    "requestBody": {
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/NavigateRequest" }
                            }
                        }
                    }
                }
            },
            "/systems": {
                "get": {
                    "operationId": "get-systems",
                    "description": "List systems.",
                    "parameters": [
                        { "name": "page", "in": "query", "schema": { "type": "integer" } },
                        { "name": "limit", "in": "query", "schema": { "type": "integer" } }
                    ]
                }
            },
            "/my/agent": {
                "get": { "summary": "Get Agent" }
            }
        },
        "components": {
            "schemas": {
                "NavigateRequest": {
                    "type": "object",
                    "required": ["waypointSymbol"],
                    "properties": { "waypointSymbol": { "type": "string" } }
                }
            }
        }
    })
}

fn catalog() -> ToolCatalog {
    ToolCatalog::from_openapi(&sample_spec(), &["register".to_string()]).unwrap()
}

#[test]
fn test_catalog_excludes_register() {
    let catalog = catalog();
    assert_eq!(catalog.len(), 3);
    assert!(catalog.get("register").is_none());
    assert!(catalog.get("get_my_agent").is_some());

    let definitions = catalog.definitions();
    assert!(definitions.iter().all(|d| d["type"] == "function"));
    assert!(definitions.iter().all(|d| d["function"]["name"] != "register"));
}

#[test]
fn test_operation_parameters_merged() {
    let catalog = catalog();
    let navigate = catalog.get("navigate-ship").unwrap();

    assert_eq!(navigate.method, Method::POST);
    assert_eq!(navigate.locations.get("shipSymbol"), Some(&ParamLocation::Path));
    assert_eq!(navigate.locations.get("waypointSymbol"), Some(&ParamLocation::Body));
    assert!(navigate.required.contains(&"shipSymbol".to_string()));
    assert!(navigate.required.contains(&"waypointSymbol".to_string()));

    let definition = navigate.definition();
    assert_eq!(
        definition["function"]["parameters"]["properties"]["waypointSymbol"]["type"],
        "string"
    );
}

#[test]
fn test_prepare_body_call() {
    let call = ToolCall::new(
        "navigate-ship",
        json!({ "shipSymbol": "AGENT-1", "waypointSymbol": "X1-DF55-20250Z" }),
    );
    let request = catalog().prepare(&call).unwrap();

    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/my/ships/AGENT-1/navigate");
    assert!(request.query.is_empty());
    assert_eq!(request.body, Some(json!({ "waypointSymbol": "X1-DF55-20250Z" })));
}

#[test]
fn test_prepare_query_call_with_string_arguments() {
    let call = ToolCall::new("get-systems", Value::String(r#"{"page": 2, "limit": 20}"#.to_string()));
    let mut request = catalog().prepare(&call).unwrap();
    request.query.sort();

    assert_eq!(request.method, Method::GET);
    assert_eq!(request.path, "/systems");
    assert_eq!(
        request.query,
        vec![
            ("limit".to_string(), "20".to_string()),
            ("page".to_string(), "2".to_string())
        ]
    );
    assert!(request.body.is_none());
}

#[test]
fn test_prepare_rejects_bad_calls() {
    let catalog = catalog();

    let missing = catalog.prepare(&ToolCall::new("navigate-ship", json!({ "waypointSymbol": "X1" })));
    assert!(matches!(missing, Err(ToolError::MissingPathParameter { .. })));

    let unknown = catalog.prepare(&ToolCall::new("register", json!({})));
    assert!(matches!(unknown, Err(ToolError::UnknownTool(_))));

    let garbled = catalog.prepare(&ToolCall::new("get-systems", Value::String("not json".to_string())));
    assert!(matches!(garbled, Err(ToolError::BadArguments { .. })));
}

#[test]
fn test_missing_paths_is_an_error() {
    assert!(matches!(
        ToolCatalog::from_openapi(&json!({ "openapi": "3.0.0" }), &[]),
        Err(ToolError::NoPaths)
    ));
}

#[test]
fn test_cyclic_refs_terminate() {
    let root = json!({
        "components": { "schemas": { "Node": { "properties": { "next": { "$ref": "#/components/schemas/Node" } } } } }
    });
    let resolved = resolve_refs(&json!({ "$ref": "#/components/schemas/Node" }), &root);
    assert!(resolved.get("properties").is_some());
}

#[test]
fn test_tool_response_status() {
    assert!(ToolResponse::new(201, json!({ "data": {} })).is_success());

    let rejected = ToolResponse::new(400, json!({ "error": { "code": 4236, "message": "Ship is not currently docked" } }));
    assert!(!rejected.is_success());
    assert_eq!(rejected.failure_message(), "HTTP 400: Ship is not currently docked");

    let bare = ToolResponse::new(503, json!({ "status": 503 }));
    assert!(!bare.is_success());
    assert_eq!(bare.failure_message(), "HTTP 503");
}
