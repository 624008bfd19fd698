// Tool catalog derived from the SpaceTraders OpenAPI document
use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::client::api::SpaceTradersClient;
use crate::client::llm::ToolCall;
use crate::models::TRANSPORT_FAILURE_STATUS;

const MAX_REF_DEPTH: usize = 24;
const MAX_DESCRIPTION_CHARS: usize = 1024;
const HTTP_METHODS: [&str; 5] = ["get", "post", "put", "patch", "delete"];

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("failed to load OpenAPI document from {source_name}: {reason}")]
    SpecLoad { source_name: String, reason: String },

    #[error("OpenAPI document has no paths")]
    NoPaths,

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("bad arguments for {tool}: {reason}")]
    BadArguments { tool: String, reason: String },

    #[error("missing path parameter {param} for {tool}")]
    MissingPathParameter { tool: String, param: String },

    #[error("request for {tool} failed: {reason}")]
    Transport { tool: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    Path,
    Query,
    Body,
}

#[derive(Debug, Clone)]
pub struct ToolOperation {
    pub name: String,
    pub method: Method,
    pub path: String,
    pub description: String,
    pub properties: Map<String, Value>,
    pub required: Vec<String>,
    pub locations: BTreeMap<String, ParamLocation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ToolOperation {
    fn sends_body(&self) -> bool {
        matches!(self.method, Method::POST | Method::PUT | Method::PATCH)
    }

    /// OpenAI function-tool definition.
    pub fn definition(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": {
                    "type": "object",
                    "properties": Value::Object(self.properties.clone()),
                    "required": self.required,
                }
            }
        })
    }

    /// Argument names with a `(required)` marker, for start-up logging.
    pub fn argument_summary(&self) -> String {
        if self.properties.is_empty() {
            return "(none)".to_string();
        }
        self.properties
            .keys()
            .map(|name| {
                if self.required.contains(name) {
                    format!("{} (required)", name)
                } else {
                    name.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn prepare(&self, arguments: &Map<String, Value>) -> Result<PreparedRequest, ToolError> {
        let mut path = self.path.clone();
        let mut query = Vec::new();
        let mut body = Map::new();

        for (name, location) in &self.locations {
            if *location != ParamLocation::Path {
                continue;
            }
            let value = arguments
                .get(name)
                .and_then(scalar_to_string)
                .ok_or_else(|| ToolError::MissingPathParameter {
                    tool: self.name.clone(),
                    param: name.clone(),
                })?;
            path = path.replace(&format!("{{{}}}", name), &encode_path_segment(&value));
        }

        for (name, value) in arguments {
            match self.locations.get(name) {
                Some(ParamLocation::Path) => {}
                Some(ParamLocation::Query) => push_query(&mut query, name, value),
                Some(ParamLocation::Body) => {
                    body.insert(name.clone(), value.clone());
                }
                None if self.sends_body() => {
                    body.insert(name.clone(), value.clone());
                }
                None => push_query(&mut query, name, value),
            }
        }

        Ok(PreparedRequest {
            method: self.method.clone(),
            path,
            query,
            body: self.sends_body().then(|| Value::Object(body)),
        })
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn push_query(query: &mut Vec<(String, String)>, name: &str, value: &Value) {
    match value {
        Value::Null => {}
        Value::Array(items) => {
            let joined: Vec<String> = items.iter().filter_map(scalar_to_string).collect();
            if !joined.is_empty() {
                query.push((name.to_string(), joined.join(",")));
            }
        }
        other => {
            if let Some(s) = scalar_to_string(other) {
                query.push((name.to_string(), s));
            }
        }
    }
}

fn encode_path_segment(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            other => encoded.push_str(&format!("%{:02X}", other)),
        }
    }
    encoded
}

fn sanitize_name(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Inlines local `#/...` references. Cycles are cut at a fixed depth.
pub fn resolve_refs(value: &Value, root: &Value) -> Value {
    resolve_refs_at(value, root, 0)
}

fn resolve_refs_at(value: &Value, root: &Value, depth: usize) -> Value {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(reference)) = map.get("$ref") {
                if depth >= MAX_REF_DEPTH {
                    return json!({});
                }
                if let Some(pointer) = reference.strip_prefix('#') {
                    if let Some(target) = root.pointer(pointer) {
                        return resolve_refs_at(target, root, depth + 1);
                    }
                }
                return value.clone();
            }
            Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), resolve_refs_at(v, root, depth)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(
            items.iter().map(|v| resolve_refs_at(v, root, depth)).collect(),
        ),
        other => other.clone(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    operations: Vec<ToolOperation>,
}

impl ToolCatalog {
    pub fn from_openapi(spec: &Value, excluded: &[String]) -> Result<Self, ToolError> {
        let paths = spec
            .get("paths")
            .and_then(Value::as_object)
            .ok_or(ToolError::NoPaths)?;

        let mut operations = Vec::new();
        for (path, item) in paths {
            let item = resolve_refs(item, spec);
            let shared_params = item
                .get("parameters")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();

            for method_name in HTTP_METHODS {
                let Some(operation) = item.get(method_name) else {
                    continue;
                };
                let Ok(method) = Method::from_bytes(method_name.to_uppercase().as_bytes()) else {
                    continue;
                };
                let tool = Self::build_operation(path, method, operation, &shared_params);
                if excluded.iter().any(|name| name == &tool.name) {
                    tracing::debug!("🚫 Withholding tool {}", tool.name);
                    continue;
                }
                operations.push(tool);
            }
        }

        Ok(Self { operations })
    }

    fn build_operation(path: &str, method: Method, operation: &Value, shared_params: &[Value]) -> ToolOperation {
        let name = operation
            .get("operationId")
            .and_then(Value::as_str)
            .map(sanitize_name)
            .unwrap_or_else(|| sanitize_name(&format!("{}{}", method.as_str().to_lowercase(), path)));

        let summary = operation.get("summary").and_then(Value::as_str).unwrap_or("");
        let details = operation.get("description").and_then(Value::as_str).unwrap_or("");
        let description = match (summary.is_empty(), details.is_empty()) {
            (false, false) => format!("{}\n\n{}", summary, details),
            (false, true) => summary.to_string(),
            (true, _) => details.to_string(),
        };

        let mut properties = Map::new();
        let mut required = Vec::new();
        let mut locations = BTreeMap::new();

        let own_params = operation
            .get("parameters")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        for param in own_params.iter().chain(shared_params.iter()) {
            let Some(param_name) = param.get("name").and_then(Value::as_str) else {
                continue;
            };
            let location = match param.get("in").and_then(Value::as_str) {
                Some("path") => ParamLocation::Path,
                Some("query") => ParamLocation::Query,
                _ => continue,
            };
            if locations.contains_key(param_name) {
                continue;
            }
            let mut schema = param.get("schema").cloned().unwrap_or_else(|| json!({"type": "string"}));
            if let (Some(text), Value::Object(map)) = (param.get("description"), &mut schema) {
                map.entry("description").or_insert_with(|| text.clone());
            }
            let is_required = location == ParamLocation::Path
                || param.get("required").and_then(Value::as_bool).unwrap_or(false);
            if is_required {
                required.push(param_name.to_string());
            }
            properties.insert(param_name.to_string(), schema);
            locations.insert(param_name.to_string(), location);
        }

        let body_schema = operation
            .pointer("/requestBody/content/application~1json/schema")
            .cloned();
        if let Some(schema) = body_schema {
            let body_required: Vec<String> = schema
                .get("required")
                .and_then(Value::as_array)
                .map(|names| names.iter().filter_map(Value::as_str).map(String::from).collect())
                .unwrap_or_default();
            if let Some(body_props) = schema.get("properties").and_then(Value::as_object) {
                for (field, field_schema) in body_props {
                    if locations.contains_key(field) {
                        continue;
                    }
                    if body_required.contains(field) {
                        required.push(field.clone());
                    }
                    properties.insert(field.clone(), field_schema.clone());
                    locations.insert(field.clone(), ParamLocation::Body);
                }
            }
        }

        ToolOperation {
            name,
            method,
            path: path.to_string(),
            description: truncate_chars(&description, MAX_DESCRIPTION_CHARS),
            properties,
            required,
            locations,
        }
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn operations(&self) -> &[ToolOperation] {
        &self.operations
    }

    pub fn get(&self, name: &str) -> Option<&ToolOperation> {
        self.operations.iter().find(|op| op.name == name)
    }

    pub fn definitions(&self) -> Vec<Value> {
        self.operations.iter().map(ToolOperation::definition).collect()
    }

    pub fn prepare(&self, call: &ToolCall) -> Result<PreparedRequest, ToolError> {
        let operation = self
            .get(call.name())
            .ok_or_else(|| ToolError::UnknownTool(call.name().to_string()))?;
        let arguments = call.arguments_object().map_err(|reason| ToolError::BadArguments {
            tool: call.name().to_string(),
            reason,
        })?;
        operation.prepare(&arguments)
    }

    pub fn log_catalog(&self) {
        for op in &self.operations {
            tracing::info!("🔧 Tool: {}", op.name);
            tracing::info!("   Arguments: {}", op.argument_summary());
        }
    }
}

/// Reads the OpenAPI document from an http(s) URL or a local file.
pub async fn load_openapi_spec(source: &str, timeout: Duration) -> Result<Value, ToolError> {
    let spec_error = |reason: String| ToolError::SpecLoad {
        source_name: source.to_string(),
        reason,
    };

    let text = if source.starts_with("http://") || source.starts_with("https://") {
        tracing::info!("📥 Loading OpenAPI spec from {}", source);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| spec_error(e.to_string()))?;
        let response = client
            .get(source)
            .send()
            .await
            .map_err(|e| spec_error(e.to_string()))?;
        if !response.status().is_success() {
            return Err(spec_error(format!("status {}", response.status())));
        }
        response.text().await.map_err(|e| spec_error(e.to_string()))?
    } else {
        tracing::info!("📥 Loading OpenAPI spec from file {}", source);
        tokio::fs::read_to_string(source)
            .await
            .map_err(|e| spec_error(e.to_string()))?
    };

    serde_json::from_str(&text).map_err(|e| spec_error(e.to_string()))
}

/// HTTP status and parsed body of one tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResponse {
    pub status: i32,
    pub body: Value,
}

impl ToolResponse {
    pub fn new(status: i32, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `HTTP {status}`, followed by the API's `error.message` when present.
    pub fn failure_message(&self) -> String {
        match self.body.pointer("/error/message").and_then(Value::as_str) {
            Some(message) => format!("HTTP {}: {}", self.status, message),
            None => format!("HTTP {}", self.status),
        }
    }
}

/// Executes a model-selected tool call.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    fn definitions(&self) -> Vec<Value>;

    /// The status and parsed response body for any HTTP status; `Err` only
    /// when the call could not be made or answered.
    async fn invoke(&self, call: &ToolCall) -> Result<ToolResponse, ToolError>;
}

pub struct ApiToolInvoker {
    catalog: ToolCatalog,
    client: SpaceTradersClient,
}

impl ApiToolInvoker {
    pub fn new(catalog: ToolCatalog, client: SpaceTradersClient) -> Self {
        Self { catalog, client }
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }
}

#[async_trait]
impl ToolInvoker for ApiToolInvoker {
    fn definitions(&self) -> Vec<Value> {
        self.catalog.definitions()
    }

    async fn invoke(&self, call: &ToolCall) -> Result<ToolResponse, ToolError> {
        let request = self.catalog.prepare(call)?;
        let result = self
            .client
            .request(request.method, &request.path, &request.query, request.body.as_ref())
            .await;

        if result.status == TRANSPORT_FAILURE_STATUS {
            return Err(ToolError::Transport {
                tool: call.name().to_string(),
                reason: result.failure_reason(),
            });
        }
        let body = result
            .json
            .unwrap_or_else(|| json!({ "status": result.status }));
        Ok(ToolResponse::new(result.status, body))
    }
}
