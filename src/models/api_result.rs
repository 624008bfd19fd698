// Uniform outcome of a SpaceTraders REST call
use serde::Serialize;
use serde_json::Value;

/// Status used when a request never produced an HTTP response we could read.
pub const TRANSPORT_FAILURE_STATUS: i32 = -1;

/// The two response shapes the gateway has to normalise.
#[derive(Debug, Clone)]
pub enum TransportResponse {
    /// Status code plus the undecoded body bytes.
    Raw { status: u16, content: Vec<u8> },
    /// A response whose body has already been decoded by the caller.
    Structured {
        status: u16,
        body: Option<Value>,
        content: Option<Vec<u8>>,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiResult {
    pub ok: bool,
    pub status: i32,
    pub json: Option<Value>,
    #[serde(skip)]
    pub raw: Option<Vec<u8>>,
    pub error: Option<String>,
}

impl ApiResult {
    pub fn transport_failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            status: TRANSPORT_FAILURE_STATUS,
            json: None,
            raw: None,
            error: Some(error.into()),
        }
    }

    /// Normalises whatever the transport produced. Never panics and never
    /// reports `ok` together with an error.
    pub fn from_transport(response: Result<TransportResponse, String>) -> Self {
        let response = match response {
            Ok(response) => response,
            Err(e) => return Self::transport_failure(e),
        };

        match response {
            TransportResponse::Raw { status, content } => {
                let json = if content.is_empty() {
                    None
                } else {
                    match serde_json::from_slice::<Value>(&content) {
                        Ok(value) => Some(value),
                        Err(e) => return Self::transport_failure(format!("invalid JSON body: {}", e)),
                    }
                };
                Self::from_parts(status, json, Some(content))
            }
            TransportResponse::Structured { status, body, content } => {
                Self::from_parts(status, body, content)
            }
        }
    }

    fn from_parts(status: u16, json: Option<Value>, raw: Option<Vec<u8>>) -> Self {
        Self {
            ok: (200..300).contains(&status),
            status: i32::from(status),
            json,
            raw,
            error: None,
        }
    }

    /// The `data` member of a successful SpaceTraders envelope.
    pub fn data(&self) -> Option<&Value> {
        if !self.ok {
            return None;
        }
        self.json.as_ref().and_then(|body| body.get("data"))
    }

    /// Short description of why the call failed: the error text, or the status.
    pub fn failure_reason(&self) -> String {
        match &self.error {
            Some(error) => error.clone(),
            None => self.status.to_string(),
        }
    }
}
