use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;

use crate::config::ApiSettings;
use crate::models::{ApiResult, TransportResponse};

#[derive(Clone)]
pub struct SpaceTradersClient {
    client: reqwest::Client,
    base_url: String,
    api_logging: bool,
}

/// Builds an authenticated client. The explicit `token` wins over the one in
/// `settings`; with neither, the REST features are disabled and `None` comes
/// back instead of an error.
pub fn build_client(token: Option<&str>, settings: &ApiSettings) -> Option<SpaceTradersClient> {
    let token = token
        .or(settings.token.as_deref())
        .map(str::trim)
        .filter(|t| !t.is_empty())?;

    match SpaceTradersClient::new(token, settings) {
        Ok(client) => Some(client),
        Err(e) => {
            tracing::warn!("⚠️ Could not build SpaceTraders client: {}", e);
            None
        }
    }
}

impl SpaceTradersClient {
    pub fn new(token: &str, settings: &ApiSettings) -> Result<Self, Box<dyn std::error::Error>> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        Ok(SpaceTradersClient {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_logging: settings.log_api,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn log_api_request(&self, endpoint: &str, body: Option<&Value>) {
        if !self.api_logging {
            return;
        }
        match body {
            Some(body) => tracing::info!("🌐 API Request [{}] body:\n{}", endpoint, pretty(body)),
            None => tracing::info!("🌐 API Request [{}]", endpoint),
        }
    }

    fn log_api_response(&self, endpoint: &str, result: &ApiResult) {
        if !self.api_logging {
            return;
        }
        match (&result.json, &result.error) {
            (Some(json), _) => tracing::info!(
                "🌐 API Response [{}] status={}:\n{}",
                endpoint,
                result.status,
                pretty(json)
            ),
            (None, Some(error)) => {
                tracing::info!("🌐 API Response [{}] failed: {}", endpoint, error)
            }
            (None, None) => tracing::info!("🌐 API Response [{}] status={} (empty body)", endpoint, result.status),
        }
    }

    /// Issues one request against `{base_url}{path}`. Transport and decoding
    /// failures come back as `ApiResult` values; nothing escapes this boundary.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> ApiResult {
        let url = format!("{}{}", self.base_url, path);
        let endpoint = if query.is_empty() {
            format!("{} {}", method, path)
        } else {
            let pairs: Vec<String> = query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            format!("{} {}?{}", method, path, pairs.join("&"))
        };
        self.log_api_request(&endpoint, body);

        let mut builder = self.client.request(method, &url);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let transport = match builder.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                match response.bytes().await {
                    Ok(bytes) => Ok(TransportResponse::Raw {
                        status,
                        content: bytes.to_vec(),
                    }),
                    Err(e) => Err(format!("failed to read response body: {}", e)),
                }
            }
            Err(e) => Err(e.to_string()),
        };

        let result = ApiResult::from_transport(transport);
        self.log_api_response(&endpoint, &result);
        result
    }

    // Agent operations
    pub async fn fetch_my_agent(&self) -> ApiResult {
        self.request(Method::GET, "/my/agent", &[], None).await
    }

    // Fleet operations
    pub async fn fetch_my_ships(&self, page: u32, limit: u32) -> ApiResult {
        let query = vec![
            ("page".to_string(), page.to_string()),
            ("limit".to_string(), limit.to_string()),
        ];
        self.request(Method::GET, "/my/ships", &query, None).await
    }
}

pub(crate) fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
