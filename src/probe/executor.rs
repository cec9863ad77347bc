use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use url::Url;

use super::request::{ParamValue, ProbeRequest, RequestParams};
use super::result::ProbeResult;
use crate::error::{ProbeError, ValidationError};
use crate::sanitize::{SanitizeOptions, sanitize_url};

/// Error reported on the `url` field for both sanitizer rejections and
/// transport-level failures; an unreachable host and an invalid one are
/// indistinguishable to the caller.
const INVALID_URL_MESSAGE: &str = "Invalid URL or Domain";

/// Configuration for a [`ProbeExecutor`].
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Bounds connect and read for the whole request.
    pub timeout: Duration,
    /// Skip TLS certificate verification. Defaults to `true`: probes are
    /// routinely pointed at staging endpoints with self-signed certificates,
    /// and this broadened trust surface is an explicit, documented choice.
    pub danger_accept_invalid_certs: bool,
    /// Permit probing loopback and private-range targets.
    pub allow_private_targets: bool,
    pub user_agent: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            danger_accept_invalid_certs: true,
            allow_private_targets: false,
            user_agent: concat!("apiprobe/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Executes one probe per [`execute`](ProbeExecutor::execute) call.
///
/// Holds a shared HTTP client but no per-invocation state; each call is an
/// independent validate → sanitize → dispatch → normalize pipeline with no
/// retries and no background work.
pub struct ProbeExecutor {
    client: Client,
    sanitize_opts: SanitizeOptions,
}

impl ProbeExecutor {
    pub fn new(config: ProbeConfig) -> Result<Self, ProbeError> {
        // Redirects are never followed: the probe records the 3xx response
        // itself, and following one could re-target a sanitized URL at an
        // address the sanitizer would have rejected.
        let client = Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.danger_accept_invalid_certs)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            client,
            sanitize_opts: SanitizeOptions {
                allow_private_targets: config.allow_private_targets,
            },
        })
    }

    /// Validate, sanitize, dispatch and normalize one probe.
    ///
    /// Missing fields and unsafe or unreachable targets come back as
    /// [`ProbeError::Validation`] without dispatching (or, for transport
    /// failures, without a usable response). Any HTTP status is a success at
    /// this layer; the status lands in the result for downstream assertion
    /// evaluation.
    pub async fn execute(&self, request: ProbeRequest) -> Result<ProbeResult, ProbeError> {
        request.validate()?;

        let url = self.sanitize(&request)?;
        let method = parse_method(&request.method)?;
        let headers = build_header_map(&request.request_headers)?;

        let mut outbound = self
            .client
            .request(method.clone(), url.clone())
            .headers(headers);
        if let Some((user, password)) = request.credentials() {
            outbound = outbound.basic_auth(user, Some(password));
        }
        if let Some(body) = build_body(&request) {
            outbound = outbound.body(body);
        }

        log::debug!("probing {method} {url}");
        let response = match outbound.send().await {
            Ok(response) => response,
            Err(e) => {
                // DNS failure, refused connection, timeout: collapsed into
                // the same field error as a rejected URL.
                log::warn!("probe transport failure for {url}: {}", super::report(&e));
                let mut errors = ValidationError::new();
                errors.add("url", INVALID_URL_MESSAGE);
                return Err(errors.into());
            }
        };

        let status_code = response.status().as_u16();
        let response_headers = flatten_headers(response.headers());
        let body_bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("probe body read failure for {url}: {e}");
                let mut errors = ValidationError::new();
                errors.add("url", INVALID_URL_MESSAGE);
                return Err(errors.into());
            }
        };
        // Binary-safe coercion: the stored body is always valid UTF-8.
        let response_body = String::from_utf8_lossy(&body_bytes).into_owned();

        log::debug!("probe {url} completed with status {status_code}");

        Ok(ProbeResult {
            url: url.to_string(),
            method: method.as_str().to_string(),
            status_code,
            response_body,
            response_headers,
            request_headers: request.request_headers,
            request_params: normalize_params(request.request_params.as_ref())?,
            request_body: request.request_body,
            username: request.username,
            password: request.password,
            user_id: request.user_id,
            assertions: request.assertions,
        })
    }

    fn sanitize(&self, request: &ProbeRequest) -> Result<Url, ValidationError> {
        sanitize_url(&request.url, &self.sanitize_opts).map_err(|e| {
            log::warn!("rejected probe target {:?}: {e}", request.url);
            let mut errors = ValidationError::new();
            errors.add("url", INVALID_URL_MESSAGE);
            errors
        })
    }
}

/// Resolve the caller's verb string to a standard HTTP method,
/// case-insensitively. Anything else is a field error on `method`.
fn parse_method(raw: &str) -> Result<Method, ValidationError> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        "PUT" => Ok(Method::PUT),
        "PATCH" => Ok(Method::PATCH),
        "DELETE" => Ok(Method::DELETE),
        "HEAD" => Ok(Method::HEAD),
        "OPTIONS" => Ok(Method::OPTIONS),
        "TRACE" => Ok(Method::TRACE),
        _ => {
            let mut errors = ValidationError::new();
            errors.add("method", "is not a standard HTTP method");
            Err(errors)
        }
    }
}

fn build_header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap, ProbeError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ProbeError::CallerData(format!("invalid header name: {name:?}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| ProbeError::CallerData(format!("invalid value for header {name}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

/// The outbound body. Params win over a raw body override and are
/// form-encoded uniformly, for every method including GET.
fn build_body(request: &ProbeRequest) -> Option<String> {
    match &request.request_params {
        Some(params) => Some(params.encode_body()),
        None => request.request_body.clone(),
    }
}

/// Pure transform of the params for storage: file-upload values become empty
/// strings, raw pre-serialized strings are parsed as JSON. A raw string that
/// does not parse is a caller contract violation and propagates.
fn normalize_params(
    params: Option<&RequestParams>,
) -> Result<Option<serde_json::Value>, ProbeError> {
    let Some(params) = params else {
        return Ok(None);
    };
    let value = match params {
        RequestParams::Raw(raw) => serde_json::from_str(raw).map_err(|e| {
            ProbeError::CallerData(format!("request_params is not valid JSON: {e}"))
        })?,
        RequestParams::Form(fields) => {
            let stored: serde_json::Map<String, serde_json::Value> = fields
                .iter()
                .map(|(key, value)| {
                    let stored_value = match value {
                        ParamValue::Text(text) => text.clone(),
                        ParamValue::File { .. } => String::new(),
                    };
                    (key.clone(), serde_json::Value::String(stored_value))
                })
                .collect();
            serde_json::Value::Object(stored)
        }
    };
    Ok(Some(value))
}

/// Flatten response headers into a plain string map. Values that are not
/// valid UTF-8 are decoded lossily; repeated headers keep the last value.
fn flatten_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}
