use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::error::ValidationError;

/// A single form field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamValue {
    Text(String),
    /// Uploaded-file placeholder. Only the name travels with the probe; the
    /// stored record replaces the value with an empty string.
    File {
        file_name: String,
    },
}

/// Request parameters, either pre-serialized by the caller or structured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestParams {
    /// Caller-asserted pre-serialized form data, sent as the body verbatim.
    /// Must parse as JSON when the result is assembled.
    Raw(String),
    /// Field name to value mapping, URL-form-encoded into the body.
    Form(BTreeMap<String, ParamValue>),
}

impl RequestParams {
    /// URL-form-encode these params into a request body. File placeholders
    /// encode as empty values, matching how they are stored.
    pub fn encode_body(&self) -> String {
        match self {
            RequestParams::Raw(raw) => raw.clone(),
            RequestParams::Form(fields) => {
                let mut serializer = form_urlencoded::Serializer::new(String::new());
                for (key, value) in fields {
                    match value {
                        ParamValue::Text(text) => serializer.append_pair(key, text),
                        ParamValue::File { .. } => serializer.append_pair(key, ""),
                    };
                }
                serializer.finish()
            }
        }
    }
}

/// One outbound probe, as configured by the caller.
///
/// Constructed per invocation and consumed by
/// [`ProbeExecutor::execute`](crate::ProbeExecutor::execute). Unknown fields
/// in serialized input are rejected rather than silently dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ProbeRequest {
    pub url: String,
    pub method: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub request_params: Option<RequestParams>,
    /// Raw body, used only when `request_params` is absent.
    pub request_body: Option<String>,
    pub request_headers: BTreeMap<String, String>,
    /// Opaque assertion definitions, passed through unevaluated for a
    /// downstream evaluator.
    pub assertions: Option<Vec<serde_json::Value>>,
    pub user_id: Option<String>,
}

impl ProbeRequest {
    pub fn new(url: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: method.into(),
            ..Self::default()
        }
    }

    /// Presence check on the required fields. No network activity happens
    /// when this fails.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();
        if self.url.trim().is_empty() {
            errors.add("url", "is required");
        }
        if self.method.trim().is_empty() {
            errors.add("method", "is required");
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Basic-auth credentials, only when both halves are present. Partial
    /// credentials never leave the process.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(password)) => Some((user, password)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_flags_missing_fields() {
        let request = ProbeRequest::new("", "  ");
        let errors = request.validate().unwrap_err();
        assert_eq!(errors.field("url"), ["is required"]);
        assert_eq!(errors.field("method"), ["is required"]);
    }

    #[test]
    fn validate_passes_with_url_and_method() {
        let request = ProbeRequest::new("https://example.test", "get");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn credentials_require_both_halves() {
        let mut request = ProbeRequest::new("https://example.test", "get");
        request.username = Some("u".into());
        assert_eq!(request.credentials(), None);
        request.password = Some("p".into());
        assert_eq!(request.credentials(), Some(("u", "p")));
    }

    #[test]
    fn form_params_encode_with_files_emptied() {
        let mut fields = BTreeMap::new();
        fields.insert("a".to_string(), ParamValue::Text("1 2".to_string()));
        fields.insert(
            "file".to_string(),
            ParamValue::File {
                file_name: "report.pdf".to_string(),
            },
        );
        let body = RequestParams::Form(fields).encode_body();
        assert_eq!(body, "a=1+2&file=");
    }

    #[test]
    fn raw_params_pass_through_as_body() {
        let params = RequestParams::Raw("a=1&b=2".to_string());
        assert_eq!(params.encode_body(), "a=1&b=2");
    }

    #[test]
    fn deserialization_rejects_unknown_fields() {
        let result: Result<ProbeRequest, _> = serde_json::from_str(
            r#"{"url":"https://example.test","method":"get","shoe_size":44}"#,
        );
        assert!(result.is_err());
    }
}
