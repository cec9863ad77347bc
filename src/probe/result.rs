use std::collections::BTreeMap;

use serde::Serialize;

/// Normalized snapshot of one executed probe, ready for persistence.
///
/// Built exactly once per successful invocation and handed to the caller;
/// the executor retains nothing. `assertions` is omitted from serialized
/// output when the caller supplied none — absence, not null, signals "no
/// assertions requested".
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub url: String,
    /// Upper-cased HTTP verb.
    pub method: String,
    pub status_code: u16,
    /// Response body re-encoded as valid UTF-8, undecodable sequences
    /// replaced.
    pub response_body: String,
    pub response_headers: BTreeMap<String, String>,
    pub request_headers: BTreeMap<String, String>,
    /// File-upload values replaced with `""`; raw string params parsed into
    /// structured JSON.
    pub request_params: Option<serde_json::Value>,
    pub request_body: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertions: Option<Vec<serde_json::Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_result() -> ProbeResult {
        ProbeResult {
            url: "https://example.test/".to_string(),
            method: "GET".to_string(),
            status_code: 200,
            response_body: "ok".to_string(),
            response_headers: BTreeMap::new(),
            request_headers: BTreeMap::new(),
            request_params: None,
            request_body: None,
            username: None,
            password: None,
            user_id: None,
            assertions: None,
        }
    }

    #[test]
    fn absent_assertions_are_omitted_from_serialized_output() {
        let json = serde_json::to_value(minimal_result()).unwrap();
        assert!(json.get("assertions").is_none());
        assert_eq!(json["status_code"], 200);
    }

    #[test]
    fn supplied_assertions_serialize_verbatim() {
        let mut result = minimal_result();
        result.assertions = Some(vec![serde_json::json!({"field": "status", "eq": 200})]);
        let json = serde_json::to_value(result).unwrap();
        assert_eq!(json["assertions"][0]["field"], "status");
    }
}
