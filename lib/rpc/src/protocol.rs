//! JSON-RPC 2.0 envelope handling for the `/web` endpoints.

use serde::Serialize;
use serde_json::{Value, json};

use fieldops_core::ClientError;

/// Exception class the server reports when the session cookie is stale.
pub const SESSION_EXPIRED_EXCEPTION: &str = "odoo.http.SessionExpiredException";

/// Wrap call parameters in a JSON-RPC 2.0 envelope.
pub fn envelope<P: Serialize>(params: &P) -> Result<Value, ClientError> {
    let params = serde_json::to_value(params).map_err(|e| ClientError::Decode(e.to_string()))?;
    Ok(json!({
        "jsonrpc": "2.0",
        "method": "call",
        "params": params,
    }))
}

/// Parameters for a `call_kw` request.
#[derive(Debug, Clone, Serialize)]
pub struct CallKw {
    pub model: String,
    pub method: String,
    pub args: Value,
    pub kwargs: Value,
}

/// Classify a raw response body into a result value or an error.
///
/// Faults always arrive with HTTP 200, so only the body is inspected.
/// A body that is not an envelope at all (no `jsonrpc` member, or not
/// JSON) is treated as a stale session: the server answers those
/// requests with a login redirect instead of an envelope.
pub fn evaluate(body: &str) -> Result<Value, ClientError> {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return Err(ClientError::SessionExpired);
    };
    let Some(response) = value.as_object() else {
        return Err(ClientError::SessionExpired);
    };
    if !response.contains_key("jsonrpc") {
        return Err(ClientError::SessionExpired);
    }

    if let Some(error) = response.get("error") {
        let data = error.get("data");
        let name = data
            .and_then(|d| d.get("name"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        if name == SESSION_EXPIRED_EXCEPTION {
            return Err(ClientError::SessionExpired);
        }
        let message = data
            .and_then(|d| d.get("message"))
            .and_then(Value::as_str)
            .or_else(|| error.get("message").and_then(Value::as_str))
            .unwrap_or("server error")
            .to_string();
        return Err(ClientError::Server { name, message });
    }

    Ok(response.get("result").cloned().unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_shape() {
        let body = envelope(&json!({"db": "prod", "login": "jo"})).unwrap();
        assert_eq!(
            body,
            json!({
                "jsonrpc": "2.0",
                "method": "call",
                "params": {"db": "prod", "login": "jo"},
            })
        );
    }

    #[test]
    fn result_passes_through() {
        let result = evaluate(r#"{"jsonrpc": "2.0", "id": null, "result": [1, 2]}"#).unwrap();
        assert_eq!(result, json!([1, 2]));
    }

    #[test]
    fn false_result_is_a_value_not_an_error() {
        let result = evaluate(r#"{"jsonrpc": "2.0", "result": false}"#).unwrap();
        assert_eq!(result, json!(false));
    }

    #[test]
    fn expired_exception_maps_to_session_expired() {
        let body = json!({
            "jsonrpc": "2.0",
            "error": {
                "message": "Odoo Session Expired",
                "data": {"name": SESSION_EXPIRED_EXCEPTION, "message": "Session expired"},
            },
        })
        .to_string();
        assert!(matches!(
            evaluate(&body),
            Err(ClientError::SessionExpired)
        ));
    }

    #[test]
    fn missing_jsonrpc_member_means_expired() {
        assert!(matches!(
            evaluate(r#"{"redirect": "/web/login"}"#),
            Err(ClientError::SessionExpired)
        ));
        assert!(matches!(
            evaluate("<html>login</html>"),
            Err(ClientError::SessionExpired)
        ));
    }

    #[test]
    fn fault_preserves_name_and_message() {
        let body = json!({
            "jsonrpc": "2.0",
            "error": {
                "message": "Odoo Server Error",
                "data": {
                    "name": "odoo.exceptions.ValidationError",
                    "message": "Check-in must precede check-out",
                },
            },
        })
        .to_string();
        match evaluate(&body) {
            Err(ClientError::Server { name, message }) => {
                assert_eq!(name, "odoo.exceptions.ValidationError");
                assert_eq!(message, "Check-in must precede check-out");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn fault_without_data_uses_outer_message() {
        let body = json!({
            "jsonrpc": "2.0",
            "error": {"message": "Internal Server Error"},
        })
        .to_string();
        match evaluate(&body) {
            Err(ClientError::Server { name, message }) => {
                assert_eq!(name, "");
                assert_eq!(message, "Internal Server Error");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
