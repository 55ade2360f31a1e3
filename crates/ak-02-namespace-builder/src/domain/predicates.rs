//! Predicates over untyped WalletConnect payloads.

use appkit_types::{USER_REJECTED_CODE, USER_REJECTED_METHODS_CODE};
use serde_json::Value;

/// Whether `data` is a `session_event` payload:
/// `{ id, topic, params: { chainId, event: { .. } } }`.
pub fn is_session_event_data(data: &Value) -> bool {
    let Some(obj) = data.as_object() else {
        return false;
    };
    if !obj.contains_key("id") || !obj.contains_key("topic") {
        return false;
    }
    match obj.get("params").and_then(Value::as_object) {
        Some(params) => {
            params.contains_key("chainId")
                && params.get("event").is_some_and(Value::is_object)
        }
        None => false,
    }
}

/// Whether an error payload is a WalletConnect user rejection.
pub fn is_user_rejected_request_error(error: &Value) -> bool {
    error
        .get("code")
        .and_then(Value::as_i64)
        .is_some_and(|code| code == USER_REJECTED_CODE || code == USER_REJECTED_METHODS_CODE)
}
