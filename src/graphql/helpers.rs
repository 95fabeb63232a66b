//! GraphQL Response Helpers

use serde_json::{json, Value};

/// Builds a GraphQL success response.
///
/// # Arguments
///
/// * `operation` – The operation name, used as the key under `data`.
/// * `value` – The operation's result.
pub fn gql_data(operation: &str, value: Value) -> Value {
    json!({
        "data": { operation: value },
    })
}

/// Builds a GraphQL error response with no data.
///
/// # Arguments
///
/// * `message` – Human-readable description of the error.
pub fn gql_error(message: impl Into<String>) -> Value {
    json!({
        "data": null,
        "errors": [{ "message": message.into() }],
    })
}
