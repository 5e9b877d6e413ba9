//! Normalization of backend error payloads into user-facing messages.
//!
//! Error bodies arrive as a single problem object or an array of them. Two
//! shapes are understood: `{"detail": "..."}` (the common case) and
//! `{"text": "..." | ["..."]}` (emitted by a handful of legacy validation
//! paths).

use serde_json::Value;

/// Fold an error body into the message list.
///
/// `detail` entries accumulate onto the existing list; a `text` entry
/// replaces the list wholesale. The asymmetry is long-standing observed
/// behavior that downstream UIs render as-is.
pub fn extend_messages(messages: &mut Vec<String>, body: &Value) {
    let problems: &[Value] = match body {
        Value::Array(items) => items.as_slice(),
        other => std::slice::from_ref(other),
    };

    for problem in problems {
        if let Some(detail) = problem.get("detail").and_then(Value::as_str) {
            messages.push(detail.to_string());
        } else if let Some(text) = problem.get("text") {
            *messages = match text {
                Value::String(s) => vec![s.clone()],
                Value::Array(items) => items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
                other => vec![other.to_string()],
            };
        } else {
            // Unrecognized problem shapes produce no message; leave a trace
            // so they are at least visible to operators.
            tracing::warn!(%problem, "discarding error problem with neither `detail` nor `text`");
        }
    }
}
