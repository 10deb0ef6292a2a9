/// Centralized helpers for WebSocket protocol-level error payloads.
///
/// Use these helpers to ensure all error messages are consistent, explicit,
/// and include a code and context.

/// Formats a WebSocket error message as a JSON string.
///
/// # Arguments
/// - `code`: Unique error code (e.g. "INVALID_ACTION").
/// - `message`: Human-readable error message (in English).
/// - `context`: Optional context (e.g. player_id, game_id).
pub fn ws_error_message(code: &str, message: &str, context: Option<&str>) -> String {
    let context_str = context.unwrap_or("");
    format!(
        r#"{{"type":"error","code":"{}","message":"{}","context":"{}"}}"#,
        code, message, context_str
    )
}
