/// Centralized helper for WebSocket error frames.
///
/// Use it so every error a client sees has the same shape.
use serde_json::json;

/// Formats a WebSocket error frame: `{"type":"error","msg":...}`.
///
/// Only ever sent to the connection whose request failed.
pub fn ws_error_message(message: &str) -> String {
    json!({ "type": "error", "msg": message }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_frame_escapes_message() {
        let frame: serde_json::Value =
            serde_json::from_str(&ws_error_message(r#"Unexpected request type '"x"'"#)).unwrap();
        assert_eq!(frame["type"], "error");
        assert_eq!(frame["msg"], r#"Unexpected request type '"x"'"#);
    }
}
