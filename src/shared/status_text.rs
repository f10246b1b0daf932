use axum::http::StatusCode;

/// Reason phrase for an HTTP status code, empty when none is registered.
pub fn status_text(status: u16) -> String {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text() {
        assert_eq!(status_text(200), "OK");
        assert_eq!(status_text(407), "Proxy Authentication Required");
        assert_eq!(status_text(504), "Gateway Timeout");
    }

    #[test]
    fn test_status_text_unknown_or_invalid() {
        // 0 is what the parser reports for an unreadable status line.
        assert_eq!(status_text(0), "");
        assert_eq!(status_text(599), "");
    }
}
