//! Tracking WebSocket endpoint composition

use url::form_urlencoded;

/// Build the tracking WebSocket URL: `<base>/tracking/ws?token=<encoded>`
pub fn tracking_url(ws_base_url: &str, token: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(token.as_bytes()).collect();
    format!(
        "{}/tracking/ws?token={}",
        ws_base_url.trim_end_matches('/'),
        encoded
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_url() {
        let url = tracking_url("ws://localhost:7319/api/v1", "abc123");
        assert_eq!(url, "ws://localhost:7319/api/v1/tracking/ws?token=abc123");
    }

    #[test]
    fn test_tracking_url_trailing_slash() {
        let url = tracking_url("ws://localhost:7319/api/v1/", "abc123");
        assert_eq!(url, "ws://localhost:7319/api/v1/tracking/ws?token=abc123");
    }

    #[test]
    fn test_tracking_url_encodes_token() {
        let url = tracking_url("wss://tracker.example.com", "a+b/c=d");
        assert_eq!(
            url,
            "wss://tracker.example.com/tracking/ws?token=a%2Bb%2Fc%3Dd"
        );
    }
}
