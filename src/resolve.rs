use serde_json::Value;
use tracing::debug;

use crate::proxy::{Transport, allorigins_get};

/// Short-link domains that break platform detection and backend matching
/// until expanded to their canonical form.
const SHORT_LINK_DOMAINS: &[&str] = &["vt.tiktok.com", "v.douyin.com"];

/// Expand known TikTok/Douyin short links to canonical URLs.
///
/// Best-effort: any failure, or a response without a usable `url` field,
/// returns the input unchanged. Non-short-link inputs pass through.
pub async fn resolve_url(transport: &dyn Transport, url: &str) -> String {
    if !SHORT_LINK_DOMAINS.iter().any(|d| url.contains(d)) {
        return url.to_string();
    }

    match transport.get_text(&allorigins_get(url)).await {
        Ok(text) => {
            if let Ok(value) = serde_json::from_str::<Value>(&text)
                && let Some(resolved) = value.get("url").and_then(Value::as_str)
                && !resolved.is_empty()
            {
                return resolved.to_string();
            }
            debug!("Short-link expansion returned no usable url for {url}");
            url.to_string()
        }
        Err(e) => {
            debug!("Short-link expansion failed for {url}: {e}");
            url.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UltradownError;
    use crate::proxy::tests::MockTransport;

    #[tokio::test]
    async fn plain_url_passes_through_without_network() {
        let transport = MockTransport::new(vec![]);
        let url = "https://www.tiktok.com/@foo/video/123";
        assert_eq!(resolve_url(&transport, url).await, url);
        assert!(transport.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn short_link_is_expanded() {
        let transport = MockTransport::new(vec![Ok(
            r#"{"url":"https://www.tiktok.com/@foo/video/123"}"#.to_string(),
        )]);
        let resolved = resolve_url(&transport, "https://vt.tiktok.com/ZSabc/").await;
        assert_eq!(resolved, "https://www.tiktok.com/@foo/video/123");
    }

    #[tokio::test]
    async fn douyin_short_link_uses_wrapping_proxy() {
        let transport = MockTransport::new(vec![Ok(
            r#"{"url":"https://www.douyin.com/video/7000"}"#.to_string(),
        )]);
        let resolved = resolve_url(&transport, "https://v.douyin.com/xyz/").await;
        assert_eq!(resolved, "https://www.douyin.com/video/7000");
        let requested = transport.requested.lock().unwrap();
        assert!(requested[0].starts_with("https://api.allorigins.win/get?url="));
    }

    #[tokio::test]
    async fn expansion_failure_returns_original() {
        let transport =
            MockTransport::new(vec![Err(UltradownError::RequestTimeout("proxy".into()))]);
        let url = "https://vt.tiktok.com/ZSabc/";
        assert_eq!(resolve_url(&transport, url).await, url);
    }

    #[tokio::test]
    async fn missing_url_field_returns_original() {
        let transport = MockTransport::new(vec![Ok(r#"{"contents":"<html>"}"#.to_string())]);
        let url = "https://v.douyin.com/xyz/";
        assert_eq!(resolve_url(&transport, url).await, url);
    }
}
