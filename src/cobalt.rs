use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::download::post_json;

const API_URL: &str = "https://api.cobalt.tools/api/json";

/// Default quality hint passed to the backend
pub const DEFAULT_QUALITY: &str = "1080";

#[derive(Debug, Serialize)]
struct MediaRequest<'a> {
    url: &'a str,
    #[serde(rename = "vQuality")]
    v_quality: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct MediaResponse {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Resolved direct-download link
#[derive(Debug)]
pub struct ResolvedMedia {
    pub url: String,
    pub filename: Option<String>,
}

/// Generic media-resolution capability; the last-resort path when no
/// dedicated backend matched. Seam so callers can stub it in tests.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    /// Ask for a direct download link; `None` means "no result", network
    /// and payload-shape failures included.
    async fn resolve(&self, url: &str, quality: &str) -> Option<ResolvedMedia>;
}

/// Real backend: direct POST, no proxy list, failures never propagated
pub struct CobaltResolver;

#[async_trait]
impl MediaResolver for CobaltResolver {
    async fn resolve(&self, url: &str, quality: &str) -> Option<ResolvedMedia> {
        let body = MediaRequest {
            url,
            v_quality: quality,
        };
        let resp: MediaResponse = match post_json(API_URL, &body).await {
            Ok(resp) => resp,
            Err(e) => {
                debug!("Media-resolution backend error: {e}");
                return None;
            }
        };
        let url = resp.url.filter(|u| !u.is_empty())?;
        Some(ResolvedMedia {
            url,
            filename: resp.filename,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Stub resolver: a canned result, or `None` for the "both paths fail"
    /// case.
    pub(crate) struct StubResolver {
        pub media: Option<(String, Option<String>)>,
    }

    impl StubResolver {
        pub(crate) fn none() -> Self {
            Self { media: None }
        }

        pub(crate) fn with(url: &str, filename: Option<&str>) -> Self {
            Self {
                media: Some((url.to_string(), filename.map(str::to_string))),
            }
        }
    }

    #[async_trait]
    impl MediaResolver for StubResolver {
        async fn resolve(&self, _url: &str, _quality: &str) -> Option<ResolvedMedia> {
            self.media.clone().map(|(url, filename)| ResolvedMedia { url, filename })
        }
    }

    #[test]
    fn request_body_uses_backend_field_names() {
        let body = MediaRequest {
            url: "https://youtu.be/x",
            v_quality: DEFAULT_QUALITY,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["url"], "https://youtu.be/x");
        assert_eq!(json["vQuality"], "1080");
    }

    #[test]
    fn response_tolerates_missing_fields() {
        let resp: MediaResponse = serde_json::from_str(r#"{"status":"error"}"#).unwrap();
        assert!(resp.url.is_none());
        assert!(resp.filename.is_none());
    }
}
