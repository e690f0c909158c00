pub mod app;
pub mod cobalt;
pub mod core;
pub mod download;
pub mod error;
pub mod gemini;
pub mod history;
pub mod parse;
pub mod playlist;
pub mod proxy;
pub mod resolve;
pub mod tikwm;
mod utils;

pub use app::{AppState, BatchStatus, Mode, Shell};
pub use cobalt::{CobaltResolver, MediaResolver};
pub use core::{Insight, Platform, VideoRecord};
pub use error::{Result, UltradownError};
pub use gemini::{GeminiClient, TextGenerator};
pub use history::HistoryStore;
pub use proxy::{HttpTransport, Transport};

/// Thumbnail used for records synthesized without backend artwork
const PLACEHOLDER_THUMBNAIL: &str =
    "https://images.unsplash.com/photo-1611162617474-5b21e879e113?q=80&w=200";

/// Resolve a raw URL or handle into a normalized video record.
///
/// Short links are expanded first; TikTok/Douyin links go through the
/// dedicated metadata backend, everything else (and any metadata miss)
/// falls back to the generic media resolver. Returns `None` when both
/// paths fail.
pub async fn analyze_link(
    transport: &dyn Transport,
    resolver: &dyn MediaResolver,
    url: &str,
) -> Option<VideoRecord> {
    let resolved = resolve::resolve_url(transport, url).await;
    let platform = Platform::detect(&resolved);

    if matches!(platform, Platform::Tiktok | Platform::Douyin)
        && let Some(record) = tikwm::fetch_video(transport, &resolved, platform).await
    {
        return Some(record);
    }

    let media = resolver.resolve(&resolved, cobalt::DEFAULT_QUALITY).await?;
    let title = media
        .filename
        .clone()
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| format!("Video from {}", platform.name()));
    Some(
        VideoRecord::new(utils::short_id(&resolved), title, media.url, platform)
            .with_author(platform.name().to_string())
            .with_thumbnail(PLACEHOLDER_THUMBNAIL.to_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cobalt::tests::StubResolver;
    use crate::proxy::tests::MockTransport;

    #[tokio::test]
    async fn tiktok_link_resolves_through_metadata_backend() {
        let raw = r#"{
            "code": 0,
            "data": {
                "id": "7301234",
                "title": "Clip",
                "author": {"nickname": "Foo"},
                "cover": "https://cdn.example/c.jpg",
                "duration": 10,
                "play": "https://cdn.example/p.mp4"
            }
        }"#;
        let transport = MockTransport::new(vec![Ok(raw.to_string())]);
        let resolver = StubResolver::none();
        let record = analyze_link(&transport, &resolver, "https://www.tiktok.com/@foo/video/7301234")
            .await
            .unwrap();
        assert_eq!(record.platform, Platform::Tiktok);
        assert!(record.author.starts_with('@'));
        assert_eq!(record.download_url, "https://cdn.example/p.mp4");
    }

    #[tokio::test]
    async fn short_link_expansion_feeds_detection() {
        let expansion = r#"{"url":"https://www.tiktok.com/@foo/video/99"}"#;
        let metadata = r#"{"code":0,"data":{"id":"99","play":"https://cdn.example/p.mp4"}}"#;
        let transport = MockTransport::new(vec![
            Ok(expansion.to_string()),
            Ok(metadata.to_string()),
        ]);
        let resolver = StubResolver::none();
        let record = analyze_link(&transport, &resolver, "https://vt.tiktok.com/ZSabc/")
            .await
            .unwrap();
        assert_eq!(record.platform, Platform::Tiktok);
        assert_eq!(record.id, "99");
    }

    #[tokio::test]
    async fn unmatched_link_synthesizes_record_from_media_resolver() {
        let transport = MockTransport::new(vec![]);
        let resolver = StubResolver::with("https://dl.example/clip.mp4", Some("clip.mp4"));
        let record = analyze_link(&transport, &resolver, "https://youtu.be/abc")
            .await
            .unwrap();
        assert_eq!(record.platform, Platform::Youtube);
        assert_eq!(record.title, "clip.mp4");
        assert_eq!(record.author, "YouTube");
        assert_eq!(record.download_url, "https://dl.example/clip.mp4");
        assert_eq!(record.id.len(), 9);
        // watch page URL never reached a proxy
        assert!(transport.requested.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_filename_falls_back_to_platform_title() {
        let transport = MockTransport::new(vec![]);
        let resolver = StubResolver::with("https://dl.example/x", None);
        let record = analyze_link(&transport, &resolver, "https://example.com/video")
            .await
            .unwrap();
        assert_eq!(record.title, "Video from Other");
    }

    #[tokio::test]
    async fn broken_link_yields_no_record() {
        let transport = MockTransport::new(vec![]);
        let resolver = StubResolver::none();
        assert!(
            analyze_link(&transport, &resolver, "https://broken.example/nothing")
                .await
                .is_none()
        );
    }
}
