use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use std::sync::OnceLock;
use tracing::{debug, warn};

use crate::core::{Platform, VideoRecord};
use crate::error::Result;
use crate::gemini::TextGenerator;
use crate::proxy::{Transport, fetch_page_via_proxy};

const INITIAL_DATA_MARKER: &str = "var ytInitialData = ";
const SCRIPT_CLOSE: &str = ";</script>";

/// Cap on candidate pairs handed to the AI extraction step
const MAX_CANDIDATES: usize = 50;

/// Degraded-input sizes when the page layout is not recognized
const RAW_PAGE_FALLBACK: usize = 30_000;
const BLOB_FALLBACK: usize = 20_000;

fn candidate_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#""videoId":"([^"]+)","title":\{"runs":\[\{"text":"([^"]+)""#)
            .expect("valid regex")
    })
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    id: String,
    title: String,
}

/// Scan a public YouTube playlist into video records.
///
/// All-or-nothing: any failure along the pipeline (network, parse, AI)
/// yields an empty list, never a partial result plus an error.
pub async fn fetch_playlist_videos(
    transport: &dyn Transport,
    generator: &dyn TextGenerator,
    playlist_id: &str,
) -> Vec<VideoRecord> {
    match scan(transport, generator, playlist_id).await {
        Ok(videos) => videos,
        Err(e) => {
            warn!("Playlist scan failed for {playlist_id}: {e}");
            Vec::new()
        }
    }
}

async fn scan(
    transport: &dyn Transport,
    generator: &dyn TextGenerator,
    playlist_id: &str,
) -> Result<Vec<VideoRecord>> {
    let target = format!("https://www.youtube.com/playlist?list={playlist_id}");
    let html = fetch_page_via_proxy(transport, &target).await?;

    let blob = extract_initial_data(&html);
    let simplified = simplify(&blob);

    let prompt = format!(
        "Nhiệm vụ: Trích xuất danh sách video (ID và Title) từ dữ liệu Playlist YouTube sau.\n\
         Dữ liệu: {simplified}\n\
         Trả về JSON Array: [{{\"id\": \"...\", \"title\": \"...\"}}]. Chỉ trả về JSON."
    );
    let schema = json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "id": {"type": "STRING"},
                "title": {"type": "STRING"}
            },
            "required": ["id", "title"]
        }
    });
    let text = generator.generate(&prompt, schema).await?;
    let items: Vec<PlaylistItem> = serde_json::from_str(&text)?;

    Ok(items.into_iter().map(into_record).collect())
}

/// Locate the embedded initial-data script blob, or degrade to a raw prefix
/// of the page when the marker is absent.
fn extract_initial_data(html: &str) -> String {
    match html.find(INITIAL_DATA_MARKER) {
        Some(start) => {
            let cut = &html[start + INITIAL_DATA_MARKER.len()..];
            match cut.find(SCRIPT_CLOSE) {
                Some(end) => cut[..end].to_string(),
                None => cut.to_string(),
            }
        }
        None => {
            debug!("Initial-data marker not found, using raw page prefix");
            truncate_chars(html, RAW_PAGE_FALLBACK).to_string()
        }
    }
}

/// Reduce the blob to up to [`MAX_CANDIDATES`] (videoId, title) fragments so
/// the AI extraction step gets a small, focused payload.
fn simplify(blob: &str) -> String {
    let candidates: Vec<&str> = candidate_re()
        .find_iter(blob)
        .take(MAX_CANDIDATES)
        .map(|m| m.as_str())
        .collect();
    if candidates.is_empty() {
        return truncate_chars(blob, BLOB_FALLBACK).to_string();
    }
    candidates.join("\n")
}

fn into_record(item: PlaylistItem) -> VideoRecord {
    let thumbnail = format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", item.id);
    let watch_url = format!("https://www.youtube.com/watch?v={}", item.id);
    VideoRecord::new(item.id, item.title, watch_url, Platform::Youtube)
        .with_author("YouTube Playlist".to_string())
        .with_thumbnail(thumbnail.clone())
        .with_cover_url(thumbnail)
}

/// Char-boundary-safe prefix
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gemini::tests::StubGenerator;
    use crate::proxy::tests::MockTransport;

    fn page_with_initial_data() -> String {
        let entries = r#"{"videoId":"abc123","title":{"runs":[{"text":"First video"}]}},{"videoId":"def456","title":{"runs":[{"text":"Second video"}]}}"#;
        let wrapped = format!(
            "<html><script>var ytInitialData = {{\"contents\":[{entries}]}};</script></html>"
        );
        serde_json::to_string(&serde_json::json!({ "contents": wrapped })).unwrap()
    }

    #[tokio::test]
    async fn maps_generator_items_to_records() {
        let transport = MockTransport::new(vec![Ok(page_with_initial_data())]);
        let stub = StubGenerator::ok(
            r#"[{"id":"abc123","title":"First video"},{"id":"def456","title":"Second video"}]"#,
        );
        let videos = fetch_playlist_videos(&transport, &stub, "PL123").await;
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].id, "abc123");
        assert_eq!(videos[0].author, "YouTube Playlist");
        assert_eq!(videos[0].platform, Platform::Youtube);
        assert_eq!(
            videos[0].download_url,
            "https://www.youtube.com/watch?v=abc123"
        );
        assert_eq!(
            videos[0].thumbnail,
            "https://i.ytimg.com/vi/abc123/hqdefault.jpg"
        );
    }

    #[tokio::test]
    async fn prompt_carries_simplified_candidates() {
        let transport = MockTransport::new(vec![Ok(page_with_initial_data())]);
        let stub = StubGenerator::ok("[]");
        fetch_playlist_videos(&transport, &stub, "PL123").await;
        let prompts = stub.prompts.lock().unwrap();
        assert!(prompts[0].contains(r#""videoId":"abc123""#));
        assert!(prompts[0].contains("First video"));
        // Candidate extraction trims the surrounding page noise
        assert!(!prompts[0].contains("<html>"));
    }

    #[tokio::test]
    async fn generator_failure_yields_empty_list() {
        let transport = MockTransport::new(vec![Ok(page_with_initial_data())]);
        let stub = StubGenerator::failing();
        assert!(
            fetch_playlist_videos(&transport, &stub, "PL123")
                .await
                .is_empty()
        );
    }

    #[tokio::test]
    async fn page_fetch_failure_yields_empty_list() {
        let transport = MockTransport::new(vec![]);
        let stub = StubGenerator::ok("[]");
        assert!(
            fetch_playlist_videos(&transport, &stub, "PL123")
                .await
                .is_empty()
        );
    }

    #[test]
    fn missing_marker_degrades_to_raw_prefix() {
        let html = "x".repeat(40_000);
        let blob = extract_initial_data(&html);
        assert_eq!(blob.len(), RAW_PAGE_FALLBACK);
    }

    #[test]
    fn blob_without_candidates_degrades_to_prefix() {
        let blob = "y".repeat(25_000);
        let simplified = simplify(&blob);
        assert_eq!(simplified.len(), BLOB_FALLBACK);
    }

    #[test]
    fn candidates_are_capped() {
        let entry = r#"{"videoId":"v","title":{"runs":[{"text":"t"}]}}"#;
        let blob = entry.repeat(80);
        let simplified = simplify(&blob);
        assert_eq!(simplified.lines().count(), MAX_CANDIDATES);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "việt".repeat(10);
        let cut = truncate_chars(&s, 5);
        assert_eq!(cut.chars().count(), 5);
    }
}
