use tracing::debug;

use crate::core::{Platform, VideoRecord};
use crate::proxy::{Transport, fetch_json_via_proxies};
use crate::tikwm::types::{ApiResponse, UserPostsResponse};

const API_BASE: &str = "https://www.tikwm.com/api";

/// Fixed page size for channel scans
pub const PAGE_SIZE: u32 = 35;

/// One page of a channel scan
#[derive(Debug, Default)]
pub struct ChannelPage {
    pub videos: Vec<VideoRecord>,
    pub next_cursor: u64,
    pub has_more: bool,
}

impl ChannelPage {
    fn empty() -> Self {
        Self::default()
    }
}

/// Fetch watermark-free metadata for a single TikTok/Douyin video.
///
/// Returns `None` on a non-zero status code, a missing payload, or when the
/// payload lacks the fields needed to build a usable record.
pub async fn fetch_video(
    transport: &dyn Transport,
    url: &str,
    platform: Platform,
) -> Option<VideoRecord> {
    let target = format!("{API_BASE}/?url={}&hd=1", urlencoding::encode(url));
    let value = fetch_json_via_proxies(transport, &target).await?;
    let resp: ApiResponse = match serde_json::from_value(value) {
        Ok(resp) => resp,
        Err(e) => {
            debug!("Unexpected metadata payload shape: {e}");
            return None;
        }
    };
    if resp.code != 0 {
        debug!("Metadata backend returned code {}", resp.code);
        return None;
    }
    let data = resp.data?;
    let id = data.id?;
    let play = data.play.filter(|p| !p.is_empty())?;

    let title = data
        .title
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| format!("{} Video {id}", platform.name()));
    let author = author_display(data.author.as_ref());
    let cover = data.cover.unwrap_or_default();

    let mut record = VideoRecord::new(id, title, play, platform)
        .with_author(author)
        .with_thumbnail(cover.clone())
        .with_duration(data.duration.unwrap_or(0).to_string())
        .with_cover_url(cover);
    if let Some(music) = data.music.filter(|m| !m.is_empty()) {
        record = record.with_music_url(music);
    }
    Some(record)
}

fn author_display(author: Option<&super::types::Author>) -> String {
    author
        .and_then(|a| {
            a.nickname
                .clone()
                .filter(|n| !n.is_empty())
                .or_else(|| a.unique_id.clone().filter(|u| !u.is_empty()))
        })
        .map(|name| format!("@{name}"))
        .unwrap_or_else(|| "@creator".to_string())
}

/// Fetch one page of a user's posts.
///
/// An empty or malformed payload yields an empty page with `has_more` false;
/// "no videos" is not distinguishable from "private profile" here.
pub async fn fetch_user_posts(
    transport: &dyn Transport,
    handle: &str,
    cursor: u64,
) -> ChannelPage {
    let clean = handle.trim_start_matches('@');
    let target = format!(
        "{API_BASE}/user/posts?unique_id={}&count={PAGE_SIZE}&cursor={cursor}",
        urlencoding::encode(clean)
    );
    let Some(value) = fetch_json_via_proxies(transport, &target).await else {
        return ChannelPage::empty();
    };
    let resp: UserPostsResponse = match serde_json::from_value(value) {
        Ok(resp) => resp,
        Err(e) => {
            debug!("Unexpected user-posts payload shape: {e}");
            return ChannelPage::empty();
        }
    };
    if resp.code != 0 {
        return ChannelPage::empty();
    }
    let Some(data) = resp.data else {
        return ChannelPage::empty();
    };
    let items = data.videos.or(data.posts).unwrap_or_default();
    if items.is_empty() {
        return ChannelPage::empty();
    }

    let videos = items
        .into_iter()
        .filter_map(|item| {
            let id = item.video_id.or(item.id)?;
            let play = item.play.or(item.hdplay).filter(|p| !p.is_empty())?;
            let cover = item.cover.or(item.origin_cover).unwrap_or_default();
            let title = item
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| format!("TikTok Video {id}"));
            let mut record = VideoRecord::new(id, title, play, Platform::Tiktok)
                .with_author(format!("@{clean}"))
                .with_thumbnail(cover.clone())
                .with_duration(item.duration.unwrap_or(0).to_string())
                .with_cover_url(cover);
            if let Some(music) = item.music.filter(|m| !m.is_empty()) {
                record = record.with_music_url(music);
            }
            Some(record)
        })
        .collect();

    ChannelPage {
        videos,
        next_cursor: data.cursor.unwrap_or(0),
        has_more: data.has_more,
    }
}
