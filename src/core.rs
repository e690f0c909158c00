use serde::{Deserialize, Serialize};
pub use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Supported platforms
#[derive(EnumIter, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Tiktok,
    Douyin,
    Youtube,
    Instagram,
    Facebook,
    Twitter,
    Kuaishou,
    Bilibili,
    Other,
}

/// Ordered domain-fragment table; first match wins
const DOMAIN_TABLE: &[(&[&str], Platform)] = &[
    (&["tiktok.com"], Platform::Tiktok),
    (&["douyin.com"], Platform::Douyin),
    (&["youtube.com", "youtu.be"], Platform::Youtube),
    (&["instagram.com"], Platform::Instagram),
    (&["facebook.com", "fb.watch"], Platform::Facebook),
    (&["twitter.com", "x.com"], Platform::Twitter),
    (&["kuaishou.com", "chenzhongtech.com"], Platform::Kuaishou),
    (&["bilibili.com"], Platform::Bilibili),
];

impl Platform {
    /// Detect platform from a raw URL or handle string.
    ///
    /// Deliberately tolerant: substring search only, no URL parsing, so
    /// malformed input degrades to `Other` instead of erroring.
    pub fn detect(input: &str) -> Platform {
        let lower = input.trim().to_lowercase();
        if lower.is_empty() {
            return Platform::Other;
        }
        for (fragments, platform) in DOMAIN_TABLE {
            if fragments.iter().any(|f| lower.contains(f)) {
                return *platform;
            }
        }
        // Bare "@username" shorthand means a TikTok handle
        if lower.starts_with('@') {
            return Platform::Tiktok;
        }
        Platform::Other
    }

    /// Capitalized display name
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Tiktok => "TikTok",
            Platform::Douyin => "Douyin",
            Platform::Youtube => "YouTube",
            Platform::Instagram => "Instagram",
            Platform::Facebook => "Facebook",
            Platform::Twitter => "Twitter",
            Platform::Kuaishou => "Kuaishou",
            Platform::Bilibili => "Bilibili",
            Platform::Other => "Other",
        }
    }
}

/// AI-generated summary and tags for a video title
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Insight {
    pub summary: String,
    pub tags: Vec<String>,
}

/// Normalized video record produced by the resolvers and scanners
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    pub author: String,
    pub thumbnail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub download_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub music_url: Option<String>,
    pub cover_url: String,
    pub platform: Platform,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insight: Option<Insight>,
}

impl VideoRecord {
    /// Create a new video record
    pub fn new(id: String, title: String, download_url: String, platform: Platform) -> Self {
        Self {
            id,
            title,
            author: String::new(),
            thumbnail: String::new(),
            duration: None,
            download_url,
            music_url: None,
            cover_url: String::new(),
            platform,
            insight: None,
        }
    }

    /// Set author display string
    pub fn with_author(mut self, author: String) -> Self {
        self.author = author;
        self
    }

    /// Set thumbnail URL
    pub fn with_thumbnail(mut self, thumbnail: String) -> Self {
        self.thumbnail = thumbnail;
        self
    }

    /// Set string-encoded duration in seconds
    pub fn with_duration(mut self, duration: String) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Set separate audio-only URL
    pub fn with_music_url(mut self, music_url: String) -> Self {
        self.music_url = Some(music_url);
        self
    }

    /// Set cover URL
    pub fn with_cover_url(mut self, cover_url: String) -> Self {
        self.cover_url = cover_url;
        self
    }

    /// Attach AI insight after creation
    pub fn with_insight(mut self, insight: Insight) -> Self {
        self.insight = Some(insight);
        self
    }
}
