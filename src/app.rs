use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::analyze_link;
use crate::cobalt::MediaResolver;
use crate::core::{Platform, VideoRecord};
use crate::download::save_binary;
use crate::gemini::{TextGenerator, fetch_insights};
use crate::history::HistoryStore;
use crate::parse::{extract_playlist_id, extract_username};
use crate::playlist::fetch_playlist_videos;
use crate::proxy::Transport;
use crate::tikwm;

/// Fixed pacing between batch items; keeps popup blockers and backend
/// throttling quiet. Non-adaptive.
pub const BATCH_DELAY: Duration = Duration::from_millis(1500);

/// User-facing messages
pub mod messages {
    pub const VIDEO_FAILED: &str = "Không thể lấy dữ liệu video. Hãy thử lại hoặc dùng link khác.";
    pub const INVALID_HANDLE: &str = "Vui lòng nhập @username hoặc link profile TikTok hợp lệ.";
    pub const INVALID_PLAYLIST: &str = "Link không chứa Playlist ID hợp lệ (?list=...)";
    pub const PLAYLIST_EMPTY: &str = "Không thể lấy danh sách video. Playlist có thể bị ẩn.";
    pub const POPUP_BLOCKED: &str = "Vui lòng cho phép Popup!";

    pub fn channel_empty(handle: &str) -> String {
        format!("Không tìm thấy video nào của @{handle}. Profile có thể riêng tư.")
    }
}

/// Operation mode, inferred from URL shape or set explicitly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Single,
    Channel,
    Playlist,
}

impl Mode {
    /// Infer mode from the input's shape. Empty input keeps the current mode.
    pub fn infer(input: &str) -> Option<Mode> {
        if input.contains("list=") {
            return Some(Mode::Playlist);
        }
        if (input.contains("tiktok.com/@") || input.starts_with('@')) && !input.contains("/video/")
        {
            return Some(Mode::Channel);
        }
        if !input.trim().is_empty() {
            return Some(Mode::Single);
        }
        None
    }
}

/// Transient progress cursor for an in-flight batch operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchStatus {
    pub current: usize,
    pub total: usize,
}

/// Explicit shell state; every user action is a reducer-style transition
/// on this object, no hidden globals.
#[derive(Debug, Default)]
pub struct AppState {
    pub mode: Mode,
    pub current: Option<VideoRecord>,
    pub videos: Vec<VideoRecord>,
    pub error: Option<String>,
    pub batch: Option<BatchStatus>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit mode selection also clears any displayed result
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.current = None;
        self.videos.clear();
    }

    /// Re-infer mode as the input changes
    pub fn input_changed(&mut self, input: &str) {
        if let Some(mode) = Mode::infer(input) {
            self.mode = mode;
        }
    }

    fn begin(&mut self) {
        self.error = None;
        self.current = None;
        self.videos.clear();
    }

    fn show_video(&mut self, video: VideoRecord) {
        self.current = Some(video);
    }

    fn show_videos(&mut self, videos: Vec<VideoRecord>) {
        self.videos = videos;
    }

    fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }
}

/// How a URL gets handed to the user's browser
pub trait LinkOpener: Send + Sync {
    /// Open `url` in a new tab; `false` means the open was blocked
    fn open(&self, url: &str) -> bool;
}

/// Opens URLs through the platform launcher
pub struct BrowserOpener;

impl LinkOpener for BrowserOpener {
    fn open(&self, url: &str) -> bool {
        let result = if cfg!(target_os = "macos") {
            std::process::Command::new("open").arg(url).spawn()
        } else if cfg!(target_os = "windows") {
            std::process::Command::new("cmd")
                .args(["/C", "start", "", url])
                .spawn()
        } else {
            std::process::Command::new("xdg-open").arg(url).spawn()
        };
        result.is_ok()
    }
}

/// Which stream of a record to download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
}

/// Ties the resolvers and scanners to the shell state
pub struct Shell<'a> {
    pub transport: &'a dyn Transport,
    pub resolver: &'a dyn MediaResolver,
    pub generator: Option<&'a dyn TextGenerator>,
}

impl Shell<'_> {
    /// Process one submitted input according to the current mode.
    pub async fn submit(&self, state: &mut AppState, input: &str) {
        if input.trim().is_empty() {
            return;
        }
        state.begin();
        match state.mode {
            Mode::Single => self.submit_single(state, input).await,
            Mode::Channel => self.submit_channel(state, input).await,
            Mode::Playlist => self.submit_playlist(state, input).await,
        }
    }

    async fn submit_single(&self, state: &mut AppState, input: &str) {
        match analyze_link(self.transport, self.resolver, input).await {
            Some(mut video) => {
                // Insight failures are silent; the record simply lacks them
                if let Some(generator) = self.generator
                    && let Some(insight) = fetch_insights(generator, &video.title).await
                {
                    video.insight = Some(insight);
                }
                info!("Resolved {} video {}", video.platform.name(), video.id);
                state.show_video(video);
            }
            None => state.fail(messages::VIDEO_FAILED),
        }
    }

    async fn submit_channel(&self, state: &mut AppState, input: &str) {
        let Some(username) = extract_username(input) else {
            state.fail(messages::INVALID_HANDLE);
            return;
        };
        info!("Scanning channel @{username}");
        let page = tikwm::fetch_user_posts(self.transport, &username, 0).await;
        if page.videos.is_empty() {
            // "no videos" and "private profile" are indistinguishable here
            state.fail(messages::channel_empty(&username));
        } else {
            state.show_videos(page.videos);
        }
    }

    async fn submit_playlist(&self, state: &mut AppState, input: &str) {
        let Some(playlist_id) = extract_playlist_id(input) else {
            state.fail(messages::INVALID_PLAYLIST);
            return;
        };
        let Some(generator) = self.generator else {
            debug!("No text generator configured, cannot scan playlist");
            state.fail(messages::PLAYLIST_EMPTY);
            return;
        };
        info!("Scanning playlist {playlist_id}");
        let videos = fetch_playlist_videos(self.transport, generator, &playlist_id).await;
        if videos.is_empty() {
            state.fail(messages::PLAYLIST_EMPTY);
        } else {
            state.show_videos(videos);
        }
    }

    /// Open every scanned record serially, in order, pacing by
    /// [`BATCH_DELAY`]. Halts immediately on the first item whose open
    /// fails; items are never requested concurrently.
    pub async fn run_batch(
        &self,
        state: &mut AppState,
        opener: &dyn LinkOpener,
        history: &mut HistoryStore,
    ) {
        let videos = state.videos.clone();
        let total = videos.len();
        for (index, video) in videos.iter().enumerate() {
            state.batch = Some(BatchStatus {
                current: index + 1,
                total,
            });
            if !self.open_for_batch(video, opener, history).await {
                warn!("{}", messages::POPUP_BLOCKED);
                break;
            }
            if index + 1 < total {
                tokio::time::sleep(BATCH_DELAY).await;
            }
        }
        state.batch = None;
    }

    async fn open_for_batch(
        &self,
        video: &VideoRecord,
        opener: &dyn LinkOpener,
        history: &mut HistoryStore,
    ) -> bool {
        let mut file_url = video.download_url.clone();
        // YouTube entries carry watch-page URLs; synthesize the real
        // download link unless one was already resolved
        if video.platform == Platform::Youtube && !file_url.contains("cobalt") {
            match analyze_link(self.transport, self.resolver, &file_url).await {
                Some(analyzed) if !analyzed.download_url.is_empty() => {
                    file_url = analyzed.download_url;
                }
                _ => {
                    opener.open(&file_url);
                    return false;
                }
            }
        }
        if !opener.open(&file_url) {
            return false;
        }
        if let Err(e) = history.record(video.clone()) {
            warn!("Failed to persist history entry: {e}");
        }
        true
    }

    /// Save a single record to disk, falling back to opening the URL when
    /// the direct fetch fails. Either way the record lands in history.
    pub async fn download_media(
        &self,
        video: &VideoRecord,
        kind: MediaKind,
        dir: &Path,
        opener: &dyn LinkOpener,
        history: &mut HistoryStore,
    ) -> bool {
        let mut file_url = match kind {
            MediaKind::Video => video.download_url.clone(),
            MediaKind::Audio => video
                .music_url
                .clone()
                .unwrap_or_else(|| video.download_url.clone()),
        };
        if video.platform == Platform::Youtube && !file_url.contains("cobalt") {
            match analyze_link(self.transport, self.resolver, &file_url).await {
                Some(analyzed) if !analyzed.download_url.is_empty() => {
                    file_url = analyzed.download_url;
                }
                _ => {
                    warn!("Could not synthesize a download link for {}", video.id);
                    return false;
                }
            }
        }

        let filename = build_filename(&video.title, kind);
        match save_binary(&file_url, dir, &filename).await {
            Ok(path) => {
                info!("Saved to {}", path.display());
            }
            Err(e) => {
                debug!("Direct fetch failed ({e}), opening in browser instead");
                opener.open(&file_url);
            }
        }
        if let Err(e) = history.record(video.clone()) {
            warn!("Failed to persist history entry: {e}");
        }
        true
    }
}

fn build_filename(title: &str, kind: MediaKind) -> String {
    let base: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .take(30)
        .collect();
    let base = if base.is_empty() {
        "video".to_string()
    } else {
        base
    };
    let ext = match kind {
        MediaKind::Video => "mp4",
        MediaKind::Audio => "mp3",
    };
    format!(
        "{base}-{}.{ext}",
        chrono::Utc::now().timestamp_millis()
    )
}
