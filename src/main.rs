use clap::Parser;
use std::path::{Path, PathBuf};
use ultradown::app::{BrowserOpener, MediaKind, Mode, messages};
use ultradown::{
    AppState, CobaltResolver, GeminiClient, HistoryStore, HttpTransport, Shell, TextGenerator,
    VideoRecord,
};

#[derive(Parser)]
#[command(
    name = "ultradown",
    about = "Watermark-free social media downloader",
    long_about = "Paste a social-media link and get a direct, watermark-free download link,\n\
    optionally enriched with an AI summary and tags.\n\n\
    Examples:\n\
      ultradown https://www.tiktok.com/@user/video/123        # Resolve one video\n\
      ultradown @user                                         # Scan a channel\n\
      ultradown 'https://youtube.com/playlist?list=PL...'     # Scan a playlist\n\
      ultradown @user --batch                                 # Open every scanned link\n\
      ultradown <url> -d ./videos                             # Save to directory\n\
      ultradown --show-history                                # Show download history"
)]
struct Args {
    /// Video link, @username, profile link, or playlist link
    input: Option<String>,

    /// Force mode instead of inferring it (single, channel, playlist)
    #[arg(short = 'm', long = "mode")]
    mode: Option<String>,

    /// Download resolved media to this directory
    #[arg(short = 'd', long = "dir")]
    output_dir: Option<String>,

    /// Download the audio-only stream instead of the video
    #[arg(short = 'a', long = "audio")]
    audio: bool,

    /// Open every scanned video as a browser download, 1.5s apart
    #[arg(long = "batch")]
    batch: bool,

    /// Skip the AI summary/tags step
    #[arg(long = "no-insights")]
    no_insights: bool,

    /// Channel scan pagination cursor
    #[arg(long = "cursor", default_value_t = 0)]
    cursor: u64,

    /// History file location
    #[arg(long = "history-file", default_value = "ultradown_history.json")]
    history_file: String,

    /// Print the download history and exit
    #[arg(long = "show-history")]
    show_history: bool,

    /// Clear the download history and exit
    #[arg(long = "clear-history")]
    clear_history: bool,
}

fn parse_mode(mode_str: &str) -> Option<Mode> {
    match mode_str.to_lowercase().as_str() {
        "single" => Some(Mode::Single),
        "channel" => Some(Mode::Channel),
        "playlist" | "list" => Some(Mode::Playlist),
        _ => {
            eprintln!("Warning: Unknown mode '{}', inferring from input", mode_str);
            None
        }
    }
}

fn display_record(video: &VideoRecord) {
    println!("{} • {}", video.platform.name(), video.title);
    println!("  Author: {}", video.author);
    if let Some(duration) = &video.duration {
        println!("  Duration: {duration}s");
    }
    println!("  Download: {}", video.download_url);
    if let Some(music) = &video.music_url {
        println!("  Audio: {music}");
    }
    if let Some(insight) = &video.insight {
        println!("  Summary: {}", insight.summary);
        let tags: Vec<String> = insight
            .tags
            .iter()
            .map(|t| format!("#{}", t.trim_start_matches('#')))
            .collect();
        println!("  Tags: {}", tags.join(" "));
    }
}

fn display_list(videos: &[VideoRecord]) {
    println!("Found {} video(s):", videos.len());
    println!();
    for (index, video) in videos.iter().enumerate() {
        println!("[{}] {}", index + 1, video.title);
        println!("    Author: {}", video.author);
        println!("    Download: {}", video.download_url);
        println!();
    }
}

fn display_history(history: &HistoryStore) {
    if history.entries().is_empty() {
        println!("History is empty.");
        return;
    }
    println!("Download history ({} entries):", history.entries().len());
    println!();
    for entry in history.entries() {
        println!(
            "{:?} • {} • {}",
            entry.status, entry.video.title, entry.video.download_url
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let history_path = PathBuf::from(&args.history_file);
    let mut history = HistoryStore::load(&history_path);

    if args.clear_history {
        history.clear()?;
        println!("History cleared.");
        return Ok(());
    }
    if args.show_history {
        display_history(&history);
        return Ok(());
    }

    let Some(input) = args.input else {
        eprintln!("No input given. Try --help.");
        std::process::exit(2);
    };

    let transport = HttpTransport;
    let resolver = CobaltResolver;
    let generator = if args.no_insights {
        None
    } else {
        match GeminiClient::from_env() {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::debug!("Running without AI insights: {e}");
                None
            }
        }
    };
    let generator_ref = generator.as_ref().map(|g| g as &dyn TextGenerator);
    let shell = Shell {
        transport: &transport,
        resolver: &resolver,
        generator: generator_ref,
    };

    let mut state = AppState::new();
    state.input_changed(&input);
    if let Some(mode) = args.mode.as_deref().and_then(parse_mode) {
        state.set_mode(mode);
    }

    // Continuing a channel scan from a cursor bypasses the shell so the
    // next cursor can be reported
    if state.mode == Mode::Channel && args.cursor > 0 {
        let Some(username) = ultradown::parse::extract_username(&input) else {
            eprintln!("Error: {}", messages::INVALID_HANDLE);
            std::process::exit(1);
        };
        let page = ultradown::tikwm::fetch_user_posts(&transport, &username, args.cursor).await;
        if page.videos.is_empty() {
            eprintln!("Error: {}", messages::channel_empty(&username));
            std::process::exit(1);
        }
        display_list(&page.videos);
        if page.has_more {
            println!("More videos available, continue with --cursor {}", page.next_cursor);
        }
        return Ok(());
    }

    shell.submit(&mut state, &input).await;

    if let Some(error) = &state.error {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }

    if let Some(video) = state.current.clone() {
        display_record(&video);
        if let Some(dir) = &args.output_dir {
            let kind = if args.audio {
                MediaKind::Audio
            } else {
                MediaKind::Video
            };
            println!();
            println!("Downloading...");
            shell
                .download_media(&video, kind, Path::new(dir), &BrowserOpener, &mut history)
                .await;
        }
    }

    if !state.videos.is_empty() {
        display_list(&state.videos);
        if args.batch {
            println!("Opening {} download tabs, 1.5s apart...", state.videos.len());
            shell.run_batch(&mut state, &BrowserOpener, &mut history).await;
            println!("All download requests sent.");
        }
    }

    Ok(())
}
