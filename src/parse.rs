use regex::Regex;
use std::sync::OnceLock;

fn profile_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"tiktok\.com/@([a-zA-Z0-9_.-]+)").expect("valid regex"))
}

fn playlist_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[&?]list=([^&]+)").expect("valid regex"))
}

/// Pull a channel handle out of a raw URL or handle string.
///
/// Accepts "@username", profile links, video links with an "@" path segment,
/// and bare single-word usernames. Returns `None` when nothing matches.
pub fn extract_username(input: &str) -> Option<String> {
    let input = input.trim();

    // Direct "@username" with no path
    if input.starts_with('@') && !input.contains('/') {
        return Some(input[1..].to_string());
    }

    // Profile link: tiktok.com/@username
    if let Some(caps) = profile_re().captures(input) {
        return Some(caps[1].to_string());
    }

    // Video link: any "/"-delimited segment starting with "@"
    for part in input.split('/') {
        if let Some(rest) = part.strip_prefix('@') {
            let handle = rest
                .split(['?', '#'])
                .next()
                .unwrap_or(rest);
            return Some(handle.to_string());
        }
    }

    // Bare single-word username (no slash, no dot)
    if !input.contains('/') && !input.contains('.') && !input.is_empty() {
        return Some(input.to_string());
    }

    None
}

/// Pull a playlist id out of a URL's `list=` query parameter.
pub fn extract_playlist_id(input: &str) -> Option<String> {
    playlist_re()
        .captures(input)
        .map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_direct_handle() {
        assert_eq!(extract_username("@foo"), Some("foo".to_string()));
        assert_eq!(extract_username("  @foo  "), Some("foo".to_string()));
    }

    #[test]
    fn username_profile_link() {
        assert_eq!(
            extract_username("https://tiktok.com/@foo"),
            Some("foo".to_string())
        );
        assert_eq!(
            extract_username("https://www.tiktok.com/@foo.bar_1"),
            Some("foo.bar_1".to_string())
        );
    }

    #[test]
    fn username_video_link() {
        assert_eq!(
            extract_username("https://tiktok.com/@foo/video/123"),
            Some("foo".to_string())
        );
    }

    #[test]
    fn username_segment_strips_query_and_fragment() {
        assert_eq!(
            extract_username("https://other.site/@bar?lang=en"),
            Some("bar".to_string())
        );
    }

    #[test]
    fn username_bare_word() {
        assert_eq!(extract_username("plainhandle"), Some("plainhandle".to_string()));
    }

    #[test]
    fn username_no_match() {
        assert_eq!(extract_username("https://youtube.com/watch?v=x"), None);
        assert_eq!(extract_username(""), None);
    }

    #[test]
    fn playlist_id_from_watch_url() {
        assert_eq!(
            extract_playlist_id("https://www.youtube.com/watch?v=x&list=PL123&index=2"),
            Some("PL123".to_string())
        );
        assert_eq!(
            extract_playlist_id("https://www.youtube.com/playlist?list=PLabc"),
            Some("PLabc".to_string())
        );
    }

    #[test]
    fn playlist_id_absent() {
        assert_eq!(extract_playlist_id("https://www.youtube.com/watch?v=x"), None);
    }
}
