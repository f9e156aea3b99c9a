// src/search/identity.rs
//! Best-effort extraction of a platform video id from the source URL.
//! The id is only used to exclude self-matches; an empty id disables that check.

use url::Url;

use crate::search::types::Platform;

/// Returns the platform-specific video id, or an empty string when it cannot be found.
pub fn extract_video_id(raw: &str, platform: Platform) -> String {
    let Some(url) = parse_loose(raw) else {
        return String::new();
    };
    let segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|p| !p.is_empty()).collect())
        .unwrap_or_default();

    let id = match platform {
        Platform::Tiktok => segment_after(&segments, &["video"]),
        Platform::Instagram => segment_after(&segments, &["reel", "reels"]),
        Platform::Youtube => youtube_id(&url, &segments),
        _ => None,
    };
    id.unwrap_or_default()
}

fn parse_loose(raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match Url::parse(raw) {
        Ok(u) => Some(u),
        // Bare "tiktok.com/@x/video/1" style links.
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&format!("https://{raw}")).ok(),
        Err(_) => None,
    }
}

fn segment_after(segments: &[&str], markers: &[&str]) -> Option<String> {
    let pos = segments.iter().position(|s| markers.contains(s))?;
    segments.get(pos + 1).map(|s| s.to_string())
}

fn youtube_id(url: &Url, segments: &[&str]) -> Option<String> {
    if segments.contains(&"shorts") {
        return segment_after(segments, &["shorts"]);
    }
    if let Some((_, v)) = url.query_pairs().find(|(k, _)| k == "v") {
        if !v.is_empty() {
            return Some(v.into_owned());
        }
    }
    // "watch" is a route name, not an id.
    segments
        .last()
        .filter(|s| **s != "watch")
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiktok_segment_after_video() {
        assert_eq!(
            extract_video_id("https://tiktok.com/@x/video/123", Platform::Tiktok),
            "123"
        );
        assert_eq!(
            extract_video_id("https://www.tiktok.com/@x/video/7301?lang=en", Platform::Tiktok),
            "7301"
        );
    }

    #[test]
    fn tiktok_without_scheme_still_parses() {
        assert_eq!(extract_video_id("tiktok.com/@x/video/55", Platform::Tiktok), "55");
    }

    #[test]
    fn instagram_reel_and_reels() {
        assert_eq!(
            extract_video_id("https://www.instagram.com/reel/CxYz12/", Platform::Instagram),
            "CxYz12"
        );
        assert_eq!(
            extract_video_id("https://instagram.com/reels/Abc/", Platform::Instagram),
            "Abc"
        );
    }

    #[test]
    fn youtube_shorts_query_and_last_segment() {
        assert_eq!(
            extract_video_id("https://youtube.com/shorts/sh0rt", Platform::Youtube),
            "sh0rt"
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ", Platform::Youtube),
            "dQw4w9WgXcQ"
        );
        assert_eq!(extract_video_id("https://youtu.be/abc123", Platform::Youtube), "abc123");
    }

    #[test]
    fn failures_yield_empty() {
        assert_eq!(extract_video_id("", Platform::Tiktok), "");
        assert_eq!(extract_video_id("https://tiktok.com/@x", Platform::Tiktok), "");
        assert_eq!(extract_video_id("https://tiktok.com/@x/video", Platform::Tiktok), "");
        assert_eq!(extract_video_id("https://youtube.com/shorts", Platform::Youtube), "");
        assert_eq!(extract_video_id("https://youtube.com/watch", Platform::Youtube), "");
        assert_eq!(extract_video_id("http://[::1", Platform::Instagram), "");
        assert_eq!(extract_video_id("https://fb.com/v/1", Platform::Facebook), "");
    }
}
