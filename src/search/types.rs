// src/search/types.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Social platform a video (or a repost of it) lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Tiktok,
    Instagram,
    Youtube,
    Facebook,
    Twitter,
    Website,
    Other,
}

impl Platform {
    /// Lenient parse used for request bodies and LLM output. Unknown names map to `Other`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "tiktok" => Platform::Tiktok,
            "instagram" | "instagram reels" | "reels" | "ig" => Platform::Instagram,
            "youtube" | "youtube shorts" | "shorts" | "yt" => Platform::Youtube,
            "facebook" | "fb" => Platform::Facebook,
            "twitter" | "x" | "twitter/x" | "x/twitter" => Platform::Twitter,
            "website" | "web" | "blog" | "news" => Platform::Website,
            _ => Platform::Other,
        }
    }

    /// Infer the platform from a link's host, if it is one we know.
    pub fn from_url(raw: &str) -> Option<Self> {
        let host = url::Url::parse(raw).ok()?.host_str()?.to_ascii_lowercase();
        let host = host.strip_prefix("www.").unwrap_or(&host);
        let p = match host {
            h if h == "tiktok.com" || h.ends_with(".tiktok.com") => Platform::Tiktok,
            h if h == "instagram.com" || h.ends_with(".instagram.com") => Platform::Instagram,
            h if h == "youtube.com" || h.ends_with(".youtube.com") || h == "youtu.be" => {
                Platform::Youtube
            }
            h if h == "facebook.com" || h.ends_with(".facebook.com") || h == "fb.watch" => {
                Platform::Facebook
            }
            "twitter.com" | "x.com" | "mobile.twitter.com" => Platform::Twitter,
            _ => Platform::Website,
        };
        Some(p)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Tiktok => "tiktok",
            Platform::Instagram => "instagram",
            Platform::Youtube => "youtube",
            Platform::Facebook => "facebook",
            Platform::Twitter => "twitter",
            Platform::Website => "website",
            Platform::Other => "other",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How sure an adapter is that a record is the same video, not merely related content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
}

impl Confidence {
    /// Anything that is not explicitly "high" is treated as medium.
    pub fn parse_lenient(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("high") {
            Confidence::High
        } else {
            Confidence::Medium
        }
    }

    /// Sort rank: lower sorts first.
    pub fn rank(&self) -> u8 {
        match self {
            Confidence::High => 0,
            Confidence::Medium => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepostType {
    #[default]
    Repost,
    Embed,
    Reaction,
}

impl RepostType {
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "embed" | "embedded" => RepostType::Embed,
            "reaction" | "duet" | "stitch" | "react" => RepostType::Reaction,
            _ => RepostType::Repost,
        }
    }
}

/// One discovered repost. This is the record every adapter emits and the API returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepostResult {
    pub platform: Platform,
    pub account_name: String,
    pub url: String,
    pub confidence: Confidence,
    pub date_found: NaiveDate,
    #[serde(rename = "type", default)]
    pub kind: RepostType,
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub comments: u64,
    #[serde(default)]
    pub shares: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

/// The source video a request asks about. Built once per request, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoQuery {
    pub url: String,
    pub platform: Platform,
    pub metadata: VideoMetadata,
}

impl VideoQuery {
    pub fn new(url: impl Into<String>, platform: Platform) -> Self {
        Self {
            url: url.into(),
            platform,
            metadata: VideoMetadata::default(),
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.metadata.author = Some(author.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.metadata.title = Some(title.into());
        self
    }

    /// Author as shown in prompts ("Unknown" when absent).
    pub fn author_display(&self) -> &str {
        non_blank(self.metadata.author.as_deref()).unwrap_or("Unknown")
    }

    pub fn title_display(&self) -> &str {
        non_blank(self.metadata.title.as_deref()).unwrap_or("Unknown")
    }

    /// Cleaned author handle, or `None` when unknown or a placeholder.
    pub fn author_handle(&self) -> Option<String> {
        self.metadata
            .author
            .as_deref()
            .map(clean_handle)
            .filter(|h| !is_placeholder_handle(h))
    }
}

/// Enrichment summary of the source video, used to parameterize search prompts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub description: String,
    pub keywords: Vec<String>,
    pub hashtags: Vec<String>,
    pub title: Option<String>,
}

impl VideoInfo {
    /// Synthetic summary used when the enrichment call fails.
    pub fn fallback(query: &VideoQuery) -> Self {
        let author = query.author_display();
        let mut keywords = Vec::new();
        if let Some(h) = query.author_handle() {
            keywords.push(h);
        }
        keywords.push(query.platform.as_str().to_string());
        Self {
            description: format!("{} video by {}", query.platform, author),
            keywords,
            hashtags: Vec::new(),
            title: non_blank(query.metadata.title.as_deref()).map(str::to_string),
        }
    }
}

/// Lowercase, trim, and drop a leading `@`.
pub fn clean_handle(raw: &str) -> String {
    raw.trim().trim_start_matches('@').trim().to_lowercase()
}

/// Handles that carry no identity ("unknown", "n/a", ...).
pub fn is_placeholder_handle(handle: &str) -> bool {
    matches!(
        handle,
        "" | "unknown" | "n/a" | "na" | "none" | "null" | "anonymous" | "original" | "-"
    )
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}
