// src/search/fields.rs
//! Per-provider field mapping. Each field lists candidate JSON pointers, evaluated
//! first-match-wins, so providers with alternate casings or nesting map onto one shape.

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use crate::search::types::{Confidence, Platform, RepostResult, RepostType};

/// Ordered candidate paths for every field of a `RepostResult`.
#[derive(Debug, Clone, Copy)]
pub struct FieldMap {
    pub url: &'static [&'static str],
    pub account: &'static [&'static str],
    pub platform: &'static [&'static str],
    pub confidence: &'static [&'static str],
    pub date: &'static [&'static str],
    pub kind: &'static [&'static str],
    pub likes: &'static [&'static str],
    pub views: &'static [&'static str],
    pub comments: &'static [&'static str],
    pub shares: &'static [&'static str],
}

/// Free-text LLM results (snake_case per the prompt, camelCase tolerated).
pub static LLM_FIELDS: FieldMap = FieldMap {
    url: &["/url", "/link", "/href"],
    account: &["/account_name", "/accountName", "/account", "/author", "/username"],
    platform: &["/platform"],
    confidence: &["/confidence"],
    date: &["/date_found", "/dateFound", "/date"],
    kind: &["/type", "/kind"],
    likes: &["/likes", "/like_count", "/likeCount"],
    views: &["/views", "/view_count", "/viewCount", "/plays"],
    comments: &["/comments", "/comment_count", "/commentCount"],
    shares: &["/shares", "/share_count", "/shareCount"],
};

/// clockworks/tiktok-scraper dataset items.
pub static TIKTOK_FIELDS: FieldMap = FieldMap {
    url: &["/webVideoUrl", "/videoUrl", "/url"],
    account: &[
        "/authorMeta/name",
        "/authorMeta/nickName",
        "/author/uniqueId",
        "/author/nickname",
        "/author",
    ],
    platform: &[],
    confidence: &[],
    date: &["/createTimeISO", "/createTime"],
    kind: &[],
    likes: &["/diggCount", "/stats/diggCount", "/likes"],
    views: &["/playCount", "/stats/playCount", "/views"],
    comments: &["/commentCount", "/stats/commentCount", "/comments"],
    shares: &["/shareCount", "/stats/shareCount", "/shares"],
};

/// apify/instagram-hashtag-scraper dataset items.
pub static INSTAGRAM_FIELDS: FieldMap = FieldMap {
    url: &["/url", "/postUrl"],
    account: &["/ownerUsername", "/owner/username", "/ownerFullName"],
    platform: &[],
    confidence: &[],
    date: &["/timestamp", "/takenAtTimestamp"],
    kind: &[],
    likes: &["/likesCount", "/likes"],
    views: &["/videoViewCount", "/videoPlayCount", "/playsCount"],
    comments: &["/commentsCount", "/comments"],
    shares: &[],
};

/// Values used when a record does not carry the field itself.
#[derive(Debug, Clone, Copy)]
pub struct RecordDefaults {
    pub platform: Platform,
    pub confidence: Confidence,
    pub today: NaiveDate,
}

impl FieldMap {
    /// Map one raw record. Returns `None` when no usable absolute http(s) URL is present.
    pub fn to_result(&self, rec: &Value, defaults: &RecordDefaults) -> Option<RepostResult> {
        let url = first_str(rec, self.url).filter(|u| is_absolute_http(u))?;

        let platform = first_str(rec, self.platform)
            .map(Platform::parse_lenient)
            .filter(|p| *p != Platform::Other)
            .or_else(|| Platform::from_url(url))
            .unwrap_or(defaults.platform);

        let account_name = first_str(rec, self.account)
            .map(str::to_string)
            .or_else(|| host_of(url))
            .unwrap_or_else(|| "unknown".to_string());

        Some(RepostResult {
            platform,
            account_name,
            url: url.to_string(),
            confidence: first_str(rec, self.confidence)
                .map(Confidence::parse_lenient)
                .unwrap_or(defaults.confidence),
            date_found: first_date(rec, self.date).unwrap_or(defaults.today),
            kind: first_str(rec, self.kind)
                .map(RepostType::parse_lenient)
                .unwrap_or_default(),
            likes: first_u64(rec, self.likes).unwrap_or(0),
            views: first_u64(rec, self.views).unwrap_or(0),
            comments: first_u64(rec, self.comments).unwrap_or(0),
            shares: first_u64(rec, self.shares).unwrap_or(0),
        })
    }
}

/// First non-blank string under any of `paths`.
pub fn first_str<'a>(rec: &'a Value, paths: &[&str]) -> Option<&'a str> {
    paths
        .iter()
        .filter_map(|p| rec.pointer(p))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// First non-negative count under any of `paths`. Accepts numbers and digit strings ("1,204").
pub fn first_u64(rec: &Value, paths: &[&str]) -> Option<u64> {
    paths
        .iter()
        .filter_map(|p| rec.pointer(p))
        .find_map(as_count)
}

fn as_count(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => {
            let digits: String = s.trim().chars().filter(|c| *c != ',').collect();
            digits.parse::<u64>().ok()
        }
        _ => None,
    }
}

/// First parseable date: `YYYY-MM-DD`, RFC 3339, or unix seconds.
pub fn first_date(rec: &Value, paths: &[&str]) -> Option<NaiveDate> {
    paths
        .iter()
        .filter_map(|p| rec.pointer(p))
        .find_map(as_date)
}

fn as_date(v: &Value) -> Option<NaiveDate> {
    match v {
        Value::String(s) => {
            let s = s.trim();
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.date_naive())
                .ok()
                .or_else(|| s.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
        }
        Value::Number(n) => n
            .as_i64()
            .filter(|secs| *secs > 0)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.date_naive()),
        _ => None,
    }
}

fn is_absolute_http(raw: &str) -> bool {
    url::Url::parse(raw)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

fn host_of(raw: &str) -> Option<String> {
    url::Url::parse(raw)
        .ok()?
        .host_str()
        .map(|h| h.trim_start_matches("www.").to_string())
}
