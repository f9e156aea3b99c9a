// src/search/providers/web_search.rs
//! Free-text multi-search adapter. One instruction asks the LLM to run several web
//! searches for one platform/topic cluster and answer with a JSON array.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use metrics::counter;

use crate::clients::claude::{WebSearch, WebSearchTask};
use crate::search::extract::{extract_json_array, Extracted};
use crate::search::fields::{RecordDefaults, LLM_FIELDS};
use crate::search::providers::{drop_self_authored, Harvest, RepostProvider, SearchContext};
use crate::search::types::{Confidence, Platform};

const SYSTEM_PROMPT: &str = "You are a video repost detection assistant. The user gives you info about a short-form video. Search the web thoroughly for instances of this video being reposted on other accounts or platforms.

Return ONLY a valid JSON array of objects. Each object must have:
- \"platform\": one of tiktok, instagram, youtube, facebook, twitter, website, other
- \"account_name\": the account or site that reposted (e.g. @username)
- \"url\": direct link to the repost, exactly as found. Never guess or construct links.
- \"confidence\": \"high\" or \"medium\"
- \"date_found\": approximate date in YYYY-MM-DD format
- \"type\": \"repost\", \"embed\" or \"reaction\"
Optional when visible: \"likes\", \"views\", \"comments\", \"shares\" as integers.

Only include results that appear to be the SAME video content reposted by DIFFERENT accounts (not the original). If you find no reposts, return an empty array []. Return ONLY the JSON array, no other text.";

/// One search cluster. The orchestrator runs all of them in parallel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    TiktokReposts,
    InstagramReposts,
    VideoPlatforms,
    WebsiteEmbeds,
    BroadSearch,
}

impl SearchStrategy {
    pub const ALL: [SearchStrategy; 5] = [
        SearchStrategy::TiktokReposts,
        SearchStrategy::InstagramReposts,
        SearchStrategy::VideoPlatforms,
        SearchStrategy::WebsiteEmbeds,
        SearchStrategy::BroadSearch,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SearchStrategy::TiktokReposts => "claude:tiktok",
            SearchStrategy::InstagramReposts => "claude:instagram",
            SearchStrategy::VideoPlatforms => "claude:video-platforms",
            SearchStrategy::WebsiteEmbeds => "claude:websites",
            SearchStrategy::BroadSearch => "claude:broad",
        }
    }

    /// Platform assumed for records that name none and have no recognizable host.
    fn default_platform(&self) -> Platform {
        match self {
            SearchStrategy::TiktokReposts => Platform::Tiktok,
            SearchStrategy::InstagramReposts => Platform::Instagram,
            SearchStrategy::WebsiteEmbeds => Platform::Website,
            SearchStrategy::VideoPlatforms | SearchStrategy::BroadSearch => Platform::Other,
        }
    }

    /// The user-turn instruction for this cluster.
    pub fn instruction(&self, ctx: &SearchContext) -> String {
        let q = &ctx.query;
        let info = &ctx.info;
        let author = q.author_display();
        let keywords = join_or(&info.keywords, "none");
        let hashtags = join_or(&info.hashtags, "none");
        let phrase = info
            .title
            .as_deref()
            .unwrap_or_else(|| q.title_display());

        let header = format!(
            "Find reposts of this video:\n\nOriginal URL: {}\nPlatform: {}\nTitle/Description: {}\nAuthor: {}\nSummary: {}\nKeywords: {}\nHashtags: {}\n\n",
            q.url,
            q.platform,
            q.title_display(),
            author,
            info.description,
            keywords,
            hashtags,
        );

        let task = match self {
            SearchStrategy::TiktokReposts => format!(
                "Focus on TikTok only. Run these searches:\n1. site:tiktok.com \"{phrase}\"\n2. site:tiktok.com {keywords}\n3. site:tiktok.com {hashtags}\n4. TikTok compilation, clips, and meme accounts reposting {author}'s video\nReport only TikTok uploads by accounts other than {author}."
            ),
            SearchStrategy::InstagramReposts => format!(
                "Focus on Instagram Reels only. Run these searches:\n1. site:instagram.com/reel \"{phrase}\"\n2. site:instagram.com {keywords}\n3. instagram {hashtags}\n4. Instagram repost, viral, and clip pages sharing {author}'s video\nReport only Instagram posts by accounts other than {author}."
            ),
            SearchStrategy::VideoPlatforms => format!(
                "Focus on YouTube Shorts, Facebook, and Twitter/X. Run these searches:\n1. site:youtube.com/shorts \"{phrase}\"\n2. site:facebook.com {keywords} video\n3. site:x.com OR site:twitter.com {keywords}\n4. \"{author}\" video reupload\nReport only uploads by accounts other than {author}."
            ),
            SearchStrategy::WebsiteEmbeds => format!(
                "Focus on websites, news articles, and blogs that embed or re-host the video. Run these searches:\n1. \"{phrase}\" viral video\n2. {keywords} video article\n3. \"{author}\" viral video embed\nUse platform \"website\" and type \"embed\" for embedded copies. Account name is the site name."
            ),
            SearchStrategy::BroadSearch => format!(
                "Search extensively for this exact video reposted on TikTok, Instagram Reels, YouTube Shorts, Facebook, Twitter/X, and any other platforms. Look for the same video uploaded by different accounts. Search for the URL, the author name ({author}), keywords from the title, and any other identifying info."
            ),
        };

        format!("{header}{task}")
    }
}

fn join_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(" ")
    }
}

pub struct WebSearchAdapter {
    client: Arc<dyn WebSearch>,
    strategy: SearchStrategy,
    max_tokens: u32,
}

impl WebSearchAdapter {
    pub fn new(client: Arc<dyn WebSearch>, strategy: SearchStrategy, max_tokens: u32) -> Self {
        Self {
            client,
            strategy,
            max_tokens,
        }
    }

    pub fn task(&self, ctx: &SearchContext) -> WebSearchTask {
        WebSearchTask {
            system: SYSTEM_PROMPT.to_string(),
            prompt: self.strategy.instruction(ctx),
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl RepostProvider for WebSearchAdapter {
    async fn find(&self, ctx: &SearchContext) -> Result<Harvest> {
        let text = self.client.search(&self.task(ctx)).await?;

        let items = match extract_json_array(&text) {
            Extracted::Parsed(items) => items,
            Extracted::Unparsed(raw) => {
                tracing::warn!(provider = self.name(), len = raw.len(), "no JSON array in LLM answer");
                counter!("repost_unparsed_answers_total", "provider" => self.name()).increment(1);
                return Ok(Harvest::unparsed(raw));
            }
        };

        let defaults = RecordDefaults {
            platform: self.strategy.default_platform(),
            confidence: Confidence::Medium,
            today: ctx.today,
        };
        let results = items
            .iter()
            .filter_map(|rec| LLM_FIELDS.to_result(rec, &defaults))
            .collect();

        Ok(Harvest::results(drop_self_authored(results, &ctx.query)))
    }

    fn name(&self) -> &'static str {
        self.strategy.name()
    }
}
