// src/search/merge.rs
//! Merge & rank: dedup by canonical key, drop self-references, high confidence first.

use std::collections::HashSet;

use crate::search::canonical::canonical_key;
use crate::search::types::{clean_handle, is_placeholder_handle, RepostResult};

/// Merged output plus per-step drop counts (for logs and metrics).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Merged {
    pub results: Vec<RepostResult>,
    pub missing_url: usize,
    pub duplicates: usize,
    pub self_refs: usize,
    pub author_refs: usize,
}

/// Merge the flattened fan-out output.
///
/// Order matters: dedup runs before exclusion so first-seen order from the fan-out is
/// what survives, and the final sort is stable within a confidence tier.
pub fn merge_and_rank(raw: Vec<RepostResult>, video_id: &str, author: Option<&str>) -> Merged {
    let video_id = video_id.trim().to_lowercase();
    let author_markers = author
        .map(clean_handle)
        .filter(|h| !is_placeholder_handle(h))
        .map(|h| [format!("/{h}/"), format!("/@{h}/")]);

    let mut out = Merged::default();
    let mut seen: HashSet<String> = HashSet::new();

    for r in raw {
        // (1) no url
        if r.url.trim().is_empty() {
            out.missing_url += 1;
            continue;
        }

        // (2) first occurrence wins
        let key = canonical_key(&r.url);
        if !seen.insert(key.clone()) {
            out.duplicates += 1;
            continue;
        }

        // (3) the original video itself
        if !video_id.is_empty() && key.contains(&video_id) {
            out.self_refs += 1;
            continue;
        }

        // (4) the original author's own profile paths
        if let Some(markers) = &author_markers {
            let padded = format!("{key}/");
            if markers.iter().any(|m| padded.contains(m.as_str())) {
                out.author_refs += 1;
                continue;
            }
        }

        out.results.push(r);
    }

    // (5) stable: keeps first-seen order inside each tier
    out.results.sort_by_key(|r| r.confidence.rank());
    out
}
