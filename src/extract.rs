//! Extraction pipeline: one raw record in, one post (or a skip) out.

use chrono::{DateTime, FixedOffset};
use tracing::debug;

use crate::classify::classify;
use crate::dedup::SeenIds;
use crate::language::{detect_language, LanguageDetector};
use crate::models::{Engagement, FilterMode, Post, RawRecord, SkipReason};
use crate::normalize::{extract_status_id, filter_external_urls, parse_count, parse_date_at};

/// Inputs shared by every record of a batch.
pub struct ExtractContext<'a> {
    pub filter_mode: FilterMode,
    pub author_fingerprint: &'a str,
    pub detector: &'a dyn LanguageDetector,
    /// Reference instant for relative and year-less dates.
    pub now: DateTime<FixedOffset>,
}

/// Convert one raw record into a post.
///
/// The steps run in a fixed order and each may end in a skip: classify,
/// apply the filter mode, extract the status ID, deduplicate, then read the
/// body and counters. The ID is recorded as seen before the body is read,
/// so a record with a missing body still consumes its ID.
///
/// # Errors
///
/// Returns the [`SkipReason`] for records that do not yield a post. Skips
/// are routine and never abort a batch.
pub fn extract(
    record: &RawRecord,
    ctx: &ExtractContext<'_>,
    seen: &mut SeenIds,
) -> Result<Post, SkipReason> {
    let classification = classify(record);
    if !ctx.filter_mode.admits(&classification.flags) {
        return Err(SkipReason::FilteredByType(classification.kind));
    }

    let id = record
        .permalink
        .as_deref()
        .and_then(extract_status_id)
        .ok_or(SkipReason::NoIdentifier)?;

    if !seen.insert(&id) {
        return Err(SkipReason::Duplicate);
    }

    let text = record
        .body
        .as_deref()
        .map(str::trim)
        .ok_or(SkipReason::MalformedBody)?
        .to_string();

    let created_at = parse_date_at(record.date_title.as_deref().unwrap_or_default(), ctx.now);

    let count = |raw: Option<&str>| raw.map_or(0, parse_count);
    let engagement = Engagement {
        retweets: count(record.retweet_count.as_deref()),
        likes: count(record.like_count.as_deref()),
        comments: count(record.comment_count.as_deref()),
    };

    let language = detect_language(ctx.detector, &text);

    Ok(Post {
        id,
        text,
        created_at,
        language,
        author_fingerprint: ctx.author_fingerprint.to_string(),
        engagement,
        flags: classification.flags,
        urls: filter_external_urls(&record.body_links),
    })
}

/// Per-reason tally of skipped records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipCounts {
    pub no_identifier: usize,
    pub duplicate: usize,
    pub filtered_by_type: usize,
    pub malformed_body: usize,
}

impl SkipCounts {
    pub fn record(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::NoIdentifier => self.no_identifier += 1,
            SkipReason::Duplicate => self.duplicate += 1,
            SkipReason::FilteredByType(_) => self.filtered_by_type += 1,
            SkipReason::MalformedBody => self.malformed_body += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.no_identifier + self.duplicate + self.filtered_by_type + self.malformed_body
    }

    pub fn merge(&mut self, other: &Self) {
        self.no_identifier += other.no_identifier;
        self.duplicate += other.duplicate;
        self.filtered_by_type += other.filtered_by_type;
        self.malformed_body += other.malformed_body;
    }
}

/// Run the pipeline over a batch, appending posts to `out`.
///
/// Returns the number of posts added and the skips encountered.
pub fn extract_batch(
    records: &[RawRecord],
    ctx: &ExtractContext<'_>,
    seen: &mut SeenIds,
    out: &mut Vec<Post>,
) -> (usize, SkipCounts) {
    let mut added = 0;
    let mut skipped = SkipCounts::default();

    for record in records {
        match extract(record, ctx, seen) {
            Ok(post) => {
                debug!(post_id = %post.id, kind = %post.kind(), "Extracted post");
                out.push(post);
                added += 1;
            }
            Err(reason) => {
                debug!(
                    permalink = record.permalink.as_deref().unwrap_or("-"),
                    reason = %reason,
                    "Skipped record"
                );
                skipped.record(reason);
            }
        }
    }

    (added, skipped)
}
