//! Per-scrape session state.

use chrono::{DateTime, FixedOffset};
use sha2::{Digest, Sha256};

use crate::dedup::SeenIds;
use crate::extract::{extract_batch, ExtractContext, SkipCounts};
use crate::language::LanguageDetector;
use crate::models::{FilterMode, Post, RawRecord};

/// Number of hex characters kept from the username digest.
const FINGERPRINT_LEN: usize = 16;

/// Derive a stable, non-reversible identifier for an account name.
#[must_use]
pub fn author_fingerprint(username: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(username.as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(FINGERPRINT_LEN);
    digest
}

/// State owned by the pagination driver for one scrape invocation.
#[derive(Debug)]
pub struct Session {
    username: String,
    author_fingerprint: String,
    seen: SeenIds,
    accumulated: Vec<Post>,
}

impl Session {
    #[must_use]
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            author_fingerprint: author_fingerprint(username),
            seen: SeenIds::new(),
            accumulated: Vec::new(),
        }
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn author_fingerprint(&self) -> &str {
        &self.author_fingerprint
    }

    /// Run the extraction pipeline over one batch, accumulating the posts.
    ///
    /// Returns the number of new posts and the skips encountered.
    pub fn ingest(
        &mut self,
        records: &[RawRecord],
        filter_mode: FilterMode,
        detector: &dyn LanguageDetector,
        now: DateTime<FixedOffset>,
    ) -> (usize, SkipCounts) {
        let ctx = ExtractContext {
            filter_mode,
            author_fingerprint: &self.author_fingerprint,
            detector,
            now,
        };
        extract_batch(records, &ctx, &mut self.seen, &mut self.accumulated)
    }

    #[must_use]
    pub fn seen_ids(&self) -> &SeenIds {
        &self.seen
    }

    /// Posts accumulated so far, in extraction order.
    #[must_use]
    pub fn posts(&self) -> &[Post] {
        &self.accumulated
    }

    /// Consume the session, returning posts newest first.
    ///
    /// The sort is stable, so posts sharing a timestamp keep extraction order.
    #[must_use]
    pub fn into_sorted_posts(self) -> Vec<Post> {
        let mut posts = self.accumulated;
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_fingerprint() {
        let a = author_fingerprint("elonmusk");
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(a, author_fingerprint("elonmusk"));
        assert_ne!(a, author_fingerprint("jack"));
        // SHA-256("abc") = ba7816bf8f01cfea...
        assert_eq!(author_fingerprint("abc"), "ba7816bf8f01cfea");
    }

    #[test]
    fn test_session_fingerprint_is_constant() {
        let session = Session::new("jack");
        assert_eq!(session.username(), "jack");
        assert_eq!(session.author_fingerprint(), author_fingerprint("jack"));
        assert!(session.posts().is_empty());
    }

    #[test]
    fn test_ingest_and_sort_newest_first() {
        use chrono::TimeZone;

        use crate::language::WhatlangDetector;

        let record = |id: &str, date: &str| RawRecord {
            permalink: Some(format!("/jack/status/{id}")),
            date_title: Some(date.to_string()),
            body: Some(String::new()),
            ..RawRecord::default()
        };
        let now = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2025, 6, 1, 0, 0, 0)
            .unwrap();

        let mut session = Session::new("jack");
        let (added, skipped) = session.ingest(
            &[
                record("1", "Jan 1, 2025"),
                record("2", "Mar 1, 2025"),
                record("3", "Jan 1, 2025"),
                record("2", "Feb 1, 2025"),
            ],
            FilterMode::All,
            &WhatlangDetector,
            now,
        );
        assert_eq!(added, 3);
        assert_eq!(skipped.duplicate, 1);
        assert_eq!(session.seen_ids().len(), 3);
        assert!(session
            .posts()
            .iter()
            .all(|p| p.author_fingerprint == author_fingerprint("jack")));

        let ids: Vec<_> = session
            .into_sorted_posts()
            .into_iter()
            .map(|p| p.id)
            .collect();
        // Ties keep extraction order
        assert_eq!(ids, vec!["2", "1", "3"]);
    }
}
