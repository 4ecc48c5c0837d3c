//! Core record types shared by the extraction engine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One rendered timeline item as produced by a page source.
///
/// Every field is optional because the mirror renders posts inconsistently;
/// the extraction pipeline decides which absences are fatal for a record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    /// Permalink target of the post's date anchor.
    pub permalink: Option<String>,
    /// Title attribute of the date anchor (e.g. `Mar 23, 2025 · 5:15 PM UTC`).
    pub date_title: Option<String>,
    /// Rendered body text. `None` means the body region was missing entirely.
    pub body: Option<String>,
    /// Anchor targets inside the body region, in document order.
    pub body_links: Vec<String>,
    pub comment_count: Option<String>,
    pub retweet_count: Option<String>,
    pub like_count: Option<String>,
    /// A retweet banner was rendered above the post.
    pub has_retweet_header: bool,
    /// A quoted-post container was rendered inside the post.
    pub has_quote: bool,
    /// A "replying to" indicator was rendered.
    pub has_replying_to: bool,
}

/// Engagement counters, all defaulting to zero when unparseable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub retweets: u64,
    pub likes: u64,
    pub comments: u64,
}

/// Structural flags of a post.
///
/// `is_retweet` and `is_quote` are never both set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostFlags {
    pub is_reply: bool,
    pub is_retweet: bool,
    pub is_quote: bool,
}

/// Content-type taxonomy of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostKind {
    Original,
    Reply,
    Quote,
    Retweet,
}

impl PostKind {
    /// Upper-case label used in console listings.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Original | Self::Reply => "TWEET",
            Self::Quote => "QUOTE",
            Self::Retweet => "RETWEET",
        }
    }
}

impl fmt::Display for PostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Original => "original",
            Self::Reply => "reply",
            Self::Quote => "quote",
            Self::Retweet => "retweet",
        };
        f.write_str(name)
    }
}

/// Canonical post record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub language: String,
    pub author_fingerprint: String,
    pub engagement: Engagement,
    pub flags: PostFlags,
    pub urls: Vec<String>,
}

impl Post {
    /// Content kind derived from the post's flags.
    #[must_use]
    pub fn kind(&self) -> PostKind {
        if self.flags.is_retweet {
            PostKind::Retweet
        } else if self.flags.is_quote {
            PostKind::Quote
        } else if self.flags.is_reply {
            PostKind::Reply
        } else {
            PostKind::Original
        }
    }
}

#[derive(Debug, Error)]
#[error("invalid filter mode '{0}': expected 'original', 'original_and_quotes' or 'all'")]
pub struct FilterModeError(pub String);

/// Which post kinds survive extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Drop retweets and quotes.
    #[default]
    Original,
    /// Drop retweets only.
    OriginalAndQuotes,
    /// Keep everything.
    All,
}

impl FilterMode {
    /// Whether a post with these flags passes the filter.
    #[must_use]
    pub const fn admits(self, flags: &PostFlags) -> bool {
        match self {
            Self::Original => !flags.is_retweet && !flags.is_quote,
            Self::OriginalAndQuotes => !flags.is_retweet,
            Self::All => true,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::OriginalAndQuotes => "original_and_quotes",
            Self::All => "all",
        }
    }
}

impl FromStr for FilterMode {
    type Err = FilterModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "original" => Ok(Self::Original),
            "original_and_quotes" => Ok(Self::OriginalAndQuotes),
            "all" => Ok(Self::All),
            _ => Err(FilterModeError(s.to_string())),
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the pipeline declined to produce a post for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("permalink has no status identifier")]
    NoIdentifier,
    #[error("identifier already extracted this session")]
    Duplicate,
    #[error("{0} excluded by filter mode")]
    FilteredByType(PostKind),
    #[error("post body missing")]
    MalformedBody,
}
