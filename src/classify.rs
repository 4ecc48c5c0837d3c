//! Structural classification of rendered timeline items.

use crate::models::{PostFlags, PostKind, RawRecord};

/// Outcome of classifying one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub kind: PostKind,
    pub flags: PostFlags,
}

/// Classify a record from its structural markers.
///
/// A retweet banner wins over a quoted-post container, so a record is never
/// both a retweet and a quote. The reply flag is independent of both.
#[must_use]
pub fn classify(record: &RawRecord) -> Classification {
    let is_retweet = record.has_retweet_header;
    let is_quote = !is_retweet && record.has_quote;
    let is_reply = record.has_replying_to;

    let kind = if is_retweet {
        PostKind::Retweet
    } else if is_quote {
        PostKind::Quote
    } else if is_reply {
        PostKind::Reply
    } else {
        PostKind::Original
    };

    Classification {
        kind,
        flags: PostFlags {
            is_reply,
            is_retweet,
            is_quote,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(retweet: bool, quote: bool, reply: bool) -> RawRecord {
        RawRecord {
            has_retweet_header: retweet,
            has_quote: quote,
            has_replying_to: reply,
            ..RawRecord::default()
        }
    }

    #[test]
    fn test_original() {
        let c = classify(&record(false, false, false));
        assert_eq!(c.kind, PostKind::Original);
        assert_eq!(c.flags, PostFlags::default());
    }

    #[test]
    fn test_retweet_suppresses_quote() {
        let c = classify(&record(true, true, false));
        assert_eq!(c.kind, PostKind::Retweet);
        assert!(c.flags.is_retweet);
        assert!(!c.flags.is_quote);
    }

    #[test]
    fn test_quote_reply_compose() {
        let c = classify(&record(false, true, true));
        assert_eq!(c.kind, PostKind::Quote);
        assert!(c.flags.is_quote);
        assert!(c.flags.is_reply);
    }

    #[test]
    fn test_reply() {
        let c = classify(&record(false, false, true));
        assert_eq!(c.kind, PostKind::Reply);
        assert!(c.flags.is_reply);
    }

    #[test]
    fn test_never_retweet_and_quote() {
        for bits in 0u8..8 {
            let c = classify(&record(bits & 1 != 0, bits & 2 != 0, bits & 4 != 0));
            assert!(!(c.flags.is_retweet && c.flags.is_quote), "markers {bits:03b}");
        }
    }
}
