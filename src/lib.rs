//! Nitter timeline scraper library.
//!
//! Extracts structured post records from a paginated Nitter timeline:
//! classifying each rendered post, normalizing dates and engagement counters,
//! deduplicating across page loads, and driving a bounded pagination loop.

pub mod classify;
pub mod config;
pub mod constants;
pub mod dedup;
pub mod export;
pub mod extract;
pub mod language;
pub mod markup;
pub mod models;
pub mod normalize;
pub mod paginate;
pub mod session;
pub mod source;

pub use models::{Engagement, FilterMode, Post, PostFlags, PostKind, RawRecord, SkipReason};
pub use paginate::{IterationObserver, Paginator, ScrapeOutcome, ScrapeStats};
pub use session::Session;
pub use source::PageSource;
