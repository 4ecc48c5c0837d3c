//! Shared constants used across the application.

/// User agent string presented by the browser page source.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Default mirror instance.
pub const DEFAULT_BASE_URL: &str = "https://nitter.net";

/// CSS selector for one rendered timeline row.
pub const TIMELINE_ITEM_SELECTOR: &str = ".timeline-item";

pub const WINDOW_WIDTH: u32 = 1920;
pub const WINDOW_HEIGHT: u32 = 1080;
