//! Page-source collaborators.
//!
//! A page source owns one rendered timeline session and hands the engine
//! batches of [`RawRecord`]s. The engine never sees how pages are rendered.

mod browser;
mod replay;
mod scripted;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::RawRecord;

pub use browser::{BrowserOptions, ChromiumPageSource};
pub use replay::load_replay_dir;
pub use scripted::{ScriptedCalls, ScriptedPage, ScriptedPageSource};

#[derive(Debug, Error)]
pub enum PageSourceError {
    #[error("timed out after {0:?} waiting for timeline items")]
    Timeout(std::time::Duration),
    #[error("browser error: {0}")]
    Browser(String),
    #[error("page source closed")]
    Closed,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Capability interface over a rendered, paginated timeline.
#[async_trait]
pub trait PageSource: Send {
    /// Records currently rendered, after a bounded wait for readiness.
    ///
    /// # Errors
    ///
    /// Returns an error if the timeline never became ready.
    async fn fetch_batch(&mut self) -> Result<Vec<RawRecord>, PageSourceError>;

    /// Activate the "load more" control. Returns `false` if no control exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the control could not be located or activated.
    async fn activate_load_more(&mut self) -> Result<bool, PageSourceError>;

    /// Move to the bottom of the rendered content.
    ///
    /// # Errors
    ///
    /// Returns an error if the page could not be scrolled.
    async fn scroll_to_bottom(&mut self) -> Result<(), PageSourceError>;
}
