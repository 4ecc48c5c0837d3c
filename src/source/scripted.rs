use async_trait::async_trait;

use super::{PageSource, PageSourceError};
use crate::models::RawRecord;

/// One page of a scripted timeline.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPage {
    pub records: Vec<RawRecord>,
    /// Whether a "load more" control is rendered on this page.
    pub load_more: bool,
    pub fail_fetch: bool,
    pub fail_load_more: bool,
    pub fail_scroll: bool,
}

impl ScriptedPage {
    /// A page with a working "load more" control.
    #[must_use]
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self {
            records,
            load_more: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn without_load_more(mut self) -> Self {
        self.load_more = false;
        self
    }

    #[must_use]
    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    #[must_use]
    pub fn failing_load_more(mut self) -> Self {
        self.fail_load_more = true;
        self
    }

    #[must_use]
    pub fn failing_scroll(mut self) -> Self {
        self.fail_scroll = true;
        self
    }
}

/// Collaborator calls observed by a [`ScriptedPageSource`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptedCalls {
    pub fetches: usize,
    pub load_more: usize,
    pub scrolls: usize,
}

/// In-memory page source that walks through a fixed list of pages.
///
/// Either advance strategy moves to the next page when one exists. Past the
/// last page the final page stays rendered.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPageSource {
    pages: Vec<ScriptedPage>,
    cursor: usize,
    calls: ScriptedCalls,
}

impl ScriptedPageSource {
    #[must_use]
    pub fn new(pages: Vec<ScriptedPage>) -> Self {
        Self {
            pages,
            cursor: 0,
            calls: ScriptedCalls::default(),
        }
    }

    #[must_use]
    pub fn calls(&self) -> ScriptedCalls {
        self.calls
    }

    /// Index of the page currently rendered.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn current(&self) -> Result<&ScriptedPage, PageSourceError> {
        self.pages.get(self.cursor).ok_or(PageSourceError::Closed)
    }

    fn step(&mut self) {
        if self.cursor + 1 < self.pages.len() {
            self.cursor += 1;
        }
    }
}

#[async_trait]
impl PageSource for ScriptedPageSource {
    async fn fetch_batch(&mut self) -> Result<Vec<RawRecord>, PageSourceError> {
        self.calls.fetches += 1;
        let page = self.current()?;
        if page.fail_fetch {
            return Err(PageSourceError::Timeout(std::time::Duration::ZERO));
        }
        Ok(page.records.clone())
    }

    async fn activate_load_more(&mut self) -> Result<bool, PageSourceError> {
        self.calls.load_more += 1;
        let page = self.current()?;
        if page.fail_load_more {
            return Err(PageSourceError::Browser("load more control detached".to_string()));
        }
        if !page.load_more {
            return Ok(false);
        }
        self.step();
        Ok(true)
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), PageSourceError> {
        self.calls.scrolls += 1;
        if self.current()?.fail_scroll {
            return Err(PageSourceError::Browser("scroll script failed".to_string()));
        }
        self.step();
        Ok(())
    }
}
