use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{PageSourceError, ScriptedPage, ScriptedPageSource};
use crate::markup::parse_timeline;

/// Build a page source from saved timeline pages.
///
/// Every `*.html` file in `dir` is one page, in file-name order. All pages
/// but the last offer a "load more" control.
///
/// # Errors
///
/// Returns an error if the directory or one of its files cannot be read.
pub async fn load_replay_dir(dir: &Path) -> Result<ScriptedPageSource, PageSourceError> {
    let mut files: Vec<PathBuf> = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("html"))
        {
            files.push(path);
        }
    }
    files.sort();

    let mut pages = Vec::with_capacity(files.len());
    for (index, path) in files.iter().enumerate() {
        let html = tokio::fs::read_to_string(path).await?;
        let records = parse_timeline(&html);
        debug!(path = %path.display(), records = records.len(), "Loaded replay page");

        let page = ScriptedPage::new(records);
        pages.push(if index + 1 == files.len() {
            page.without_load_more()
        } else {
            page
        });
    }

    info!(dir = %dir.display(), pages = pages.len(), "Replay source ready");
    Ok(ScriptedPageSource::new(pages))
}
