//! Serialize extracted posts to CSV or JSON files.

use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::config::OutputFormat;
use crate::models::Post;

/// Timestamp layout used in CSV rows.
pub const CSV_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// CSV column order. Must match the field order of `PostRow`.
pub const CSV_HEADER: [&str; 12] = [
    "tweet_id",
    "text",
    "created_at",
    "lang",
    "user_id_hashed",
    "retweet_count",
    "like_count",
    "comment_count",
    "is_reply",
    "is_retweet",
    "is_quote",
    "urls",
];

/// Placeholder path for errors raised before a file is known.
const UNNAMED_WRITER: &str = "<writer>";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ExportError {
    fn flush(source: std::io::Error) -> Self {
        Self::Io {
            path: UNNAMED_WRITER.to_string(),
            source,
        }
    }

    /// Attach the destination path to IO errors.
    fn at(self, path: &Path) -> Self {
        match self {
            Self::Io { source, .. } => Self::Io {
                path: path.display().to_string(),
                source,
            },
            other => other,
        }
    }
}

/// Flat CSV row, one per post.
#[derive(Debug, Serialize)]
struct PostRow<'a> {
    tweet_id: &'a str,
    text: &'a str,
    created_at: String,
    lang: &'a str,
    user_id_hashed: &'a str,
    retweet_count: u64,
    like_count: u64,
    comment_count: u64,
    is_reply: bool,
    is_retweet: bool,
    is_quote: bool,
    /// JSON-encoded list
    urls: String,
}

impl<'a> PostRow<'a> {
    fn new(post: &'a Post) -> Result<Self, ExportError> {
        Ok(Self {
            tweet_id: &post.id,
            text: &post.text,
            created_at: post.created_at.format(CSV_TIMESTAMP_FORMAT).to_string(),
            lang: &post.language,
            user_id_hashed: &post.author_fingerprint,
            retweet_count: post.engagement.retweets,
            like_count: post.engagement.likes,
            comment_count: post.engagement.comments,
            is_reply: post.flags.is_reply,
            is_retweet: post.flags.is_retweet,
            is_quote: post.flags.is_quote,
            urls: serde_json::to_string(&post.urls)?,
        })
    }
}

/// Write posts as CSV. The header row is written even when `posts` is empty.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_csv<W: std::io::Write>(posts: &[Post], writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(CSV_HEADER)?;
    for post in posts {
        csv_writer.serialize(PostRow::new(post)?)?;
    }
    csv_writer.flush().map_err(ExportError::flush)?;
    Ok(())
}

/// Write posts as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns an error if serialization, writing or the final flush fails.
pub fn write_json<W: std::io::Write>(posts: &[Post], mut writer: W) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut writer, posts)?;
    writer.flush().map_err(ExportError::flush)?;
    Ok(())
}

/// Export posts to `path` in the given format.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn export_posts(posts: &[Post], path: &Path, format: OutputFormat) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let file = std::fs::File::create(path).map_err(io_err)?;
    let writer = std::io::BufWriter::new(file);

    let written = match format {
        OutputFormat::Csv => write_csv(posts, writer),
        OutputFormat::Json => write_json(posts, writer),
    };
    written.map_err(|e| e.at(path))?;

    info!(path = %path.display(), posts = posts.len(), "Exported posts");
    Ok(())
}
