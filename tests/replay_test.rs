//! Offline scrapes over saved timeline pages.

use std::path::Path;

use chrono::{FixedOffset, TimeZone};
use nitter_scraper::config::OutputFormat;
use nitter_scraper::export::export_posts;
use nitter_scraper::language::WhatlangDetector;
use nitter_scraper::source::{load_replay_dir, PageSourceError};
use nitter_scraper::{FilterMode, Paginator};
use tempfile::TempDir;

fn item(id: &str, title: &str, body: &str, extra: &str) -> String {
    format!(
        r#"<div class="timeline-item">
             {extra}
             <span class="tweet-date"><a href="/jack/status/{id}#m" title="{title}">x</a></span>
             <div class="tweet-content media-body">{body}</div>
             <div class="tweet-stats">
               <span class="tweet-stat"><div class="icon-container"><span class="icon-comment"></span> 3</div></span>
               <span class="tweet-stat"><div class="icon-container"><span class="icon-retweet"></span> 1.5K</div></span>
               <span class="tweet-stat"><div class="icon-container"><span class="icon-heart"></span> 2,048</div></span>
             </div>
           </div>"#
    )
}

fn write_page(dir: &Path, name: &str, items: &[String]) {
    let html = format!(
        "<html><body><div class=\"timeline\">{}</div></body></html>",
        items.concat()
    );
    std::fs::write(dir.join(name), html).unwrap();
}

fn seed_pages(dir: &Path) {
    write_page(
        dir,
        "01.html",
        &[
            item(
                "100",
                "Mar 20, 2025 · 1:00 PM UTC",
                r#"The quick brown fox jumps over the lazy dog near the river bank <a href="https://example.com/fox">link</a>"#,
                "",
            ),
            item(
                "101",
                "Mar 21, 2025 · 1:00 PM UTC",
                "Shared from elsewhere",
                r#"<div class="retweet-header">jack retweeted</div>"#,
            ),
        ],
    );
    write_page(
        dir,
        "02.html",
        &[
            item(
                "100",
                "Mar 20, 2025 · 1:00 PM UTC",
                "duplicate render",
                "",
            ),
            item(
                "102",
                "Mar 22, 2025 · 9:30 AM UTC",
                r#"El rápido zorro marrón salta sobre el perro perezoso que duerme cerca del río, mientras los niños juegan en el parque con sus amigos y sus padres <a href="/search?q=%23zorro">#zorro</a>"#,
                "",
            ),
        ],
    );
    // Ignored: not an HTML page
    std::fs::write(dir.join("notes.txt"), "not a page").unwrap();
}

fn paginator(limit: u32) -> Paginator<'static> {
    let now = FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2025, 3, 24, 12, 0, 0)
        .unwrap();
    Paginator::new(limit, FilterMode::Original, &WhatlangDetector).with_reference_time(now)
}

#[tokio::test]
async fn test_replay_scrape() {
    let dir = TempDir::new().unwrap();
    seed_pages(dir.path());

    let mut source = load_replay_dir(dir.path()).await.unwrap();
    assert_eq!(source.page_count(), 2);

    let outcome = paginator(3).scrape(&mut source, "jack").await;
    let ids: Vec<_> = outcome.posts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["102", "100"]);

    let spanish = &outcome.posts[0];
    assert_eq!(spanish.language, "es");
    assert!(spanish.urls.is_empty());
    assert_eq!(spanish.engagement.retweets, 1_500);
    assert_eq!(spanish.engagement.likes, 2_048);
    assert_eq!(spanish.engagement.comments, 3);

    let english = &outcome.posts[1];
    assert_eq!(english.language, "en");
    assert_eq!(english.urls, vec!["https://example.com/fox"]);
    assert!(english.text.starts_with("The quick brown fox"));

    assert_eq!(outcome.stats.skipped.filtered_by_type, 1);
    // Page two is re-read once the last page is reached
    assert_eq!(outcome.stats.skipped.duplicate, 3);
}

#[tokio::test]
async fn test_replay_to_csv() {
    let pages = TempDir::new().unwrap();
    seed_pages(pages.path());
    let out = TempDir::new().unwrap();
    let path = out.path().join("nested").join("jack_tweets.csv");

    let mut source = load_replay_dir(pages.path()).await.unwrap();
    let outcome = paginator(2).scrape(&mut source, "jack").await;
    export_posts(&outcome.posts, &path, OutputFormat::Csv).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.get(0), Some("tweet_id"));
    assert_eq!(headers.len(), 12);

    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get(0), Some("102"));
    assert_eq!(rows[0].get(2), Some("2025-03-22 09:30:00"));
    assert_eq!(rows[1].get(11), Some(r#"["https://example.com/fox"]"#));
}

#[tokio::test]
async fn test_replay_to_json() {
    let pages = TempDir::new().unwrap();
    seed_pages(pages.path());
    let out = TempDir::new().unwrap();
    let path = out.path().join("jack_tweets.json");

    let mut source = load_replay_dir(pages.path()).await.unwrap();
    let outcome = paginator(2).scrape(&mut source, "jack").await;
    export_posts(&outcome.posts, &path, OutputFormat::Json).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let posts = value.as_array().unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0]["id"], "102");
}

#[tokio::test]
async fn test_replay_missing_dir() {
    let dir = TempDir::new().unwrap();
    let result = load_replay_dir(&dir.path().join("missing")).await;
    assert!(matches!(result, Err(PageSourceError::Io(_))));
}

#[tokio::test]
async fn test_replay_empty_dir_scrapes_nothing() {
    let dir = TempDir::new().unwrap();
    let mut source = load_replay_dir(dir.path()).await.unwrap();
    assert_eq!(source.page_count(), 0);

    let outcome = paginator(2).scrape(&mut source, "jack").await;
    assert!(outcome.posts.is_empty());
    assert_eq!(outcome.stats.failures, 2);
}
