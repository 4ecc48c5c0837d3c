use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nitter_scraper::config::Config;
use nitter_scraper::export::{export_posts, CSV_TIMESTAMP_FORMAT};
use nitter_scraper::language::WhatlangDetector;
use nitter_scraper::source::{load_replay_dir, ChromiumPageSource};
use nitter_scraper::{Paginator, Post, ScrapeOutcome};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    let config = Config::from_env(std::env::args().nth(1)).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(
        username = %config.username,
        advances = config.advance_limit,
        filter_mode = %config.filter_mode,
        "Configuration loaded"
    );

    let detector = WhatlangDetector;
    let paginator = Paginator::new(config.advance_limit, config.filter_mode, &detector);

    let outcome = if let Some(ref dir) = config.replay_dir {
        info!(dir = %dir.display(), "Replaying saved timeline pages");
        let mut source = load_replay_dir(dir)
            .await
            .with_context(|| format!("Failed to load replay pages from {}", dir.display()))?;
        paginator.scrape(&mut source, &config.username).await
    } else {
        let mut source = ChromiumPageSource::open(config.browser_options(), &config.timeline_url())
            .await
            .context("Failed to open timeline in browser")?;

        let result = tokio::select! {
            outcome = paginator.scrape(&mut source, &config.username) => Some(outcome),
            () = shutdown_signal() => None,
        };
        source.close().await;

        let Some(outcome) = result else {
            warn!("Interrupted, no posts exported");
            return Ok(());
        };
        outcome
    };

    let path = config.output_path();
    export_posts(&outcome.posts, &path, config.output_format)
        .with_context(|| format!("Failed to export posts to {}", path.display()))?;

    print_summary(&config.username, &outcome);
    println!("\nTweets exported to {}", path.display());

    Ok(())
}

fn print_summary(username: &str, outcome: &ScrapeOutcome) {
    let stats = &outcome.stats;
    info!(
        posts = stats.posts,
        records = stats.records_seen,
        load_more = stats.load_more_advances,
        scrolls = stats.scroll_advances,
        failures = stats.failures,
        duplicates = stats.skipped.duplicate,
        filtered = stats.skipped.filtered_by_type,
        "Scrape summary"
    );

    println!("\nScraped {} tweets from @{username}:", outcome.posts.len());
    for (i, post) in outcome.posts.iter().enumerate() {
        print_post(i + 1, post);
    }
}

fn print_post(index: usize, post: &Post) {
    println!(
        "\n{index}. [{}] [ID: {}] [{}] [{}]",
        post.kind().label(),
        post.id,
        post.created_at.format(CSV_TIMESTAMP_FORMAT),
        post.language
    );
    println!("   Text: {}", post.text);
    println!(
        "   Engagement: {} comments, {} RTs, {} likes",
        post.engagement.comments, post.engagement.retweets, post.engagement.likes
    );
    if !post.urls.is_empty() {
        println!("   URLs: {}", post.urls.join(", "));
    }
}

fn init_tracing() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,nitter_scraper=debug"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    // Logs go to stderr so the post listing on stdout stays clean
    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
