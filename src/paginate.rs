//! Pagination driver.
//!
//! The driver repeatedly loads the currently rendered timeline, extracts every
//! record, and then advances the page. Advancing prefers the "load more"
//! control and falls back to scrolling to the bottom. Every iteration, whether
//! it succeeded or failed, consumes one unit of the advance budget; the loop
//! ends only when the budget is spent (or an observer asks it to stop).

use std::fmt;
use std::ops::ControlFlow;

use chrono::{DateTime, FixedOffset, Local};
use tracing::{debug, info, warn};

use crate::extract::SkipCounts;
use crate::language::LanguageDetector;
use crate::models::{FilterMode, Post, RawRecord};
use crate::session::Session;
use crate::source::PageSource;

/// How an iteration advanced the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceStrategy {
    LoadMore,
    Scroll,
}

impl fmt::Display for AdvanceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadMore => f.write_str("load_more"),
            Self::Scroll => f.write_str("scroll"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IterationOutcome {
    Advanced(AdvanceStrategy),
    /// Loading or advancing failed; the iteration still counts.
    Failed(String),
}

/// Summary of one driver iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationReport {
    /// Number of advances consumed including this one.
    pub advance: u32,
    pub records: usize,
    /// Posts this iteration added. Zero is the only "no new content" signal.
    pub new_posts: usize,
    pub skipped: SkipCounts,
    pub outcome: IterationOutcome,
}

/// Hook invoked after every iteration.
///
/// Returning `ControlFlow::Break` stops the driver before its budget is
/// spent. The default implementation always continues.
pub trait IterationObserver: Send {
    fn on_iteration(&mut self, _report: &IterationReport) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

impl IterationObserver for () {}

/// Aggregate counters for a finished scrape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeStats {
    pub iterations: u32,
    pub failures: u32,
    pub load_more_advances: u32,
    pub scroll_advances: u32,
    pub records_seen: usize,
    pub posts: usize,
    pub skipped: SkipCounts,
    pub stopped_early: bool,
}

/// Posts newest first, plus counters.
#[derive(Debug, Clone)]
pub struct ScrapeOutcome {
    pub posts: Vec<Post>,
    pub stats: ScrapeStats,
}

#[derive(Debug, Default)]
struct IterationProgress {
    records: usize,
    new_posts: usize,
    skipped: SkipCounts,
}

enum DriverState {
    Loading,
    Extracting(Vec<RawRecord>),
    Advancing(IterationProgress),
    Done,
}

/// Drives a [`PageSource`] through a fixed number of advances.
pub struct Paginator<'a> {
    advance_limit: u32,
    filter_mode: FilterMode,
    detector: &'a dyn LanguageDetector,
    reference_time: Option<DateTime<FixedOffset>>,
}

impl<'a> Paginator<'a> {
    #[must_use]
    pub fn new(
        advance_limit: u32,
        filter_mode: FilterMode,
        detector: &'a dyn LanguageDetector,
    ) -> Self {
        Self {
            advance_limit,
            filter_mode,
            detector,
            reference_time: None,
        }
    }

    /// Pin the "now" used for relative dates instead of reading the clock.
    #[must_use]
    pub fn with_reference_time(mut self, now: DateTime<FixedOffset>) -> Self {
        self.reference_time = Some(now);
        self
    }

    fn now(&self) -> DateTime<FixedOffset> {
        self.reference_time
            .unwrap_or_else(|| Local::now().fixed_offset())
    }

    /// Scrape with a fresh session for `username` and no observer.
    pub async fn scrape<S>(&self, source: &mut S, username: &str) -> ScrapeOutcome
    where
        S: PageSource + ?Sized,
    {
        self.run(source, Session::new(username), &mut ()).await
    }

    /// Run the driver to completion, consuming the session.
    pub async fn run<S>(
        &self,
        source: &mut S,
        mut session: Session,
        observer: &mut dyn IterationObserver,
    ) -> ScrapeOutcome
    where
        S: PageSource + ?Sized,
    {
        let mut stats = ScrapeStats::default();
        let mut state = DriverState::Loading;

        info!(
            username = %session.username(),
            advance_limit = self.advance_limit,
            filter_mode = %self.filter_mode,
            "Starting scrape"
        );

        loop {
            state = match state {
                DriverState::Loading if stats.iterations >= self.advance_limit => DriverState::Done,
                DriverState::Loading => match source.fetch_batch().await {
                    Ok(records) => DriverState::Extracting(records),
                    Err(e) => {
                        warn!(advance = stats.iterations + 1, error = %e, "Failed to load timeline batch");
                        self.complete_iteration(
                            &mut stats,
                            IterationProgress::default(),
                            IterationOutcome::Failed(e.to_string()),
                            observer,
                        )
                    }
                },
                DriverState::Extracting(records) => {
                    let (new_posts, skipped) =
                        session.ingest(&records, self.filter_mode, self.detector, self.now());
                    DriverState::Advancing(IterationProgress {
                        records: records.len(),
                        new_posts,
                        skipped,
                    })
                }
                DriverState::Advancing(progress) => {
                    let outcome = advance(source).await;
                    self.complete_iteration(&mut stats, progress, outcome, observer)
                }
                DriverState::Done => break,
            };
        }

        let posts = session.into_sorted_posts();
        stats.posts = posts.len();

        info!(
            posts = stats.posts,
            iterations = stats.iterations,
            failures = stats.failures,
            skipped = stats.skipped.total(),
            "Scrape finished"
        );

        ScrapeOutcome { posts, stats }
    }

    fn complete_iteration(
        &self,
        stats: &mut ScrapeStats,
        progress: IterationProgress,
        outcome: IterationOutcome,
        observer: &mut dyn IterationObserver,
    ) -> DriverState {
        stats.iterations += 1;
        stats.records_seen += progress.records;
        stats.skipped.merge(&progress.skipped);
        match outcome {
            IterationOutcome::Advanced(AdvanceStrategy::LoadMore) => stats.load_more_advances += 1,
            IterationOutcome::Advanced(AdvanceStrategy::Scroll) => stats.scroll_advances += 1,
            IterationOutcome::Failed(_) => stats.failures += 1,
        }

        let report = IterationReport {
            advance: stats.iterations,
            records: progress.records,
            new_posts: progress.new_posts,
            skipped: progress.skipped,
            outcome,
        };

        debug!(
            advance = report.advance,
            records = report.records,
            new_posts = report.new_posts,
            skipped = report.skipped.total(),
            outcome = ?report.outcome,
            "Iteration complete"
        );

        if observer.on_iteration(&report).is_break() {
            info!(advance = report.advance, "Observer stopped scrape early");
            stats.stopped_early = true;
            return DriverState::Done;
        }

        if stats.iterations >= self.advance_limit {
            DriverState::Done
        } else {
            DriverState::Loading
        }
    }
}

/// Try "load more" first, then fall back to scrolling.
async fn advance<S>(source: &mut S) -> IterationOutcome
where
    S: PageSource + ?Sized,
{
    match source.activate_load_more().await {
        Ok(true) => return IterationOutcome::Advanced(AdvanceStrategy::LoadMore),
        Ok(false) => debug!("No load-more control, scrolling to bottom"),
        Err(e) => debug!(error = %e, "Load-more activation failed, scrolling to bottom"),
    }

    match source.scroll_to_bottom().await {
        Ok(()) => IterationOutcome::Advanced(AdvanceStrategy::Scroll),
        Err(e) => {
            warn!(error = %e, "Failed to scroll timeline");
            IterationOutcome::Failed(e.to_string())
        }
    }
}

/// Observer that stops after a number of consecutive iterations without new posts.
///
/// Not used by default: the mirror gives no reliable end-of-timeline signal,
/// so an empty iteration may just be a slow render.
#[derive(Debug, Clone)]
pub struct StopWhenIdle {
    patience: u32,
    idle: u32,
}

impl StopWhenIdle {
    #[must_use]
    pub fn new(patience: u32) -> Self {
        Self { patience, idle: 0 }
    }
}

impl IterationObserver for StopWhenIdle {
    fn on_iteration(&mut self, report: &IterationReport) -> ControlFlow<()> {
        if report.new_posts > 0 {
            self.idle = 0;
        } else {
            self.idle += 1;
        }
        if self.patience > 0 && self.idle >= self.patience {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}
