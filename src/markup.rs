//! Parse rendered Nitter timeline HTML into raw records.

use scraper::{ElementRef, Html, Selector};

use crate::constants::TIMELINE_ITEM_SELECTOR;
use crate::models::RawRecord;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("Invalid selector")
}

struct Selectors {
    item: Selector,
    retweet_header: Selector,
    quote: Selector,
    replying_to: Selector,
    date_link: Selector,
    content: Selector,
    link: Selector,
    comment_icon: Selector,
    retweet_icon: Selector,
    like_icon: Selector,
}

static SELECTORS: std::sync::LazyLock<Selectors> = std::sync::LazyLock::new(|| Selectors {
    item: selector(TIMELINE_ITEM_SELECTOR),
    retweet_header: selector(".retweet-header"),
    quote: selector(".quote"),
    replying_to: selector(".replying-to"),
    date_link: selector(".tweet-date a"),
    content: selector(".tweet-content"),
    link: selector("a[href]"),
    // Scoped to the stats row: retweet banners carry an `.icon-retweet` too
    comment_icon: selector(".tweet-stats .icon-comment"),
    retweet_icon: selector(".tweet-stats .icon-retweet"),
    like_icon: selector(".tweet-stats .icon-heart"),
});

/// Extract every `.timeline-item` of a rendered timeline page, in document order.
///
/// Non-post rows (such as "show more" links) still produce a record; they
/// simply lack a permalink.
#[must_use]
pub fn parse_timeline(html: &str) -> Vec<RawRecord> {
    let document = Html::parse_document(html);
    document
        .select(&SELECTORS.item)
        .map(|item| parse_item(&item))
        .collect()
}

fn parse_item(item: &ElementRef) -> RawRecord {
    let s = &*SELECTORS;
    let date_link = item.select(&s.date_link).next();
    let content = item.select(&s.content).next();

    RawRecord {
        permalink: date_link.and_then(|a| a.value().attr("href")).map(ToString::to_string),
        date_title: date_link.and_then(|a| a.value().attr("title")).map(ToString::to_string),
        body: content.map(|c| element_text(&c)),
        body_links: content
            .map(|c| {
                c.select(&s.link)
                    .filter_map(|a| a.value().attr("href"))
                    .map(ToString::to_string)
                    .collect()
            })
            .unwrap_or_default(),
        comment_count: icon_counter(item, &s.comment_icon),
        retweet_count: icon_counter(item, &s.retweet_icon),
        like_count: icon_counter(item, &s.like_icon),
        has_retweet_header: item.select(&s.retweet_header).next().is_some(),
        has_quote: item.select(&s.quote).next().is_some(),
        has_replying_to: item.select(&s.replying_to).next().is_some(),
    }
}

/// Counter text rendered next to a stat icon (the icon's parent element).
fn icon_counter(item: &ElementRef, icon: &Selector) -> Option<String> {
    let icon = item.select(icon).next()?;
    let parent = icon.parent().and_then(ElementRef::wrap)?;
    Some(element_text(&parent))
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
