use url::Url;

use crate::app::{AppContext, Result};
use crate::fetcher::parallel::FreshFeed;
use crate::store::SourceStore;

/// Counts reported at the end of a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSummary {
    pub attempted: usize,
    pub with_new_content: usize,
    pub failed: usize,
}

/// Loads the source list, applying the `--salvage` policy on damage.
fn open_store(ctx: &AppContext, salvage: bool) -> Result<SourceStore> {
    match ctx.load_store() {
        Ok(store) => Ok(store),
        Err(err) if salvage => {
            eprintln!(
                "warning: {}; continuing with {} readable sources",
                err,
                err.partial.len()
            );
            Ok(SourceStore::recover(err))
        }
        Err(err) => Err(err.into()),
    }
}

pub fn add_sources(ctx: &AppContext, urls: &[String], salvage: bool) -> Result<usize> {
    for url in urls {
        Url::parse(url)?;
    }

    let mut store = open_store(ctx, salvage)?;
    let mut added = 0;
    for url in urls {
        if store.add_source(url) {
            println!("Added feed: {}", url);
            added += 1;
        } else {
            println!("Feed already exists: {}", url);
        }
    }

    store.save()?;
    Ok(added)
}

pub fn delete_sources(ctx: &AppContext, urls: &[String], salvage: bool) -> Result<usize> {
    let mut store = open_store(ctx, salvage)?;
    let mut removed = 0;
    for url in urls {
        match store.delete_source(url) {
            0 => println!("Feed not found: {}", url),
            n => {
                println!("Removed feed: {}", url);
                removed += n;
            }
        }
    }

    store.save()?;
    Ok(removed)
}

pub fn list_sources(ctx: &AppContext) -> Result<()> {
    // Listing never writes, so a damaged file is shown as far as it reads.
    let store = open_store(ctx, true)?;

    for source in store.sources() {
        if source.title.trim().is_empty() {
            println!("{}", source.url);
        } else {
            println!("{}\t{}", source.url, source.title.trim());
        }
    }

    Ok(())
}

pub async fn fetch_sources(ctx: &AppContext, salvage: bool) -> Result<FetchSummary> {
    let mut store = open_store(ctx, salvage)?;

    let report = ctx.parallel_fetcher.fetch_all(store.take_sources()).await;

    for feed in &report.fresh {
        print!("{}", render_feed(feed));
    }
    for failure in &report.failures {
        eprintln!("warning: {}: {}", failure.url, failure.error);
    }

    let summary = FetchSummary {
        attempted: report.attempted(),
        with_new_content: report.with_new_content(),
        failed: report.failures.len(),
    };
    println!(
        "\nparsed {} feeds, {} with new contents",
        summary.attempted, summary.with_new_content
    );

    store.restore_sources(report.sources);
    store.save()?;
    Ok(summary)
}

/// Markdown-ish block: feed title, then one ` - [title](link)` line per entry.
pub fn render_feed(feed: &FreshFeed) -> String {
    let title = match feed.title.trim() {
        "" => "[nameless feed]",
        title => title,
    };

    let mut out = format!("\n{}\n", title);
    for entry in &feed.entries {
        out.push_str(&format!(" - [{}]({})\n", entry.display_title(), entry.link));
    }
    out
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use chrono::{Duration, TimeZone, Utc};
    use tempfile::TempDir;

    use super::*;
    use crate::app::FreshetError;
    use crate::config::Config;
    use crate::domain::Entry;
    use crate::fetcher::testing::{rss, StaticFetcher};

    const FEED: &str = "https://example.com/feed";
    const DEAD: &str = "https://dead.example.com/feed";

    fn context(dir: &TempDir, fetcher: StaticFetcher) -> AppContext {
        let config = Config {
            store_path: Some(dir.path().join("sources.jsonl")),
            ..Config::default()
        };
        AppContext::with_fetcher(&config, Arc::new(fetcher)).unwrap()
    }

    fn example_feed() -> String {
        let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        rss(
            "Example",
            &[
                ("C", "https://example.com/c", Some(t0 + Duration::hours(3))),
                ("B", "https://example.com/b", Some(t0 + Duration::hours(2))),
                ("A", "https://example.com/a", Some(t0 + Duration::hours(1))),
            ],
        )
    }

    #[test]
    fn test_render_feed() {
        let feed = FreshFeed {
            url: FEED.into(),
            title: "  ".into(),
            entries: vec![
                Entry::new("https://example.com/2", "Second"),
                Entry::new("https://example.com/1", ""),
            ],
        };
        assert_eq!(
            render_feed(&feed),
            "\n[nameless feed]\n - [Second](https://example.com/2)\n - [(Untitled)](https://example.com/1)\n"
        );
    }

    #[test]
    fn test_add_rejects_invalid_url_without_saving() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, StaticFetcher::new());

        let err = add_sources(&ctx, &[FEED.into(), "not a url".into()], false).unwrap_err();
        assert!(matches!(err, FreshetError::InvalidUrl(_)));
        assert!(!ctx.store_path.exists());
    }

    #[test]
    fn test_add_then_delete() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, StaticFetcher::new());

        assert_eq!(add_sources(&ctx, &[FEED.into(), FEED.into()], false).unwrap(), 1);
        assert_eq!(ctx.load_store().unwrap().len(), 1);

        assert_eq!(delete_sources(&ctx, &[FEED.into()], false).unwrap(), 1);
        assert!(ctx.load_store().unwrap().is_empty());
    }

    #[test]
    fn test_damaged_store_needs_salvage() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, StaticFetcher::new());
        fs::write(
            &ctx.store_path,
            format!("{{\"url\":\"{FEED}\"}}\n{{broken\n"),
        )
        .unwrap();

        let err = add_sources(&ctx, &[DEAD.into()], false).unwrap_err();
        assert!(matches!(err, FreshetError::Load(_)));

        assert_eq!(add_sources(&ctx, &[DEAD.into()], true).unwrap(), 1);
        let urls: Vec<_> = ctx
            .load_store()
            .unwrap()
            .sources()
            .iter()
            .map(|s| s.url.clone())
            .collect();
        assert_eq!(urls, vec![FEED.to_string(), DEAD.to_string()]);
    }

    #[tokio::test]
    async fn test_fetch_persists_watermarks() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir, StaticFetcher::new().with_body(FEED, example_feed()));
        add_sources(&ctx, &[FEED.into(), DEAD.into()], false).unwrap();

        let first = fetch_sources(&ctx, false).await.unwrap();
        assert_eq!(
            first,
            FetchSummary {
                attempted: 2,
                with_new_content: 1,
                failed: 1,
            }
        );

        let store = ctx.load_store().unwrap();
        assert_eq!(store.sources()[0].title, "Example");
        assert_eq!(
            store.sources()[0].watermark.link.as_deref(),
            Some("https://example.com/c")
        );
        assert!(store.sources()[1].watermark.is_empty());

        let second = fetch_sources(&ctx, false).await.unwrap();
        assert_eq!(second.with_new_content, 0);
        assert_eq!(ctx.load_store().unwrap().sources(), store.sources());
    }
}
