//! # Freshet
//!
//! Tracks a list of RSS/Atom feeds and prints only what is new in each of
//! them since the previous fetch.
//!
//! ## Architecture
//!
//! ```text
//! SourceStore → ParallelFetcher → Source::fetch_new (Fetcher → Normalizer → Watermark) → SourceStore
//! ```
//!
//! - [`store`]: the source list, persisted as JSON lines
//! - [`fetcher`]: HTTP transport and the concurrent fan-out over all sources
//! - [`normalizer`]: feed parsing
//! - [`domain`]: sources, entries and watermarks
//!
//! ## Quick Start
//!
//! ```bash
//! freshet add https://blog.rust-lang.org/feed.xml
//! freshet list
//! freshet fetch
//! ```

/// Application context and error handling.
pub mod app;

/// Command-line interface using clap.
///
/// - `add <url>...` - Start tracking feeds
/// - `delete <url>...` - Stop tracking feeds
/// - `list` - List tracked feeds
/// - `fetch` - Print new entries from every feed
pub mod cli;

/// Configuration loaded from `~/.config/freshet/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`Source`](domain::Source): a tracked feed with its watermark
/// - [`Entry`](domain::Entry): one feed item
/// - [`Watermark`](domain::Watermark): what has already been delivered
pub mod domain;

/// HTTP fetching with conditional request support.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for feed fetching
/// - [`HttpFetcher`](fetcher::http_fetcher::HttpFetcher): reqwest-based implementation
/// - [`ParallelFetcher`](fetcher::parallel::ParallelFetcher): one task per source, bounded by a semaphore
pub mod fetcher;

/// Feed parsing.
///
/// Converts RSS 0.9x/1.0/2.0, Atom 0.3/1.0, and JSON Feed 1.0
/// into [`Entry`](domain::Entry) lists.
pub mod normalizer;

/// Source list persistence.
pub mod store;
