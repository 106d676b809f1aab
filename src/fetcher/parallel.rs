use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;

use crate::app::FreshetError;
use crate::domain::{Entry, Source};
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;

/// A source that produced at least one new entry.
#[derive(Debug, Clone)]
pub struct FreshFeed {
    pub url: String,
    pub title: String,
    pub entries: Vec<Entry>,
}

#[derive(Debug)]
pub struct FetchFailure {
    pub url: String,
    pub error: FreshetError,
}

/// Outcome of one [`ParallelFetcher::fetch_all`] run.
///
/// `sources` holds every input source, updated where its fetch succeeded,
/// in input order. `fresh` and `failures` follow the same order.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub sources: Vec<Source>,
    pub fresh: Vec<FreshFeed>,
    pub failures: Vec<FetchFailure>,
}

impl FetchReport {
    pub fn attempted(&self) -> usize {
        self.sources.len()
    }

    pub fn with_new_content(&self) -> usize {
        self.fresh.len()
    }
}

pub struct ParallelFetcher {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    normalizer: Normalizer,
    workers: Option<usize>,
}

impl ParallelFetcher {
    /// Every source gets its own in-flight fetch.
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        Self {
            fetcher,
            normalizer: Normalizer::new(),
            workers: None,
        }
    }

    /// At most `workers` fetches in flight at once.
    pub fn with_workers(fetcher: Arc<dyn Fetcher + Send + Sync>, workers: usize) -> Self {
        Self {
            workers: Some(workers),
            ..Self::new(fetcher)
        }
    }

    fn permits(&self, sources: usize) -> usize {
        self.workers
            .unwrap_or(sources)
            .clamp(1, Semaphore::MAX_PERMITS)
    }

    /// Fetches every source once, concurrently, and waits for all of them.
    ///
    /// Each task owns its source while it runs and hands it back when done.
    /// One source failing never affects the others.
    pub async fn fetch_all(&self, sources: Vec<Source>) -> FetchReport {
        let semaphore = Arc::new(Semaphore::new(self.permits(sources.len())));
        let mut snapshots = Vec::with_capacity(sources.len());
        let mut handles = Vec::with_capacity(sources.len());

        for mut source in sources {
            snapshots.push(source.clone());

            let fetcher = self.fetcher.clone();
            let semaphore = semaphore.clone();
            let normalizer = self.normalizer.clone();

            handles.push(tokio::spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => source.fetch_new(fetcher.as_ref(), &normalizer).await,
                    Err(e) => Err(FreshetError::Task(e.to_string())),
                };
                (source, result)
            }));
        }

        let mut report = FetchReport::default();

        for (snapshot, joined) in snapshots.into_iter().zip(join_all(handles).await) {
            let (source, result) = match joined {
                Ok(done) => done,
                Err(e) => {
                    // The task's copy is gone; keep the pre-fetch state.
                    tracing::error!("Task join error for {}: {}", snapshot.url, e);
                    (snapshot, Err(FreshetError::Task(e.to_string())))
                }
            };

            match result {
                Ok(entries) if entries.is_empty() => {}
                Ok(entries) => {
                    tracing::info!("{} new entries from {}", entries.len(), source.url);
                    report.fresh.push(FreshFeed {
                        url: source.url.clone(),
                        title: source.title.clone(),
                        entries,
                    });
                }
                Err(error) => {
                    tracing::debug!("Fetching {} failed: {}", source.url, error);
                    report.failures.push(FetchFailure {
                        url: source.url.clone(),
                        error,
                    });
                }
            }

            report.sources.push(source);
        }

        report
    }
}
