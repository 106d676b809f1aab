use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{FreshetError, LoadError, Result};
use crate::config::Config;
use crate::fetcher::http_fetcher::HttpFetcher;
use crate::fetcher::parallel::ParallelFetcher;
use crate::fetcher::Fetcher;
use crate::store::SourceStore;

/// Everything one invocation needs, built from an explicit [`Config`].
pub struct AppContext {
    pub store_path: PathBuf,
    pub parallel_fetcher: ParallelFetcher,
}

impl AppContext {
    pub fn new(config: &Config) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(&config.fetch)?);
        Self::with_fetcher(config, fetcher)
    }

    pub fn with_fetcher(config: &Config, fetcher: Arc<dyn Fetcher + Send + Sync>) -> Result<Self> {
        let store_path = config
            .resolve_store_path()
            .map_err(|e| FreshetError::Config(e.to_string()))?;
        let parallel_fetcher = match config.fetch.workers {
            Some(workers) => ParallelFetcher::with_workers(fetcher, workers),
            None => ParallelFetcher::new(fetcher),
        };

        Ok(Self {
            store_path,
            parallel_fetcher,
        })
    }

    pub fn load_store(&self) -> std::result::Result<SourceStore, LoadError> {
        SourceStore::load(&self.store_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::testing::StaticFetcher;

    #[test]
    fn test_huge_worker_limit_builds() {
        let mut config = Config {
            store_path: Some(PathBuf::from("/tmp/freshet-sources.jsonl")),
            ..Config::default()
        };
        config.fetch.workers = Some(usize::MAX);

        let ctx = AppContext::with_fetcher(&config, Arc::new(StaticFetcher::new())).unwrap();
        assert_eq!(ctx.store_path, PathBuf::from("/tmp/freshet-sources.jsonl"));
    }
}
