use serde::{Deserialize, Serialize};

use crate::app::Result;
use crate::domain::{Entry, Watermark};
use crate::fetcher::{FetchResult, Fetcher};
use crate::normalizer::Normalizer;

/// A tracked feed and what has already been delivered from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub watermark: Watermark,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

impl Source {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            watermark: Watermark::default(),
            etag: None,
            last_modified: None,
        }
    }

    pub fn display_title(&self) -> &str {
        let title = self.title.trim();
        if title.is_empty() {
            &self.url
        } else {
            title
        }
    }

    /// Fetches the feed and returns the entries newer than the watermark,
    /// newest first.
    ///
    /// On success the cached title, the HTTP validators and (when anything
    /// new was found) the watermark are updated. On error nothing changes.
    pub async fn fetch_new(
        &mut self,
        fetcher: &(dyn Fetcher + Send + Sync),
        normalizer: &Normalizer,
    ) -> Result<Vec<Entry>> {
        let result = fetcher
            .fetch(&self.url, self.etag.as_deref(), self.last_modified.as_deref())
            .await?;

        let (body, etag, last_modified) = match result {
            FetchResult::NotModified => {
                tracing::debug!("Feed {} not modified", self.url);
                return Ok(Vec::new());
            }
            FetchResult::Content {
                body,
                etag,
                last_modified,
            } => (body, etag, last_modified),
        };

        let (meta, entries) = normalizer.normalize(&body)?;
        let fresh = self.watermark.select_new(entries);

        self.title = meta.title.unwrap_or_default();
        if let Some(newest) = fresh.first() {
            self.watermark.advance(newest);
        }
        self.etag = etag;
        self.last_modified = last_modified;

        tracing::debug!("{} new entries from {}", fresh.len(), self.url);
        Ok(fresh)
    }
}
