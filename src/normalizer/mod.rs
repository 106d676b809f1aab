use chrono::Utc;
use feed_rs::parser;
use html_escape::decode_html_entities;

use crate::app::{FreshetError, Result};
use crate::domain::Entry;

#[derive(Debug, Clone)]
pub struct FeedMeta {
    pub title: Option<String>,
}

/// Turns RSS, Atom and JSON Feed documents into [`Entry`] lists.
///
/// Entries keep the order they have in the document.
#[derive(Clone)]
pub struct Normalizer;

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, body: &[u8]) -> Result<(FeedMeta, Vec<Entry>)> {
        let feed = parser::parse(body).map_err(|e| FreshetError::FeedParse(e.to_string()))?;

        let meta = FeedMeta {
            title: feed
                .title
                .map(|t| decode_html_entities(t.content.trim()).to_string()),
        };

        let entries = feed
            .entries
            .into_iter()
            .map(|entry| {
                let link = entry
                    .links
                    .first()
                    .map(|l| l.href.clone())
                    .unwrap_or(entry.id);

                Entry {
                    link,
                    title: entry
                        .title
                        .map(|t| decode_html_entities(t.content.trim()).to_string())
                        .unwrap_or_default(),
                    published: entry
                        .published
                        .or(entry.updated)
                        .map(|dt| dt.with_timezone(&Utc)),
                }
            })
            .collect();

        Ok((meta, entries))
    }
}
