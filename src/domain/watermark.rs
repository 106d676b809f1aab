use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Entry;

/// Ordering key of the newest entry already delivered for a source.
///
/// Timestamps are compared when both the watermark and the entry carry one;
/// otherwise the entry link is compared against the last delivered link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watermark {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Watermark {
    pub fn at(published: DateTime<Utc>) -> Self {
        Self {
            published: Some(published),
            link: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.published.is_none() && self.link.is_none()
    }

    /// Whether `entry` is newer than everything already delivered.
    ///
    /// Entries sharing the watermark's timestamp (date-only feeds) are told
    /// apart by link.
    pub fn admits(&self, entry: &Entry) -> bool {
        if let (Some(mark), Some(at)) = (self.published, entry.published) {
            if at != mark {
                return at > mark;
            }
            return self.link.as_ref().is_some_and(|link| entry.link != *link);
        }
        match &self.link {
            Some(link) => entry.link != *link,
            None => self.published.is_none(),
        }
    }

    /// Returns the leading run of `entries` that are new.
    ///
    /// `entries` must be newest-first. The scan stops at the first entry that
    /// is not new, or whose link already appeared earlier in the scan.
    pub fn select_new(&self, entries: Vec<Entry>) -> Vec<Entry> {
        let mut seen = HashSet::new();
        entries
            .into_iter()
            .take_while(|entry| self.admits(entry) && seen.insert(entry.link.clone()))
            .collect()
    }

    /// Moves the watermark to `newest`. The timestamp never goes backwards.
    pub fn advance(&mut self, newest: &Entry) {
        self.link = Some(newest.link.clone());
        if let Some(at) = newest.published {
            self.published = Some(self.published.map_or(at, |mark| mark.max(at)));
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn entry(link: &str, offset: i64) -> Entry {
        Entry::new(link, link).published_at(t0() + Duration::hours(offset))
    }

    #[test]
    fn test_empty_admits_everything() {
        let mark = Watermark::default();
        let entries = vec![entry("c", 3), Entry::new("b", "b"), entry("a", 1)];
        assert_eq!(mark.select_new(entries.clone()), entries);
    }

    #[test]
    fn test_timestamp_prefix_strictly_newer() {
        let mark = Watermark::at(t0());
        let entries = vec![entry("c", 2), entry("b", 1), entry("a", 0), entry("z", -1)];
        let fresh = mark.select_new(entries);
        let links: Vec<_> = fresh.iter().map(|e| e.link.as_str()).collect();
        assert_eq!(links, vec!["c", "b"]);
    }

    #[test]
    fn test_same_timestamp_compared_by_link() {
        let mut mark = Watermark::default();
        let first = mark.select_new(vec![entry("y", 0), entry("x", 0)]);
        mark.advance(&first[0]);
        assert_eq!(mark.link.as_deref(), Some("y"));

        // A new item published the same day as the last one delivered.
        let fresh = mark.select_new(vec![entry("z", 0), entry("y", 0), entry("x", 0)]);
        let links: Vec<_> = fresh.iter().map(|e| e.link.as_str()).collect();
        assert_eq!(links, vec!["z"]);

        mark.advance(&fresh[0]);
        assert!(mark
            .select_new(vec![entry("z", 0), entry("y", 0)])
            .is_empty());
    }

    #[test]
    fn test_same_timestamp_without_link_is_not_new() {
        let mark = Watermark::at(t0());
        assert!(!mark.admits(&entry("a", 0)));
    }

    #[test]
    fn test_scan_stops_at_first_old_entry() {
        // A misordered feed ends the scan early; order is trusted.
        let mark = Watermark::at(t0());
        let entries = vec![entry("c", 2), entry("old", -5), entry("b", 1)];
        let fresh = mark.select_new(entries);
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].link, "c");
    }

    #[test]
    fn test_link_comparison_without_timestamps() {
        let mark = Watermark {
            published: None,
            link: Some("https://example.com/2".into()),
        };
        let entries = vec![
            Entry::new("https://example.com/4", "4"),
            Entry::new("https://example.com/3", "3"),
            Entry::new("https://example.com/2", "2"),
            Entry::new("https://example.com/1", "1"),
        ];
        let fresh = mark.select_new(entries);
        assert_eq!(fresh.len(), 2);
        assert_eq!(fresh[1].link, "https://example.com/3");
    }

    #[test]
    fn test_repeated_link_ends_scan() {
        let mark = Watermark::default();
        let entries = vec![
            Entry::new("a", "first"),
            Entry::new("b", "second"),
            Entry::new("a", "again"),
            Entry::new("c", "third"),
        ];
        assert_eq!(mark.select_new(entries).len(), 2);
    }

    #[test]
    fn test_timestamped_mark_rejects_undated_entry_without_link() {
        let mark = Watermark::at(t0());
        assert!(!mark.admits(&Entry::new("a", "a")));
    }

    #[test]
    fn test_advance_never_regresses() {
        let mut mark = Watermark::at(t0());
        mark.advance(&entry("older", -2));
        assert_eq!(mark.published, Some(t0()));
        assert_eq!(mark.link.as_deref(), Some("older"));

        mark.advance(&Entry::new("undated", "undated"));
        assert_eq!(mark.published, Some(t0()));

        mark.advance(&entry("newer", 4));
        assert_eq!(mark.published, Some(t0() + Duration::hours(4)));
    }

    #[test]
    fn test_serde_omits_empty_fields() {
        let json = serde_json::to_string(&Watermark::default()).unwrap();
        assert_eq!(json, "{}");
        let back: Watermark = serde_json::from_str(&json).unwrap();
        assert!(back.is_empty());
    }
}
