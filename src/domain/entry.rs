use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One item of a parsed feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub link: String,
    pub title: String,
    pub published: Option<DateTime<Utc>>,
}

impl Entry {
    pub fn new(link: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            title: title.into(),
            published: None,
        }
    }

    pub fn published_at(mut self, at: DateTime<Utc>) -> Self {
        self.published = Some(at);
        self
    }

    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "(Untitled)"
        } else {
            self.title.trim()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_title_with_title() {
        let entry = Entry::new("https://example.com/a", "  My Article ");
        assert_eq!(entry.display_title(), "My Article");
    }

    #[test]
    fn test_display_title_without_title() {
        let entry = Entry::new("https://example.com/a", "");
        assert_eq!(entry.display_title(), "(Untitled)");
    }
}
