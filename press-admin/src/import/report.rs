//! Import batch report

use serde::{Deserialize, Serialize};

use super::store::Collection;

/// Outcome counters for one import batch
///
/// Built up item by item and returned once the whole batch has run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported_posts: u32,
    pub imported_pages: u32,
    pub skipped: u32,
    pub errors: Vec<String>,
}

impl ImportReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_imported(&mut self, collection: Collection) {
        match collection {
            Collection::Posts => self.imported_posts += 1,
            Collection::Pages => self.imported_pages += 1,
        }
    }

    /// Item lacked a title, body or usable slug
    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    /// Item failed while being stored; counted as skipped with its message kept
    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.skipped += 1;
        self.errors.push(message.into());
    }

    pub fn total_imported(&self) -> u32 {
        self.imported_posts + self.imported_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let mut report = ImportReport::new();
        report.record_imported(Collection::Posts);
        report.record_imported(Collection::Pages);
        report.record_imported(Collection::Posts);
        report.record_skipped();
        report.record_failure("boom");

        assert_eq!(report.imported_posts, 2);
        assert_eq!(report.imported_pages, 1);
        assert_eq!(report.total_imported(), 3);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.errors, vec!["boom".to_string()]);
    }

    #[test]
    fn test_serializes_camel_case() {
        let report = ImportReport {
            imported_posts: 1,
            imported_pages: 2,
            skipped: 3,
            errors: vec!["e".into()],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "importedPosts": 1,
                "importedPages": 2,
                "skipped": 3,
                "errors": ["e"],
            })
        );
    }
}
