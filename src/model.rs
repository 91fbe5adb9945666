// src/model.rs

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Uniquely identifies a developer (the commit author's e-mail)
pub type DeveloperId = String;

/// Identifies a repository by the path or URL it was read from
pub type RepoId = String;

/// Lines touched in one file, summed over every commit of one developer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChurn {
    pub added: u64,
    pub deleted: u64,
}

/// What one developer did in one repository.
///
/// All three maps are required when reading a persisted document, so a
/// record produced by a broken extraction fails to load instead of being
/// treated as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoActivity {
    pub changed_files: BTreeMap<String, FileChurn>,
    /// Language tag -> number of touched files with content in that language
    pub languages: BTreeMap<String, u64>,
    /// Source identifier -> number of occurrences in touched files
    pub variables: BTreeMap<String, u64>,
}

/// All repositories a developer has committed to
pub type DeveloperRecord = BTreeMap<RepoId, RepoActivity>;

/// The whole extraction result, keyed by developer
pub type DevelopersInfo = BTreeMap<DeveloperId, DeveloperRecord>;

/// Flat feature name -> count mapping of one developer across all repositories
pub type FeatureVector = BTreeMap<String, u64>;

/// Top-k features, kept in ranking order (count desc, name asc)
pub type TopFeatures = IndexMap<String, u64>;

/// One entry of a similarity ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarDeveloper {
    pub developer: DeveloperId,
    pub similarity: f64,
    pub top_languages: TopFeatures,
    pub top_identifiers: TopFeatures,
}

impl RepoActivity {
    pub fn record_churn(&mut self, path: &str, added: u64, deleted: u64) {
        let churn = self.changed_files.entry(path.to_string()).or_default();
        churn.added += added;
        churn.deleted += deleted;
    }

    pub fn record_language(&mut self, language: &str) {
        *self.languages.entry(language.to_string()).or_insert(0) += 1;
    }

    pub fn record_identifiers(&mut self, identifiers: BTreeMap<String, u64>) {
        for (name, count) in identifiers {
            *self.variables.entry(name).or_insert(0) += count;
        }
    }

    /// Folds another activity record for the same developer and repository into this one
    pub fn merge(&mut self, other: RepoActivity) {
        for (path, churn) in other.changed_files {
            self.record_churn(&path, churn.added, churn.deleted);
        }
        for (language, count) in other.languages {
            *self.languages.entry(language).or_insert(0) += count;
        }
        self.record_identifiers(other.variables);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn churn_accumulates_per_path() {
        let mut activity = RepoActivity::default();
        activity.record_churn("src/lib.rs", 10, 2);
        activity.record_churn("src/lib.rs", 3, 4);
        activity.record_churn("README.md", 1, 0);

        assert_eq!(activity.changed_files["src/lib.rs"], FileChurn { added: 13, deleted: 6 });
        assert_eq!(activity.changed_files["README.md"], FileChurn { added: 1, deleted: 0 });
    }

    #[test]
    fn identifiers_accumulate_instead_of_overwriting() {
        let mut activity = RepoActivity::default();
        activity.record_identifiers(BTreeMap::from([("foo".to_string(), 2), ("bar".to_string(), 1)]));
        activity.record_identifiers(BTreeMap::from([("foo".to_string(), 5)]));

        assert_eq!(activity.variables["foo"], 7);
        assert_eq!(activity.variables["bar"], 1);
    }

    #[test]
    fn merge_sums_every_field() {
        let mut left = RepoActivity::default();
        left.record_churn("a.py", 1, 1);
        left.record_language("Python");

        let mut right = RepoActivity::default();
        right.record_churn("a.py", 2, 0);
        right.record_language("Python");
        right.record_identifiers(BTreeMap::from([("x".to_string(), 3)]));

        left.merge(right);
        assert_eq!(left.changed_files["a.py"], FileChurn { added: 3, deleted: 1 });
        assert_eq!(left.languages["Python"], 2);
        assert_eq!(left.variables["x"], 3);
    }

    #[test]
    fn missing_fields_fail_to_deserialize() {
        let document = r#"{"dev@x.com": {"repo": {"changed_files": {}, "languages": {}}}}"#;
        let parsed: serde_json::Result<DevelopersInfo> = serde_json::from_str(document);
        assert!(parsed.is_err());

        let complete = r#"{"dev@x.com": {"repo": {"changed_files": {}, "languages": {"Go": 1}, "variables": {}}}}"#;
        let parsed: DevelopersInfo = serde_json::from_str(complete).unwrap();
        assert_eq!(parsed["dev@x.com"]["repo"].languages["Go"], 1);
    }
}
