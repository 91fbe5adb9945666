// src/features.rs

use crate::model::*;
use std::collections::BTreeMap;

/// Which per-repository counter a summary is taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureField {
    Languages,
    Variables,
}

impl FeatureField {
    fn counts(self, activity: &RepoActivity) -> &BTreeMap<String, u64> {
        match self {
            FeatureField::Languages => &activity.languages,
            FeatureField::Variables => &activity.variables,
        }
    }
}

/// Collapses every developer's repositories into one flat feature vector.
pub fn aggregate_features(developers: &DevelopersInfo) -> BTreeMap<DeveloperId, FeatureVector> {
    developers
        .iter()
        .map(|(developer, record)| (developer.clone(), developer_features(record)))
        .collect()
}

/// Languages and identifiers of all repositories, summed by name.
///
/// A language tag and an identifier with the same spelling share one feature.
pub fn developer_features(record: &DeveloperRecord) -> FeatureVector {
    let mut features = FeatureVector::new();
    for activity in record.values() {
        for (name, &count) in activity.languages.iter().chain(activity.variables.iter()) {
            *features.entry(name.clone()).or_insert(0) += count;
        }
    }
    features
}

pub fn sum_field(record: &DeveloperRecord, field: FeatureField) -> BTreeMap<String, u64> {
    let mut totals = BTreeMap::new();
    for activity in record.values() {
        for (name, &count) in field.counts(activity) {
            *totals.entry(name.clone()).or_insert(0) += count;
        }
    }
    totals
}

/// The `k` most frequent entries of `field`, highest count first and
/// equal counts by name ascending.
pub fn top_features(record: &DeveloperRecord, field: FeatureField, k: usize) -> TopFeatures {
    let mut entries: Vec<(String, u64)> = sum_field(record, field).into_iter().collect();
    // sum_field yields names in ascending order, so a stable sort on count keeps the tie-break
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(k);
    entries.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn activity(languages: &[(&str, u64)], variables: &[(&str, u64)]) -> RepoActivity {
        RepoActivity {
            changed_files: BTreeMap::new(),
            languages: languages.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            variables: variables.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    #[test]
    fn aggregation_sums_shared_names_and_unions_the_rest() {
        let record: DeveloperRecord = BTreeMap::from([
            ("repo-a".to_string(), activity(&[("Python", 3)], &[("foo", 2), ("bar", 1)])),
            ("repo-b".to_string(), activity(&[("Python", 1), ("Go", 4)], &[("foo", 5)])),
        ]);

        let features = developer_features(&record);
        assert_eq!(
            features,
            FeatureVector::from([
                ("Go".to_string(), 4),
                ("Python".to_string(), 4),
                ("bar".to_string(), 1),
                ("foo".to_string(), 7),
            ])
        );
    }

    #[test]
    fn aggregation_keeps_developers_without_features() {
        let developers: DevelopersInfo = BTreeMap::from([
            ("empty@x.com".to_string(), BTreeMap::from([("r".to_string(), RepoActivity::default())])),
            ("none@x.com".to_string(), DeveloperRecord::new()),
        ]);
        let aggregated = aggregate_features(&developers);
        assert_eq!(aggregated.len(), 2);
        assert!(aggregated.values().all(|v| v.is_empty()));
    }

    #[test]
    fn aggregation_does_not_prune_rare_identifiers() {
        let record = BTreeMap::from([("r".to_string(), activity(&[], &[("once", 1)]))]);
        assert_eq!(developer_features(&record)["once"], 1);
    }

    #[test]
    fn top_features_orders_by_count_then_name() {
        let record = BTreeMap::from([
            ("r1".to_string(), activity(&[], &[("b", 2), ("a", 2), ("z", 9)])),
            ("r2".to_string(), activity(&[], &[("c", 2), ("d", 1)])),
        ]);

        let top = top_features(&record, FeatureField::Variables, 3);
        let ordered: Vec<(&str, u64)> = top.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(ordered, vec![("z", 9), ("a", 2), ("b", 2)]);
    }

    #[test]
    fn top_features_respects_the_bound() {
        let record = BTreeMap::from([(
            "r".to_string(),
            activity(&[("Rust", 5), ("Go", 3), ("C", 1)], &[]),
        )]);

        assert!(top_features(&record, FeatureField::Languages, 0).is_empty());
        let top = top_features(&record, FeatureField::Languages, 2);
        assert_eq!(top.len(), 2);
        let all = sum_field(&record, FeatureField::Languages);
        let min_included = top.values().min().copied().unwrap();
        let max_excluded = all
            .iter()
            .filter(|(name, _)| !top.contains_key(*name))
            .map(|(_, &count)| count)
            .max()
            .unwrap();
        assert!(min_included >= max_excluded);
        assert!(!top.contains_key("C"));
        assert_eq!(top_features(&record, FeatureField::Languages, 10).len(), 3);
    }
}
