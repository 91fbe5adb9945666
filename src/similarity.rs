// src/similarity.rs

use crate::error::{Result, SimDevError};
use crate::features::{aggregate_features, top_features, FeatureField};
use crate::model::*;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub const DEFAULT_SIMILAR_DEVELOPERS_NUMBER: usize = 15;
pub const DEFAULT_PARAMETERS_TOP_SIZE: usize = 15;

/// Ordered set of feature names with a name -> column lookup
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// Every distinct feature name of every vector, in lexicographic order
    pub fn build<'a>(vectors: impl IntoIterator<Item = &'a FeatureVector>) -> Self {
        let distinct: BTreeSet<&String> = vectors.into_iter().flat_map(|v| v.keys()).collect();
        let names: Vec<String> = distinct.into_iter().cloned().collect();
        let index = names.iter().enumerate().map(|(i, name)| (name.clone(), i)).collect();
        Vocabulary { names, index }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Developers' feature vectors aligned on one shared column space.
/// Row `i` belongs to `row_ids[i]`; absent features are 0.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    pub vocabulary: Vocabulary,
    pub row_ids: Vec<DeveloperId>,
    pub rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn build(features: &BTreeMap<DeveloperId, FeatureVector>) -> Self {
        let vocabulary = Vocabulary::build(features.values());
        let mut row_ids = Vec::with_capacity(features.len());
        let mut rows = Vec::with_capacity(features.len());

        for (developer, vector) in features {
            let mut row = vec![0.0; vocabulary.len()];
            for (name, &count) in vector {
                if let Some(column) = vocabulary.index_of(name) {
                    row[column] = count as f64;
                }
            }
            row_ids.push(developer.clone());
            rows.push(row);
        }

        FeatureMatrix { vocabulary, row_ids, rows }
    }

    pub fn row_of(&self, developer: &str) -> Option<usize> {
        self.row_ids.iter().position(|id| id == developer)
    }
}

/// Cosine of the angle between `u` and `v`; 0 when either has zero norm.
pub fn cosine_similarity(u: &[f64], v: &[f64]) -> f64 {
    let dot: f64 = u.iter().zip(v).map(|(a, b)| a * b).sum();
    let norm_u = u.iter().map(|a| a * a).sum::<f64>().sqrt();
    let norm_v = v.iter().map(|b| b * b).sum::<f64>().sqrt();

    if norm_u == 0.0 || norm_v == 0.0 {
        return 0.0;
    }
    (dot / (norm_u * norm_v)).clamp(-1.0, 1.0)
}

/// Every developer other than `query`, most similar first, cut to `limit`.
/// Equal scores keep matrix row order.
pub fn rank_similar(matrix: &FeatureMatrix, query: &str, limit: usize) -> Result<Vec<(DeveloperId, f64)>> {
    let query_row = matrix
        .row_of(query)
        .ok_or_else(|| SimDevError::UnknownDeveloper(query.to_string()))?;
    let query_vector = &matrix.rows[query_row];

    let mut scored: Vec<(usize, f64)> = matrix
        .rows
        .par_iter()
        .enumerate()
        .filter(|(i, _)| *i != query_row)
        .map(|(i, row)| (i, cosine_similarity(query_vector, row)))
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    scored.truncate(limit);

    Ok(scored
        .into_iter()
        .map(|(i, score)| (matrix.row_ids[i].clone(), score))
        .collect())
}

/// Ranks developers by coding-habit similarity to a given one
#[derive(Debug, Clone, Copy)]
pub struct SimilarDevelopersFinder {
    pub similar_developers_number: usize,
    pub parameters_top_size: usize,
}

impl Default for SimilarDevelopersFinder {
    fn default() -> Self {
        SimilarDevelopersFinder {
            similar_developers_number: DEFAULT_SIMILAR_DEVELOPERS_NUMBER,
            parameters_top_size: DEFAULT_PARAMETERS_TOP_SIZE,
        }
    }
}

impl SimilarDevelopersFinder {
    pub fn new(similar_developers_number: usize, parameters_top_size: usize) -> Self {
        SimilarDevelopersFinder {
            similar_developers_number,
            parameters_top_size,
        }
    }

    pub fn find(&self, developers: &DevelopersInfo, query: &str) -> Result<Vec<SimilarDeveloper>> {
        if !developers.contains_key(query) {
            return Err(SimDevError::UnknownDeveloper(query.to_string()));
        }

        let features = aggregate_features(developers);
        let matrix = FeatureMatrix::build(&features);
        tracing::debug!(
            developers = matrix.row_ids.len(),
            features = matrix.vocabulary.len(),
            "Built feature matrix"
        );

        let ranked = rank_similar(&matrix, query, self.similar_developers_number)?;

        Ok(ranked
            .into_iter()
            .map(|(developer, similarity)| {
                let record = &developers[&developer];
                SimilarDeveloper {
                    top_languages: top_features(record, FeatureField::Languages, self.parameters_top_size),
                    top_identifiers: top_features(record, FeatureField::Variables, self.parameters_top_size),
                    developer,
                    similarity,
                }
            })
            .collect())
    }
}
