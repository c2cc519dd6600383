use std::cmp::Ordering;
use std::sync::Arc;

use crate::config::{IndexConfig, SearchParams};
use crate::error::{Error, Result};
use crate::flatten::flatten;
use crate::matrix::WeightMatrix;
use crate::record::Record;
use crate::report::{IndexStats, IngestReport, SearchHit};
use crate::tokenizer::analyze;
use crate::vocabulary::{term_counts, Vocabulary};
use crate::weighting::SparseVector;
use crate::DocId;

/// Vocabulary, weight matrix and source records of one successful fit.
/// Row `i` of the matrix always belongs to `records[i]`.
#[derive(Debug, Clone)]
pub struct FittedIndex {
    vocabulary: Vocabulary,
    matrix: WeightMatrix,
    records: Vec<Arc<Record>>,
}

impl FittedIndex {
    /// Build a complete fitted state. Fails without side effects.
    pub fn fit(records: Vec<Record>, config: &IndexConfig) -> Result<Self> {
        config.validate()?;
        if records.is_empty() {
            return Err(Error::EmptyInput);
        }

        let analyzed: Vec<Vec<String>> = records.iter().map(|r| analyze(&flatten(r))).collect();
        let counts: Vec<_> = analyzed.iter().cloned().map(term_counts).collect();
        let vocabulary = Vocabulary::build(&counts, config)?;

        let rows: Vec<SparseVector> = analyzed
            .iter()
            .map(|terms| SparseVector::tfidf(&vocabulary.count_terms(terms), &vocabulary))
            .collect();
        let matrix = WeightMatrix::from_rows(&rows, vocabulary.len());

        tracing::info!(num_docs = records.len(), vocabulary_size = vocabulary.len(), nnz = matrix.nnz(), "index fitted");
        Ok(Self { vocabulary, matrix, records: records.into_iter().map(Arc::new).collect() })
    }

    pub fn vocabulary(&self) -> &Vocabulary { &self.vocabulary }

    pub fn matrix(&self) -> &WeightMatrix { &self.matrix }

    pub fn records(&self) -> &[Arc<Record>] { &self.records }

    pub fn num_docs(&self) -> usize { self.records.len() }

    /// Transform `query` with the frozen vocabulary.
    pub fn query_vector(&self, query: &str) -> SparseVector {
        SparseVector::tfidf(&self.vocabulary.count_terms(analyze(query)), &self.vocabulary)
    }

    /// Rank documents against `query`, best first.
    ///
    /// A query with no in-vocabulary term matches nothing. Otherwise every
    /// document scoring at least `min_score` is a candidate; candidates are
    /// ordered by score descending, then by ascending doc id.
    pub fn search(&self, query: &str, params: &SearchParams) -> Result<Vec<SearchHit>> {
        if query.trim().is_empty() {
            return Err(Error::EmptyQuery);
        }
        params.validate()?;

        let q = self.query_vector(query);
        if q.is_empty() {
            tracing::debug!(query, "no query term in vocabulary");
            return Ok(Vec::new());
        }

        let scores = self.matrix.score(&q).map_err(Error::SearchFailed)?;
        let mut candidates: Vec<(DocId, f64)> = scores
            .into_iter()
            .enumerate()
            .filter(|(_, s)| *s >= params.min_score)
            .map(|(d, s)| (d as DocId, s))
            .collect();
        top_k(&mut candidates, params.limit);

        let hits: Vec<SearchHit> = candidates
            .into_iter()
            .enumerate()
            .map(|(i, (doc_id, score))| SearchHit { score, rank: i + 1, doc_id, record: Arc::clone(&self.records[doc_id as usize]) })
            .collect();
        tracing::debug!(query, terms = q.len(), hits = hits.len(), "search complete");
        Ok(hits)
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats::Fitted {
            total_documents: self.num_docs(),
            vocabulary_size: self.vocabulary.len(),
            feature_count: self.vocabulary.feature_names().len(),
            matrix_shape: self.matrix.shape(),
        }
    }
}

fn rank_order(a: &(DocId, f64), b: &(DocId, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
}

/// Keep the best `k` entries in rank order.
fn top_k(candidates: &mut Vec<(DocId, f64)>, k: usize) {
    if k == 0 {
        candidates.clear();
        return;
    }
    if candidates.len() > k {
        candidates.select_nth_unstable_by(k - 1, rank_order);
        candidates.truncate(k);
    }
    candidates.sort_unstable_by(rank_order);
}

/// Either nothing has been indexed yet, or a complete fitted state exists.
#[derive(Debug, Clone, Default)]
pub enum IndexState {
    #[default]
    Unfitted,
    Fitted(FittedIndex),
}

impl IndexState {
    pub fn fitted(&self) -> Option<&FittedIndex> {
        match self {
            IndexState::Fitted(f) => Some(f),
            IndexState::Unfitted => None,
        }
    }

    pub fn search(&self, query: &str, params: &SearchParams) -> Result<Vec<SearchHit>> {
        self.fitted().ok_or(Error::NotIndexed)?.search(query, params)
    }

    pub fn stats(&self) -> IndexStats {
        self.fitted().map_or(IndexStats::NotFitted, FittedIndex::stats)
    }
}

/// A single index instance. Callers sharing one instance across threads
/// should go through [`crate::SharedIndex`].
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    config: IndexConfig,
    state: IndexState,
}

impl SearchIndex {
    pub fn new(config: IndexConfig) -> Self {
        Self { config, state: IndexState::Unfitted }
    }

    pub fn config(&self) -> &IndexConfig { &self.config }

    pub fn state(&self) -> &IndexState { &self.state }

    pub fn fitted(&self) -> Option<&FittedIndex> { self.state.fitted() }

    /// Replace the fitted state with one built from `records`. On error the
    /// previous state is kept.
    pub fn try_ingest(&mut self, records: Vec<Record>) -> Result<&FittedIndex> {
        let fitted = FittedIndex::fit(records, &self.config)?;
        self.state = IndexState::Fitted(fitted);
        self.state.fitted().ok_or(Error::NotIndexed)
    }

    /// [`SearchIndex::try_ingest`], reported as a status structure.
    pub fn ingest(&mut self, records: Vec<Record>) -> IngestReport {
        match self.try_ingest(records) {
            Ok(f) => IngestReport::success(f.num_docs(), f.vocabulary().len()),
            Err(e) => {
                tracing::warn!(error = %e, "ingest rejected");
                IngestReport::failure(&e)
            }
        }
    }

    pub fn search(&self, query: &str, params: &SearchParams) -> Result<Vec<SearchHit>> {
        self.state.search(query, params)
    }

    pub fn stats(&self) -> IndexStats { self.state.stats() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(title: &str, body: &str) -> Record {
        Record::new().with("title", title).with("body", body)
    }

    #[test]
    fn top_k_orders_by_score_then_doc_id() {
        let mut c = vec![(0, 0.2), (1, 0.9), (2, 0.5), (3, 0.9), (4, 0.1)];
        top_k(&mut c, 3);
        assert_eq!(c, vec![(1, 0.9), (3, 0.9), (2, 0.5)]);
        let mut all = vec![(2, 0.3), (0, 0.3)];
        top_k(&mut all, 10);
        assert_eq!(all, vec![(0, 0.3), (2, 0.3)]);
    }

    #[test]
    fn unfitted_index_rejects_queries() {
        let idx = SearchIndex::default();
        assert!(matches!(idx.search("anything", &SearchParams::default()), Err(Error::NotIndexed)));
        assert_eq!(idx.stats(), IndexStats::NotFitted);
    }

    #[test]
    fn failed_ingest_keeps_previous_state() {
        let mut idx = SearchIndex::default();
        assert!(idx.ingest(vec![rec("Rust", "systems language")]).is_success());
        let report = idx.ingest(vec![rec("the", "and of")]);
        assert!(!report.is_success());
        assert!(report.message.starts_with("Failed to index records"));
        let hits = idx.search("rust", &SearchParams::default()).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn rejects_blank_query_and_bad_limit() {
        let mut idx = SearchIndex::default();
        idx.ingest(vec![rec("Rust", "systems language")]);
        assert!(matches!(idx.search("   \t", &SearchParams::default()), Err(Error::EmptyQuery)));
        assert!(matches!(idx.search("rust", &SearchParams::new(0, 0.0)), Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn stopword_query_matches_nothing() {
        let mut idx = SearchIndex::default();
        idx.ingest(vec![rec("Rust", "systems language"), rec("Go", "gophers")]);
        assert!(idx.search("the of and", &SearchParams::default()).unwrap().is_empty());
    }

    #[test]
    fn invalid_config_is_reported() {
        let mut idx = SearchIndex::new(IndexConfig { min_df: 0, max_features: None });
        let report = idx.ingest(vec![rec("Rust", "x")]);
        assert!(!report.is_success());
        assert!(idx.fitted().is_none());
    }
}
