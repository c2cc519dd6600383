//! Serializable outputs handed to adapters.

use serde::Serialize;
use std::sync::Arc;

use crate::error::Error;
use crate::record::Record;
use crate::DocId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestStatus {
    Success,
    Error,
}

/// Outcome of an ingest call. Failures are reported here, never thrown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestReport {
    pub status: IngestStatus,
    pub message: String,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vocabulary_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<usize>,
}

impl IngestReport {
    pub fn success(count: usize, vocabulary_size: usize) -> Self {
        Self {
            status: IngestStatus::Success,
            message: format!("Successfully indexed {count} records"),
            count,
            vocabulary_size: Some(vocabulary_size),
            feature_names: Some(vocabulary_size),
        }
    }

    pub fn failure(err: &Error) -> Self {
        Self { status: IngestStatus::Error, message: err.to_string(), count: 0, vocabulary_size: None, feature_names: None }
    }

    pub fn is_success(&self) -> bool { self.status == IngestStatus::Success }
}

/// One ranked match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub score: f64,
    pub rank: usize,
    #[serde(skip)]
    pub doc_id: DocId,
    pub record: Arc<Record>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IndexStats {
    Fitted {
        total_documents: usize,
        vocabulary_size: usize,
        feature_count: usize,
        matrix_shape: (usize, usize),
    },
    NotFitted,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ingest_report_shapes() {
        let ok = serde_json::to_value(IngestReport::success(5, 42)).unwrap();
        assert_eq!(ok, json!({"status": "success", "message": "Successfully indexed 5 records", "count": 5, "vocabulary_size": 42, "feature_names": 42}));
        let err = serde_json::to_value(IngestReport::failure(&Error::EmptyInput)).unwrap();
        assert_eq!(err, json!({"status": "error", "message": "No records provided", "count": 0}));
    }

    #[test]
    fn stats_shapes() {
        let fitted = IndexStats::Fitted { total_documents: 2, vocabulary_size: 7, feature_count: 7, matrix_shape: (2, 7) };
        assert_eq!(
            serde_json::to_value(fitted).unwrap(),
            json!({"status": "fitted", "total_documents": 2, "vocabulary_size": 7, "feature_count": 7, "matrix_shape": [2, 7]})
        );
        assert_eq!(serde_json::to_value(IndexStats::NotFitted).unwrap(), json!({"status": "not_fitted"}));
    }

    #[test]
    fn hit_serializes_record_inline() {
        let hit = SearchHit { score: 0.5, rank: 1, doc_id: 3, record: Arc::new(Record::new().with("title", "T")) };
        assert_eq!(serde_json::to_value(hit).unwrap(), json!({"score": 0.5, "rank": 1, "record": {"title": "T"}}));
    }
}
