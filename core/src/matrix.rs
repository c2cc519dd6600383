use serde::{Deserialize, Serialize};

use crate::error::ScoringError;
use crate::weighting::SparseVector;
use crate::{DocId, TermId};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub weight: f64, // normalized tf-idf weight
}

/// Sparse document-term weight matrix stored column-wise: one posting list
/// per term id, each sorted by doc id.
#[derive(Debug, Clone)]
pub struct WeightMatrix {
    postings: Vec<Vec<Posting>>,
    num_docs: usize,
    nnz: usize,
}

impl WeightMatrix {
    /// Assemble the matrix from normalized document rows, in doc id order.
    pub fn from_rows(rows: &[SparseVector], num_terms: usize) -> Self {
        let mut postings: Vec<Vec<Posting>> = vec![Vec::new(); num_terms];
        let mut nnz = 0;
        for (doc_id, row) in rows.iter().enumerate() {
            for &(tid, weight) in row.entries() {
                if let Some(list) = postings.get_mut(tid as usize) {
                    list.push(Posting { doc_id: doc_id as DocId, weight });
                    nnz += 1;
                }
            }
        }
        Self { postings, num_docs: rows.len(), nnz }
    }

    /// `(documents, terms)`.
    pub fn shape(&self) -> (usize, usize) { (self.num_docs, self.postings.len()) }

    pub fn nnz(&self) -> usize { self.nnz }

    pub fn postings(&self, term_id: TermId) -> Option<&[Posting]> {
        self.postings.get(term_id as usize).map(Vec::as_slice)
    }

    /// Cosine similarity of `query` against every document. Both sides are
    /// L2-normalized, so this is a dot product. Accumulation runs in term id
    /// then doc id order, so repeated calls are bit-identical.
    pub fn score(&self, query: &SparseVector) -> Result<Vec<f64>, ScoringError> {
        let mut scores = vec![0.0f64; self.num_docs];
        for &(tid, q_w) in query.entries() {
            let list = self
                .postings(tid)
                .ok_or(ScoringError::TermOutOfRange { term_id: tid, columns: self.postings.len() })?;
            for p in list {
                scores[p.doc_id as usize] += p.weight * q_w;
            }
        }
        for (doc_id, score) in scores.iter_mut().enumerate() {
            if !score.is_finite() {
                return Err(ScoringError::NonFiniteScore { doc_id, score: *score });
            }
            // rounding can push a perfect match past 1.0
            *score = score.clamp(0.0, 1.0);
        }
        Ok(scores)
    }
}
