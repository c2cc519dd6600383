use std::collections::BTreeMap;

use crate::vocabulary::Vocabulary;
use crate::TermId;

/// Smoothed inverse document frequency: `ln((1 + n) / (1 + df)) + 1`.
pub fn smoothed_idf(num_docs: usize, df: u32) -> f64 {
    ((1 + num_docs) as f64 / (1 + df as u64) as f64).ln() + 1.0
}

/// Term-id sorted weights of one document or query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(TermId, f64)>,
}

impl SparseVector {
    /// TF-IDF weights for raw term counts, L2-normalized.
    pub fn tfidf(counts: &BTreeMap<TermId, u32>, vocab: &Vocabulary) -> Self {
        let entries = counts
            .iter()
            .filter_map(|(&tid, &tf)| vocab.idf(tid).map(|idf| (tid, tf as f64 * idf)))
            .filter(|(_, w)| *w > 0.0)
            .collect();
        let mut v = Self { entries };
        v.normalize();
        v
    }

    /// Divide by the Euclidean norm. A zero vector is left as is.
    pub fn normalize(&mut self) -> f64 {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, w) in self.entries.iter_mut() { *w /= norm; }
        }
        norm
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j, mut acc) = (0, 0, 0.0f64);
        while i < self.entries.len() && j < other.entries.len() {
            let (a, wa) = self.entries[i];
            let (b, wb) = other.entries[j];
            match a.cmp(&b) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    acc += wa * wb;
                    i += 1;
                    j += 1;
                }
            }
        }
        acc
    }

    pub fn entries(&self) -> &[(TermId, f64)] { &self.entries }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn len(&self) -> usize { self.entries.len() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexConfig;
    use crate::tokenizer::analyze;
    use crate::vocabulary::{term_counts, Vocabulary};

    #[test]
    fn idf_matches_formula() {
        assert!((smoothed_idf(2, 2) - 1.0).abs() < 1e-6);
        let expected = (3.0f64 / 2.0).ln() + 1.0;
        assert_eq!(smoothed_idf(2, 1), expected);
        // rarer terms weigh more
        assert!(smoothed_idf(10, 1) > smoothed_idf(10, 5));
    }

    #[test]
    fn normalized_vector_has_unit_norm() {
        let docs = vec![term_counts(analyze("rust rust search")), term_counts(analyze("search engine"))];
        let vocab = Vocabulary::build(&docs, &IndexConfig::default()).unwrap();
        let v = SparseVector::tfidf(&vocab.count_terms(analyze("rust rust search")), &vocab);
        assert!((v.norm() - 1.0).abs() < 1e-12);
        assert!((v.dot(&v) - 1.0).abs() < 1e-12);
        let ids: Vec<TermId> = v.entries().iter().map(|(t, _)| *t).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn weights_keep_double_precision() {
        // the gap between these idfs is below single-precision resolution
        let a = smoothed_idf(1_000_000_000, 100_000_000);
        let b = smoothed_idf(1_000_000_000, 100_000_001);
        assert!(a > b);
        assert!(a - b < f64::from(f32::EPSILON));
        let docs = vec![term_counts(analyze("alpha beta")), term_counts(analyze("beta gamma"))];
        let vocab = Vocabulary::build(&docs, &IndexConfig::default()).unwrap();
        let beta = vocab.get("beta").unwrap();
        assert_eq!(vocab.idf(beta), Some(smoothed_idf(2, 2)));
        assert_eq!(vocab.idf(vocab.get("alpha").unwrap()), Some((3.0f64 / 2.0).ln() + 1.0));
    }

    #[test]
    fn zero_vector_stays_zero() {
        let mut v = SparseVector::default();
        assert_eq!(v.normalize(), 0.0);
        assert!(v.is_empty());
        assert_eq!(v.dot(&SparseVector::default()), 0.0);
    }
}
