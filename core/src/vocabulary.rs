use std::collections::{BTreeMap, HashMap};

use crate::config::IndexConfig;
use crate::error::{Error, Result};
use crate::weighting::smoothed_idf;
use crate::TermId;

/// Frozen term dictionary of a fitted index.
///
/// Term ids follow the lexicographic order of the terms, so
/// `feature_names()[id]` is the term behind `id`.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    dictionary: HashMap<String, TermId>,
    feature_names: Vec<String>,
    df: Vec<u32>,
    idf: Vec<f64>,
}

#[derive(Default)]
struct TermStats {
    df: u32,
    total: u64,
}

impl Vocabulary {
    /// Build the vocabulary from per-document term counts.
    pub fn build(doc_terms: &[HashMap<String, u32>], config: &IndexConfig) -> Result<Self> {
        let mut stats: BTreeMap<&str, TermStats> = BTreeMap::new();
        for counts in doc_terms {
            for (term, &count) in counts {
                let entry = stats.entry(term.as_str()).or_default();
                entry.df += 1;
                entry.total += u64::from(count);
            }
        }
        if stats.is_empty() {
            return Err(Error::Indexing("empty vocabulary; perhaps the documents only contain stop words".into()));
        }

        let mut kept: Vec<(&str, TermStats)> = stats.into_iter().filter(|(_, s)| s.df >= config.min_df).collect();
        if kept.is_empty() {
            return Err(Error::Indexing(format!("no terms remain after pruning with min_df={}", config.min_df)));
        }

        if let Some(max) = config.max_features {
            if kept.len() > max {
                // stable: equal totals keep lexicographic order
                kept.sort_by(|a, b| b.1.total.cmp(&a.1.total));
                kept.truncate(max);
                kept.sort_by(|a, b| a.0.cmp(b.0));
            }
        }

        let num_docs = doc_terms.len();
        let mut dictionary = HashMap::with_capacity(kept.len());
        let mut feature_names = Vec::with_capacity(kept.len());
        let mut df = Vec::with_capacity(kept.len());
        let mut idf = Vec::with_capacity(kept.len());
        for (tid, (term, s)) in kept.into_iter().enumerate() {
            dictionary.insert(term.to_string(), tid as TermId);
            feature_names.push(term.to_string());
            df.push(s.df);
            idf.push(smoothed_idf(num_docs, s.df));
        }
        Ok(Self { dictionary, feature_names, df, idf })
    }

    pub fn get(&self, term: &str) -> Option<TermId> { self.dictionary.get(term).copied() }

    pub fn len(&self) -> usize { self.feature_names.len() }

    pub fn is_empty(&self) -> bool { self.feature_names.is_empty() }

    pub fn feature_names(&self) -> &[String] { &self.feature_names }

    pub fn df(&self, term_id: TermId) -> Option<u32> { self.df.get(term_id as usize).copied() }

    pub fn idf(&self, term_id: TermId) -> Option<f64> { self.idf.get(term_id as usize).copied() }

    /// Count the in-vocabulary terms of an analyzed text, keyed by term id.
    pub fn count_terms<I, S>(&self, terms: I) -> BTreeMap<TermId, u32>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counts = BTreeMap::new();
        for term in terms {
            if let Some(tid) = self.get(term.as_ref()) {
                *counts.entry(tid).or_insert(0) += 1;
            }
        }
        counts
    }
}

/// Raw term counts of one analyzed document.
pub fn term_counts(terms: Vec<String>) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for term in terms {
        *counts.entry(term).or_insert(0) += 1;
    }
    counts
}
