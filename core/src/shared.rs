use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::{IndexConfig, SearchParams};
use crate::error::Result;
use crate::index::{FittedIndex, IndexState};
use crate::record::Record;
use crate::report::{IndexStats, IngestReport, SearchHit};

/// Cloneable handle to one index shared between threads.
///
/// Fitting happens outside the lock; only the swap of the finished state
/// takes the write lock, so readers see either the old or the new state.
#[derive(Clone, Default)]
pub struct SharedIndex {
    config: IndexConfig,
    state: Arc<RwLock<IndexState>>,
}

impl SharedIndex {
    pub fn new(config: IndexConfig) -> Self {
        Self { config, state: Arc::new(RwLock::new(IndexState::Unfitted)) }
    }

    pub fn config(&self) -> &IndexConfig { &self.config }

    pub fn ingest(&self, records: Vec<Record>) -> IngestReport {
        match FittedIndex::fit(records, &self.config) {
            Ok(fitted) => {
                let report = IngestReport::success(fitted.num_docs(), fitted.vocabulary().len());
                *self.state.write() = IndexState::Fitted(fitted);
                report
            }
            Err(e) => {
                tracing::warn!(error = %e, "ingest rejected");
                IngestReport::failure(&e)
            }
        }
    }

    pub fn search(&self, query: &str, params: &SearchParams) -> Result<Vec<SearchHit>> {
        self.state.read().search(query, params)
    }

    pub fn stats(&self) -> IndexStats { self.state.read().stats() }
}
