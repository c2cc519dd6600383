//! Retrieval core: flattens structured records into weighted text, fits a
//! TF-IDF vector space over them and answers ranked cosine-similarity queries.

pub mod config;
pub mod error;
pub mod flatten;
pub mod index;
pub mod matrix;
pub mod record;
pub mod report;
pub mod shared;
pub mod tokenizer;
pub mod vocabulary;
pub mod weighting;

pub type TermId = u32;
pub type DocId = u32;

pub use config::{IndexConfig, SearchParams};
pub use error::{Error, ErrorKind, Result, ScoringError};
pub use flatten::flatten;
pub use index::{FittedIndex, IndexState, SearchIndex};
pub use record::{parse_records, FieldValue, Record};
pub use report::{IndexStats, IngestReport, IngestStatus, SearchHit};
pub use shared::SharedIndex;
