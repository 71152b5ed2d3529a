//! The search-and-filter engine.
//!
//! Data flows leaf to root:
//!
//! - [`Corpus`]: load-once, read-many record store
//! - [`Matcher`]: weighted multi-field substring matching with span tracking
//! - [`FilterSet`]: exact-equality filters on discrete fields, combined with AND
//! - [`QueryPipeline`]: debounced query handling that republishes the current [`ResultSet`]
//! - [`highlight`]: turns a field's text plus its spans into plain/highlighted segments
//!
//! [`ResultSet`]: crate::models::ResultSet
//!
//! ```rust
//! use multinetics_search::engine::{Corpus, FilterSet, FilterKey, Matcher};
//! use multinetics_search::models::RecordBuilder;
//!
//! let corpus = Corpus::load(vec![
//!     RecordBuilder::new("a1", "Deep Learning for Networks").volume(9).build(),
//!     RecordBuilder::new("a2", "Shallow Parsing").volume(8).build(),
//! ])
//! .unwrap();
//!
//! let hits = Matcher::default().search(&corpus, "network");
//! let mut filters = FilterSet::new([FilterKey::Volume]);
//! filters.set_filter("volume", Some(9.into())).unwrap();
//! assert_eq!(filters.apply(hits).len(), 1);
//! ```

mod corpus;
mod filters;
pub mod highlight;
pub mod insights;
mod matcher;
mod pipeline;

pub use corpus::Corpus;
pub use filters::{FilterKey, FilterSet, FilterState, FilterValue, OptionOrder};
pub use highlight::{annotate, to_html, Segment};
pub use matcher::{ExactSubstring, MatchStrategy, Matcher, StrategyKind};
#[cfg(feature = "similarity")]
pub use matcher::SimilarityBonus;
pub use pipeline::{QueryPipeline, ResultObserver, DEFAULT_DEBOUNCE};

/// Errors reported synchronously by engine operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// No records were supplied at load time
    #[error("Corpus is empty: no records to search")]
    EmptyCorpus,

    /// A filter value does not have the key's type
    #[error("Invalid value for filter '{key}': {reason}")]
    InvalidFilterValue { key: String, reason: String },

    /// The key was not declared when the filter set was built
    #[error("Unknown filter key: {0}")]
    UnknownFilterKey(String),

    /// Two records share the same id
    #[error("Duplicate record id: {0}")]
    DuplicateId(String),

    /// A record is missing a required field
    #[error("Invalid record at position {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
}
