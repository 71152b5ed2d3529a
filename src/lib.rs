//! # Multinetics Search
//!
//! Client-side search and filtering over a journal's article catalog.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (Record, MatchResult, ResultSet, etc.)
//! - [`engine`]: Corpus store, matcher, filters, debounced query pipeline and highlighting
//! - [`loader`]: Reading the articles data file
//! - [`config`]: Configuration management
//! - [`ui`] and [`utils`]: Terminal rendering

pub mod config;
pub mod engine;
pub mod loader;
pub mod models;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use engine::{Corpus, EngineError, FilterSet, Matcher, QueryPipeline};
pub use models::{MatchResult, Record, ResultSet};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
