//! Core data models for catalog records and search results.

mod record;
mod search;

pub use record::{Record, RecordBuilder};
pub use search::{Field, FieldRef, MatchResult, ResultSet, Span, SpanMap};
