//! Match and result-set models produced by a search.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::Record;

/// Searchable text field of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Title,
    Abstract,
    Keywords,
    Authors,
}

impl Field {
    /// All searchable fields in weight order
    pub const ALL: [Field; 4] = [Field::Title, Field::Abstract, Field::Keywords, Field::Authors];

    /// Field name as it appears in the data file
    pub fn name(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Abstract => "abstract",
            Field::Keywords => "keywords",
            Field::Authors => "authors",
        }
    }

    /// Relative weight of a hit on this field
    pub fn weight(&self) -> f64 {
        match self {
            Field::Title => 0.40,
            Field::Abstract => 0.25,
            Field::Keywords => 0.20,
            Field::Authors => 0.15,
        }
    }

    /// Whether the field holds a sequence of strings rather than one text
    pub fn is_sequence(&self) -> bool {
        matches!(self, Field::Keywords | Field::Authors)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Address of one matchable text: a scalar field, or one element of a sequence field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldRef {
    pub field: Field,
    /// Element index for `keywords`/`authors`; always 0 for scalar fields
    pub element: usize,
}

impl FieldRef {
    pub fn title() -> Self {
        Self::scalar(Field::Title)
    }

    pub fn abstract_text() -> Self {
        Self::scalar(Field::Abstract)
    }

    pub fn keyword(element: usize) -> Self {
        Self {
            field: Field::Keywords,
            element,
        }
    }

    pub fn author(element: usize) -> Self {
        Self {
            field: Field::Authors,
            element,
        }
    }

    fn scalar(field: Field) -> Self {
        Self { field, element: 0 }
    }

    /// Resolve this reference to the original text on a record
    pub fn text<'a>(&self, record: &'a Record) -> Option<&'a str> {
        match self.field {
            Field::Title => Some(record.title.as_str()),
            Field::Abstract => record.r#abstract.as_deref(),
            Field::Keywords => record.keywords.get(self.element).map(String::as_str),
            Field::Authors => record.authors.get(self.element).map(String::as_str),
        }
    }
}

impl std::fmt::Display for FieldRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.field.is_sequence() {
            write!(f, "{}[{}]", self.field, self.element)
        } else {
            write!(f, "{}", self.field)
        }
    }
}

/// Half-open `[start, end)` range of character offsets into a field's original text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

impl From<(usize, usize)> for Span {
    fn from((start, end): (usize, usize)) -> Self {
        Self::new(start, end)
    }
}

/// Matched spans per field reference, ordered by field weight then element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanMap {
    spans: BTreeMap<FieldRef, Vec<Span>>,
}

impl SpanMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the spans found in one field; empty span lists are not stored
    pub fn insert(&mut self, field: FieldRef, spans: Vec<Span>) {
        if !spans.is_empty() {
            self.spans.insert(field, spans);
        }
    }

    pub fn get(&self, field: &FieldRef) -> Option<&[Span]> {
        self.spans.get(field).map(Vec::as_slice)
    }

    /// Spans for `field`, or an empty slice when it did not match
    pub fn spans_for(&self, field: &FieldRef) -> &[Span] {
        self.get(field).unwrap_or_default()
    }

    /// The distinct fields with at least one match
    pub fn fields(&self) -> Vec<Field> {
        let mut fields: Vec<Field> = self.spans.keys().map(|r| r.field).collect();
        fields.dedup();
        fields
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldRef, &Vec<Span>)> {
        self.spans.iter()
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

impl Serialize for SpanMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.spans.len()))?;
        for (field, spans) in &self.spans {
            map.serialize_entry(&field.to_string(), spans)?;
        }
        map.end()
    }
}

/// One record that passed the matcher, with where and how well it matched
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    pub record: Arc<Record>,

    pub matched_spans: SpanMap,

    pub score: f64,
}

impl MatchResult {
    pub fn new(record: Arc<Record>, matched_spans: SpanMap, score: f64) -> Self {
        Self {
            record,
            matched_spans,
            score,
        }
    }

    /// A pass-through result for an empty query
    pub fn unscored(record: Arc<Record>) -> Self {
        Self::new(record, SpanMap::new(), 0.0)
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }
}

/// The current, ordered output of the query pipeline
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResultSet {
    /// Query text the results were computed for
    pub query: String,

    pub results: Vec<MatchResult>,

    /// Set when there is no corpus at all, as opposed to no hits
    pub no_data: bool,
}

impl ResultSet {
    pub fn new(query: impl Into<String>, results: Vec<MatchResult>) -> Self {
        Self {
            query: query.into(),
            results,
            no_data: false,
        }
    }

    /// The empty-corpus state
    pub fn no_data(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            results: Vec::new(),
            no_data: true,
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.results.iter().map(MatchResult::id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatchResult> {
        self.results.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordBuilder;

    #[test]
    fn test_field_weights_sum_to_one() {
        let total: f64 = Field::ALL.iter().map(Field::weight).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_field_ref_display() {
        assert_eq!(FieldRef::title().to_string(), "title");
        assert_eq!(FieldRef::abstract_text().to_string(), "abstract");
        assert_eq!(FieldRef::keyword(2).to_string(), "keywords[2]");
        assert_eq!(FieldRef::author(0).to_string(), "authors[0]");
    }

    #[test]
    fn test_field_ref_text() {
        let record = RecordBuilder::new("1", "Title")
            .authors(["Ada", "Grace"])
            .keywords(["graphs"])
            .build();

        assert_eq!(FieldRef::title().text(&record), Some("Title"));
        assert_eq!(FieldRef::author(1).text(&record), Some("Grace"));
        assert_eq!(FieldRef::keyword(3).text(&record), None);
        assert_eq!(FieldRef::abstract_text().text(&record), None);
    }

    #[test]
    fn test_span_map_ignores_empty_insert() {
        let mut spans = SpanMap::new();
        spans.insert(FieldRef::title(), Vec::new());
        assert!(spans.is_empty());

        spans.insert(FieldRef::author(1), vec![Span::new(0, 3)]);
        spans.insert(FieldRef::title(), vec![Span::new(2, 5)]);
        assert_eq!(spans.fields(), vec![Field::Title, Field::Authors]);
        assert_eq!(spans.spans_for(&FieldRef::author(0)), &[] as &[Span]);
    }

    #[test]
    fn test_span_map_serializes_with_string_keys() {
        let mut spans = SpanMap::new();
        spans.insert(FieldRef::title(), vec![Span::new(18, 25)]);
        spans.insert(FieldRef::keyword(1), vec![Span::new(0, 7)]);

        let json = serde_json::to_value(&spans).unwrap();
        assert_eq!(json["title"][0]["start"], 18);
        assert_eq!(json["keywords[1]"][0]["end"], 7);
    }

    #[test]
    fn test_result_set_states() {
        let empty = ResultSet::new("quantum", Vec::new());
        assert!(empty.is_empty());
        assert!(!empty.no_data);

        let no_data = ResultSet::no_data("");
        assert!(no_data.is_empty());
        assert!(no_data.no_data);
    }
}
