//! Weighted multi-field matching with span tracking.
//!
//! Inclusion is always decided by exact case-insensitive substring
//! containment. A [`MatchStrategy`] may only add a bounded bonus to fields
//! that already matched, so it can reorder hits but never add or drop one.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use super::Corpus;
use crate::models::{Field, FieldRef, MatchResult, Record, Span, SpanMap};

/// Largest bonus a strategy may add to a field, as a fraction of its weight
const MAX_BONUS_RATIO: f64 = 0.1;

/// Ranking extension applied on top of the exact-substring baseline
pub trait MatchStrategy: Send + Sync + std::fmt::Debug {
    /// Name used in configuration and logs
    fn name(&self) -> &'static str;

    /// Extra score for a field text that already contains `query`
    ///
    /// `query` is trimmed and case-folded. The matcher clamps the value to
    /// `[0, weight * 0.1]`.
    fn bonus(&self, _field: Field, _text: &str, _query: &str) -> f64 {
        0.0
    }
}

/// The baseline: score is the plain sum of matching field weights
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactSubstring;

impl MatchStrategy for ExactSubstring {
    fn name(&self) -> &'static str {
        "exact"
    }
}

/// Adds a Jaro-Winkler similarity bonus so closer field texts rank higher
#[cfg(feature = "similarity")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityBonus;

#[cfg(feature = "similarity")]
impl MatchStrategy for SimilarityBonus {
    fn name(&self) -> &'static str {
        "similarity"
    }

    fn bonus(&self, field: Field, text: &str, query: &str) -> f64 {
        let text = fold_str(text);
        field.weight() * MAX_BONUS_RATIO * strsim::jaro_winkler(query, &text)
    }
}

/// Strategy names accepted in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Exact,
    Similarity,
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact" | "substring" => Ok(StrategyKind::Exact),
            "similarity" | "fuzzy" => Ok(StrategyKind::Similarity),
            other => Err(format!("unknown match strategy '{}'", other)),
        }
    }
}

/// Computes, per record, whether and where a query matches
#[derive(Debug, Clone)]
pub struct Matcher {
    strategy: Arc<dyn MatchStrategy>,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(ExactSubstring)
    }
}

impl Matcher {
    pub fn new(strategy: impl MatchStrategy + 'static) -> Self {
        Self {
            strategy: Arc::new(strategy),
        }
    }

    /// Build a matcher from a configured strategy name
    ///
    /// Unknown names, or `similarity` without the `similarity` feature, fall
    /// back to [`ExactSubstring`].
    pub fn from_name(name: &str) -> Self {
        match name.parse::<StrategyKind>() {
            Ok(StrategyKind::Exact) => Self::default(),
            #[cfg(feature = "similarity")]
            Ok(StrategyKind::Similarity) => Self::new(SimilarityBonus),
            #[cfg(not(feature = "similarity"))]
            Ok(StrategyKind::Similarity) => {
                tracing::warn!("similarity strategy not compiled in, using exact matching");
                Self::default()
            }
            Err(e) => {
                tracing::warn!("{}, using exact matching", e);
                Self::default()
            }
        }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Match `query` against every record in the corpus
    ///
    /// An empty or whitespace-only query passes every record with score 0.
    /// Otherwise only records with at least one matching field are returned,
    /// ordered by descending score with ties kept in corpus order.
    pub fn search(&self, corpus: &Corpus, query: &str) -> Vec<MatchResult> {
        let needle = fold_query(query);

        if needle.is_empty() {
            return corpus
                .all()
                .iter()
                .map(|record| MatchResult::unscored(Arc::clone(record)))
                .collect();
        }

        let started = Instant::now();
        let query_text: String = needle.iter().collect();

        let mut results: Vec<MatchResult> = corpus
            .all()
            .iter()
            .filter_map(|record| self.match_record(record, &needle, &query_text))
            .collect();

        // Stable, so equal scores stay in corpus order.
        results.sort_by(|a, b| b.score.total_cmp(&a.score));

        tracing::debug!(
            query = %query_text,
            hits = results.len(),
            strategy = self.strategy.name(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "search complete"
        );

        results
    }

    fn match_record(
        &self,
        record: &Arc<Record>,
        needle: &[char],
        query_text: &str,
    ) -> Option<MatchResult> {
        let mut spans = SpanMap::new();
        let mut score = 0.0;

        for field in Field::ALL {
            let texts: Vec<(FieldRef, &str)> = match field {
                Field::Title => vec![(FieldRef::title(), record.title.as_str())],
                Field::Abstract => record
                    .r#abstract
                    .as_deref()
                    .map(|text| vec![(FieldRef::abstract_text(), text)])
                    .unwrap_or_default(),
                Field::Keywords => record
                    .keywords
                    .iter()
                    .enumerate()
                    .map(|(i, k)| (FieldRef::keyword(i), k.as_str()))
                    .collect(),
                Field::Authors => record
                    .authors
                    .iter()
                    .enumerate()
                    .map(|(i, a)| (FieldRef::author(i), a.as_str()))
                    .collect(),
            };

            let mut field_matched = false;
            let mut field_bonus: f64 = 0.0;

            for (field_ref, text) in texts {
                let found = find_occurrences(text, needle);
                if found.is_empty() {
                    continue;
                }
                field_matched = true;
                let bonus = self
                    .strategy
                    .bonus(field, text, query_text)
                    .clamp(0.0, field.weight() * MAX_BONUS_RATIO);
                field_bonus = field_bonus.max(bonus);
                spans.insert(field_ref, found);
            }

            if field_matched {
                score += field.weight() + field_bonus;
            }
        }

        if spans.is_empty() {
            None
        } else {
            Some(MatchResult::new(Arc::clone(record), spans, score))
        }
    }
}

/// Case-fold one character
///
/// Final sigma folds to `σ` so a word matches whatever its position, as
/// whole-string lowercasing would turn a trailing `Σ` into `ς`.
fn fold_char(c: char) -> impl Iterator<Item = char> {
    c.to_lowercase()
        .map(|lower| if lower == 'ς' { 'σ' } else { lower })
}

/// The trimmed, case-folded query as the matcher compares it
pub(crate) fn fold_query(query: &str) -> Vec<char> {
    query.trim().chars().flat_map(fold_char).collect()
}

/// Case-folded characters of a text, each mapped back to its original char offset
struct Folded {
    chars: Vec<char>,
    origin: Vec<usize>,
}

impl Folded {
    fn new(text: &str) -> Self {
        let mut chars = Vec::with_capacity(text.len());
        let mut origin = Vec::with_capacity(text.len());
        for (offset, c) in text.chars().enumerate() {
            for folded in fold_char(c) {
                chars.push(folded);
                origin.push(offset);
            }
        }
        Self { chars, origin }
    }
}

#[cfg(feature = "similarity")]
fn fold_str(text: &str) -> String {
    text.chars().flat_map(fold_char).collect()
}

/// Whether `needle` (already folded) occurs in `text` ignoring case
#[cfg(test)]
pub(crate) fn contains_folded(text: &str, needle: &[char]) -> bool {
    !needle.is_empty()
        && Folded::new(text)
            .chars
            .windows(needle.len())
            .any(|window| window == needle)
}

/// Every non-overlapping occurrence of `needle`, left to right, as char spans
/// into the original `text`
pub(crate) fn find_occurrences(text: &str, needle: &[char]) -> Vec<Span> {
    let folded = Folded::new(text);
    let n = needle.len();
    let mut spans = Vec::new();

    if n == 0 || folded.chars.len() < n {
        return spans;
    }

    let mut i = 0;
    while i + n <= folded.chars.len() {
        if folded.chars[i..i + n] != *needle {
            i += 1;
            continue;
        }

        let span = Span::new(folded.origin[i], folded.origin[i + n - 1] + 1);
        spans.push(span);

        // Skip to the first folded char past this span in original offsets.
        i += n;
        while i < folded.origin.len() && folded.origin[i] < span.end {
            i += 1;
        }
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordBuilder;

    fn needle(q: &str) -> Vec<char> {
        fold_query(q)
    }

    fn two_record_corpus() -> Corpus {
        Corpus::load(vec![
            RecordBuilder::new("a1", "Deep Learning for Networks")
                .year(2020)
                .volume(9)
                .build(),
            RecordBuilder::new("a2", "Shallow Parsing")
                .year(2019)
                .volume(8)
                .build(),
        ])
        .unwrap()
    }

    #[test]
    fn test_search_title_scenario() {
        let corpus = two_record_corpus();
        let results = Matcher::default().search(&corpus, "network");

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id(), "a1");
        assert!((results[0].score - 0.40).abs() < 1e-9);
        assert_eq!(
            results[0].matched_spans.spans_for(&FieldRef::title()),
            &[Span::new(18, 25)]
        );
        assert_eq!(results[0].matched_spans.len(), 1);
    }

    #[test]
    fn test_empty_query_returns_everything_unscored() {
        let corpus = two_record_corpus();
        for query in ["", "   ", "\t\n"] {
            let results = Matcher::default().search(&corpus, query);
            assert_eq!(
                results.iter().map(MatchResult::id).collect::<Vec<_>>(),
                vec!["a1", "a2"]
            );
            assert!(results.iter().all(|r| r.score == 0.0));
            assert!(results.iter().all(|r| r.matched_spans.is_empty()));
        }
    }

    #[test]
    fn test_query_is_trimmed_and_case_folded() {
        let corpus = two_record_corpus();
        let results = Matcher::default().search(&corpus, "  SHALLOW ");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id(), "a2");
        assert_eq!(
            results[0].matched_spans.spans_for(&FieldRef::title()),
            &[Span::new(0, 7)]
        );
    }

    #[test]
    fn test_no_hits_is_empty_not_error() {
        let corpus = two_record_corpus();
        assert!(Matcher::default().search(&corpus, "quantum").is_empty());
    }

    #[test]
    fn test_symbols_are_literal() {
        let corpus = Corpus::load(vec![
            RecordBuilder::new("1", "Templates in C++ (revisited)").build(),
            RecordBuilder::new("2", "C programming").build(),
        ])
        .unwrap();

        let results = Matcher::default().search(&corpus, "c++ (");
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].matched_spans.spans_for(&FieldRef::title()),
            &[Span::new(13, 18)]
        );
        assert!(Matcher::default().search(&corpus, ".*").is_empty());
    }

    #[test]
    fn test_all_occurrences_recorded_without_overlap() {
        assert_eq!(
            find_occurrences("aaaa", &needle("aa")),
            vec![Span::new(0, 2), Span::new(2, 4)]
        );
        assert_eq!(
            find_occurrences("Net net NET", &needle("net")),
            vec![Span::new(0, 3), Span::new(4, 7), Span::new(8, 11)]
        );
        assert_eq!(find_occurrences("aaa", &needle("aa")), vec![Span::new(0, 2)]);
    }

    #[test]
    fn test_offsets_are_char_offsets() {
        // "é" is two bytes but one char.
        assert_eq!(
            find_occurrences("Réseaux Neuronaux", &needle("neuro")),
            vec![Span::new(8, 13)]
        );
        assert_eq!(
            find_occurrences("GROSSE Straße", &needle("STRASSE")),
            Vec::<Span>::new()
        );
        assert_eq!(
            find_occurrences("ÜBER über", &needle("über")),
            vec![Span::new(0, 4), Span::new(5, 9)]
        );
    }

    #[test]
    fn test_expanding_lowercase_maps_to_original_char() {
        // 'İ' lowercases to "i\u{307}", two chars for one original.
        let text = "İstanbul";
        let spans = find_occurrences(text, &needle("stan"));
        assert_eq!(spans, vec![Span::new(1, 5)]);

        let spans = find_occurrences(text, &needle("i\u{307}s"));
        assert_eq!(spans, vec![Span::new(0, 2)]);
    }

    #[test]
    fn test_final_sigma_matches_either_form() {
        let corpus = Corpus::load(vec![RecordBuilder::new("g", "ΟΔΟΣ").build()]).unwrap();

        for query in ["οδος", "ΟΔΟΣ", "οδοσ", "ς", "σ"] {
            let results = Matcher::default().search(&corpus, query);
            assert_eq!(results.len(), 1, "query {:?}", query);
        }

        let results = Matcher::default().search(&corpus, "οδος");
        assert_eq!(
            results[0].matched_spans.spans_for(&FieldRef::title()),
            &[Span::new(0, 4)]
        );
        assert_eq!(
            find_occurrences("Σοφός ΛΟΓΟΣ", &needle("ς")),
            vec![Span::new(0, 1), Span::new(4, 5), Span::new(10, 11)]
        );
    }

    #[test]
    fn test_contains_folded() {
        assert!(contains_folded("Hello World", &needle("o w")));
        assert!(!contains_folded("Hello", &needle("")));
        assert!(!contains_folded("Hi", &needle("hello")));
    }

    #[test]
    fn test_sequence_fields_record_each_element() {
        let corpus = Corpus::load(vec![RecordBuilder::new("1", "Untitled")
            .authors(["Ana Lee", "Lee Wong", "Bob"])
            .keywords(["routing", "leet code"])
            .build()])
        .unwrap();

        let results = Matcher::default().search(&corpus, "lee");
        assert_eq!(results.len(), 1);
        let spans = &results[0].matched_spans;
        assert_eq!(spans.spans_for(&FieldRef::author(0)), &[Span::new(4, 7)]);
        assert_eq!(spans.spans_for(&FieldRef::author(1)), &[Span::new(0, 3)]);
        assert!(spans.get(&FieldRef::author(2)).is_none());
        assert_eq!(spans.spans_for(&FieldRef::keyword(1)), &[Span::new(0, 3)]);

        // Authors and keywords each count once regardless of element hits.
        let expected = Field::Keywords.weight() + Field::Authors.weight();
        assert!((results[0].score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_missing_optional_fields_do_not_match() {
        let corpus = Corpus::load(vec![RecordBuilder::new("1", "Graphs").build()]).unwrap();
        assert!(Matcher::default().search(&corpus, "abstract").is_empty());
    }

    #[test]
    fn test_ordering_by_score_then_corpus_order() {
        let corpus = Corpus::load(vec![
            RecordBuilder::new("abstract-only", "Other")
                .abstract_text("about routing")
                .build(),
            RecordBuilder::new("title-a", "Routing A").build(),
            RecordBuilder::new("title-b", "Routing B").build(),
            RecordBuilder::new("title-and-keyword", "Routing C")
                .keywords(["routing"])
                .build(),
            RecordBuilder::new("author-only", "Other")
                .authors(["Routing Person"])
                .build(),
        ])
        .unwrap();

        let results = Matcher::default().search(&corpus, "routing");
        let ids: Vec<&str> = results.iter().map(MatchResult::id).collect();
        assert_eq!(
            ids,
            vec![
                "title-and-keyword",
                "title-a",
                "title-b",
                "abstract-only",
                "author-only"
            ]
        );
    }

    #[test]
    fn test_strategy_from_name_falls_back_to_exact() {
        assert_eq!(Matcher::from_name("exact").strategy_name(), "exact");
        assert_eq!(Matcher::from_name("bogus").strategy_name(), "exact");
        assert_eq!(Matcher::from_name("").strategy_name(), "exact");
    }

    #[test]
    fn test_strategy_kind_parse() {
        assert_eq!("Exact".parse::<StrategyKind>(), Ok(StrategyKind::Exact));
        assert_eq!("fuzzy".parse::<StrategyKind>(), Ok(StrategyKind::Similarity));
        assert!("levenshtein".parse::<StrategyKind>().is_err());
    }

    #[derive(Debug)]
    struct Greedy;

    impl MatchStrategy for Greedy {
        fn name(&self) -> &'static str {
            "greedy"
        }

        fn bonus(&self, _field: Field, _text: &str, _query: &str) -> f64 {
            100.0
        }
    }

    #[test]
    fn test_strategy_bonus_is_clamped() {
        let corpus = two_record_corpus();
        let results = Matcher::new(Greedy).search(&corpus, "network");
        assert_eq!(results.len(), 1);
        let max = Field::Title.weight() * (1.0 + MAX_BONUS_RATIO);
        assert!((results[0].score - max).abs() < 1e-9);
    }

    #[cfg(feature = "similarity")]
    #[test]
    fn test_similarity_bonus_keeps_inclusion_and_prefers_closer_text() {
        let corpus = Corpus::load(vec![
            RecordBuilder::new("long", "Graph algorithms for very large sparse networks").build(),
            RecordBuilder::new("close", "Graph Networks").build(),
            RecordBuilder::new("miss", "Parsing").build(),
        ])
        .unwrap();

        let matcher = Matcher::from_name("similarity");
        assert_eq!(matcher.strategy_name(), "similarity");

        let results = matcher.search(&corpus, "graph networks");
        let ids: Vec<&str> = results.iter().map(MatchResult::id).collect();
        assert_eq!(ids, vec!["close"]);

        let results = matcher.search(&corpus, "graph");
        let ids: Vec<&str> = results.iter().map(MatchResult::id).collect();
        assert_eq!(ids, vec!["close", "long"]);
        assert!(results.iter().all(|r| r.score >= Field::Title.weight()));
    }
}
