//! Read-only projections over the corpus: keyword suggestions and stats.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use super::Corpus;

/// Default number of keyword suggestions
pub const DEFAULT_SUGGESTIONS: usize = 10;

/// Default number of topic keywords
pub const DEFAULT_TOPICS: usize = 20;

/// Summary numbers for the catalog header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CorpusStats {
    pub articles: usize,
    /// Latest minus earliest publication year, 0 if no year is known
    pub year_span: i64,
    /// Distinct keywords, compared case-insensitively
    pub topics: usize,
}

/// Count keywords after `normalize`, most frequent first, ties in order of first appearance
fn count_keywords<F>(corpus: &Corpus, normalize: F) -> Vec<(String, usize)>
where
    F: Fn(&str) -> Option<String>,
{
    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for keyword in corpus.all().iter().flat_map(|r| r.keywords.iter()) {
        let Some(key) = normalize(keyword) else {
            continue;
        };
        match index.get(&key) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(key.clone(), order.len());
                order.push((key, 1));
            }
        }
    }

    order.sort_by(|a, b| b.1.cmp(&a.1));
    order
}

/// The most common keywords, lowercased, for search-box suggestions
pub fn suggestions(corpus: &Corpus, limit: usize) -> Vec<String> {
    count_keywords(corpus, |k| Some(k.to_lowercase()))
        .into_iter()
        .take(limit)
        .map(|(keyword, _)| keyword)
        .collect()
}

/// Keywords longer than two characters with how many records use them
pub fn topic_keywords(corpus: &Corpus, limit: usize) -> Vec<(String, usize)> {
    let mut topics = count_keywords(corpus, |k| {
        let k = k.trim().to_lowercase();
        (k.chars().count() > 2).then_some(k)
    });
    topics.truncate(limit);
    topics
}

pub fn stats(corpus: &Corpus) -> CorpusStats {
    let years: Vec<i64> = corpus.all().iter().filter_map(|r| r.year).collect();
    let year_span = match (years.iter().min(), years.iter().max()) {
        (Some(min), Some(max)) => max - min,
        _ => 0,
    };

    let topics: BTreeSet<String> = corpus
        .all()
        .iter()
        .flat_map(|r| r.keywords.iter())
        .map(|k| k.to_lowercase())
        .collect();

    CorpusStats {
        articles: corpus.len(),
        year_span,
        topics: topics.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordBuilder;

    fn corpus() -> Corpus {
        Corpus::load(vec![
            RecordBuilder::new("1", "A")
                .keywords(["IoT", "Networks", "ai"])
                .year(2018)
                .build(),
            RecordBuilder::new("2", "B")
                .keywords(["networks", " Security "])
                .year(2023)
                .build(),
            RecordBuilder::new("3", "C")
                .keywords(["iot", "NETWORKS", "security"])
                .build(),
        ])
        .unwrap()
    }

    #[test]
    fn test_suggestions_by_frequency_then_first_seen() {
        assert_eq!(
            suggestions(&corpus(), DEFAULT_SUGGESTIONS),
            vec!["networks", "iot", "ai", " security ", "security"]
        );
        assert_eq!(suggestions(&corpus(), 2), vec!["networks", "iot"]);
    }

    #[test]
    fn test_topic_keywords_trim_and_skip_short() {
        assert_eq!(
            topic_keywords(&corpus(), DEFAULT_TOPICS),
            vec![
                ("networks".to_string(), 3),
                ("iot".to_string(), 2),
                ("security".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_stats() {
        assert_eq!(
            stats(&corpus()),
            CorpusStats {
                articles: 3,
                year_span: 5,
                topics: 5,
            }
        );
    }

    #[test]
    fn test_stats_without_years() {
        let corpus = Corpus::load(vec![RecordBuilder::new("1", "A").build()]).unwrap();
        assert_eq!(stats(&corpus).year_span, 0);
        assert_eq!(stats(&corpus).topics, 0);
    }
}
