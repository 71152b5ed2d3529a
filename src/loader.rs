//! Reads the catalog data file into records.
//!
//! The file is the scraper's export: `{"articles": [...]}` (a bare array is
//! accepted too). Only `id` and `title` are required; optional fields that are
//! missing, `null` or of the wrong type degrade to empty values instead of
//! failing the load.

use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::engine::{Corpus, EngineError};
use crate::models::Record;

/// Errors from reading the data file
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid data file: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DataFile {
    Wrapped {
        #[serde(default)]
        articles: Vec<RawArticle>,
    },
    Bare(Vec<RawArticle>),
}

/// One article as it appears in the file, before validation
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawArticle {
    id: Value,
    title: Value,
    authors: Value,
    r#abstract: Value,
    keywords: Value,
    year: Value,
    volume: Value,
    issue: Value,
    #[serde(alias = "pdfUrl")]
    pdf_url: Value,
    #[serde(alias = "articleUrl")]
    article_url: Value,
}

impl RawArticle {
    fn into_record(self, index: usize) -> Result<Record, EngineError> {
        let invalid = |reason: &str| EngineError::InvalidRecord {
            index,
            reason: reason.to_string(),
        };

        let id = match self.id {
            Value::String(s) if !s.trim().is_empty() => s,
            Value::Number(n) => n.to_string(),
            Value::Null => return Err(invalid("missing id")),
            _ => return Err(invalid("id must be a non-empty string")),
        };
        let title = match self.title {
            Value::String(s) => s,
            Value::Null => return Err(invalid("missing title")),
            _ => return Err(invalid("title must be a string")),
        };

        Ok(Record {
            id,
            title,
            authors: string_list(self.authors, &[';']),
            r#abstract: optional_string(self.r#abstract),
            keywords: string_list(self.keywords, &[';', ',']),
            year: optional_int(&self.year),
            volume: optional_int(&self.volume),
            issue: optional_int(&self.issue),
            pdf_url: optional_string(self.pdf_url),
            article_url: optional_string(self.article_url),
        })
    }
}

/// Array of strings, or one delimited string; anything else is empty
fn string_list(value: Value, separators: &[char]) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        Value::String(s) => s
            .split(separators)
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn optional_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    }
}

/// Integer from a number or a numeric string
fn optional_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse the data file contents into records
pub fn parse_articles(json: &str) -> Result<Vec<Record>, LoadError> {
    let raw = match serde_json::from_str::<DataFile>(json)? {
        DataFile::Wrapped { articles } => articles,
        DataFile::Bare(articles) => articles,
    };

    let records = raw
        .into_iter()
        .enumerate()
        .map(|(index, article)| article.into_record(index))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

/// Read and parse the data file at `path`
pub fn load_articles(path: &Path) -> Result<Vec<Record>, LoadError> {
    let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parse_articles(&json)?;
    tracing::debug!(path = %path.display(), records = records.len(), "data file parsed");
    Ok(records)
}

/// Load the data file into a corpus
///
/// A file with no articles gives an empty corpus, which the shell shows as
/// the no-data state.
pub fn load_corpus(path: &Path) -> Result<Corpus, LoadError> {
    let records = load_articles(path)?;
    if records.is_empty() {
        tracing::warn!(path = %path.display(), "data file contains no articles");
        return Ok(Corpus::empty());
    }
    Ok(Corpus::load(records)?)
}
