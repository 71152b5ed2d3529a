//! Immutable in-memory record store.

use std::collections::HashMap;
use std::sync::Arc;

use super::EngineError;
use crate::models::Record;

/// The records available for the lifetime of a session, in load order
///
/// There is no mutation after [`Corpus::load`]; clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    records: Arc<Vec<Arc<Record>>>,
    by_id: Arc<HashMap<String, usize>>,
}

impl Corpus {
    /// Load the corpus once
    ///
    /// Fails with [`EngineError::EmptyCorpus`] for zero records, and rejects
    /// records with a blank id or an id seen earlier in the input.
    pub fn load(records: Vec<Record>) -> Result<Self, EngineError> {
        if records.is_empty() {
            return Err(EngineError::EmptyCorpus);
        }

        let mut by_id = HashMap::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            if record.id.trim().is_empty() {
                return Err(EngineError::InvalidRecord {
                    index,
                    reason: "id must be a non-empty string".to_string(),
                });
            }
            if by_id.insert(record.id.clone(), index).is_some() {
                return Err(EngineError::DuplicateId(record.id.clone()));
            }
        }

        tracing::info!("Loaded {} records into corpus", records.len());

        Ok(Self {
            records: Arc::new(records.into_iter().map(Arc::new).collect()),
            by_id: Arc::new(by_id),
        })
    }

    /// The empty placeholder used when loading failed with no data
    pub fn empty() -> Self {
        Self::default()
    }

    /// All records in load order
    pub fn all(&self) -> &[Arc<Record>] {
        &self.records
    }

    /// Look up a record by id
    pub fn get(&self, id: &str) -> Option<&Arc<Record>> {
        self.by_id.get(id).map(|&index| &self.records[index])
    }

    /// Load-order position of a record
    pub fn position(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordBuilder;

    #[test]
    fn test_load_rejects_empty_input() {
        assert_eq!(Corpus::load(Vec::new()).unwrap_err(), EngineError::EmptyCorpus);
    }

    #[test]
    fn test_load_keeps_input_order() {
        let corpus = Corpus::load(vec![
            RecordBuilder::new("b", "Second").build(),
            RecordBuilder::new("a", "First").build(),
        ])
        .unwrap();

        let ids: Vec<&str> = corpus.all().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(corpus.position("a"), Some(1));
        assert_eq!(corpus.get("b").map(|r| r.title.as_str()), Some("Second"));
        assert!(corpus.get("missing").is_none());
    }

    #[test]
    fn test_load_rejects_duplicate_ids() {
        let result = Corpus::load(vec![
            RecordBuilder::new("a", "One").build(),
            RecordBuilder::new("a", "Two").build(),
        ]);
        assert_eq!(result.unwrap_err(), EngineError::DuplicateId("a".to_string()));
    }

    #[test]
    fn test_load_rejects_blank_id() {
        let result = Corpus::load(vec![RecordBuilder::new("  ", "Nameless").build()]);
        assert!(matches!(result, Err(EngineError::InvalidRecord { index: 0, .. })));
    }

    #[test]
    fn test_clones_share_records() {
        let corpus = Corpus::load(vec![RecordBuilder::new("a", "One").build()]).unwrap();
        let clone = corpus.clone();
        assert!(Arc::ptr_eq(&corpus.all()[0], &clone.all()[0]));
    }

    #[test]
    fn test_empty_placeholder() {
        let corpus = Corpus::empty();
        assert!(corpus.is_empty());
        assert!(corpus.all().is_empty());
    }
}
