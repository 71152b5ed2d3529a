//! Exact-equality filters on the discrete fields of a record.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use super::{Corpus, EngineError};
use crate::models::{MatchResult, Record};

/// A discrete record field that can be filtered on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKey {
    Volume,
    Issue,
    Year,
}

/// Display order of the selectable values for a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionOrder {
    Ascending,
    Descending,
}

impl FilterKey {
    pub const ALL: [FilterKey; 3] = [FilterKey::Volume, FilterKey::Issue, FilterKey::Year];

    pub fn name(&self) -> &'static str {
        match self {
            FilterKey::Volume => "volume",
            FilterKey::Issue => "issue",
            FilterKey::Year => "year",
        }
    }

    /// Human label for a selectable value
    pub fn label(&self, value: i64) -> String {
        match self {
            FilterKey::Volume => format!("Vol. {}", value),
            FilterKey::Issue => format!("Issue {}", value),
            FilterKey::Year => value.to_string(),
        }
    }

    /// Newest volumes and years first; issues count up
    pub fn option_order(&self) -> OptionOrder {
        match self {
            FilterKey::Volume | FilterKey::Year => OptionOrder::Descending,
            FilterKey::Issue => OptionOrder::Ascending,
        }
    }

    /// The record's value for this key
    pub fn value_of(&self, record: &Record) -> Option<i64> {
        match self {
            FilterKey::Volume => record.volume,
            FilterKey::Issue => record.issue,
            FilterKey::Year => record.year,
        }
    }
}

impl std::fmt::Display for FilterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for FilterKey {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "volume" | "vol" => Ok(FilterKey::Volume),
            "issue" | "no" => Ok(FilterKey::Issue),
            "year" => Ok(FilterKey::Year),
            _ => Err(EngineError::UnknownFilterKey(s.to_string())),
        }
    }
}

/// A requested filter value, before type checking against its key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Integer(i64),
    Text(String),
}

impl FilterValue {
    /// Interpret raw user input: integers become `Integer`, anything else `Text`
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        raw.parse::<i64>()
            .map(FilterValue::Integer)
            .unwrap_or_else(|_| FilterValue::Text(raw.to_string()))
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Integer(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        FilterValue::Integer(i64::from(value))
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl std::fmt::Display for FilterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterValue::Integer(v) => write!(f, "{}", v),
            FilterValue::Text(s) => write!(f, "{:?}", s),
        }
    }
}

/// Selected value per declared key; `None` means unconstrained
pub type FilterState = BTreeMap<FilterKey, Option<i64>>;

/// The active filters and the keys they may use
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    state: FilterState,
}

impl FilterSet {
    /// Declare the recognized keys, all starting unconstrained
    pub fn new(keys: impl IntoIterator<Item = FilterKey>) -> Self {
        Self {
            state: keys.into_iter().map(|key| (key, None)).collect(),
        }
    }

    /// Keys declared at construction
    pub fn keys(&self) -> impl Iterator<Item = FilterKey> + '_ {
        self.state.keys().copied()
    }

    /// Set or clear (`None`) the constraint for `key`
    ///
    /// On error the previous state is kept.
    pub fn set_filter(&mut self, key: &str, value: Option<FilterValue>) -> Result<(), EngineError> {
        let key = self.declared_key(key)?;

        let value = match value {
            None => None,
            Some(FilterValue::Integer(v)) => Some(v),
            Some(FilterValue::Text(text)) => {
                tracing::warn!(key = %key, value = %text, "rejected non-integer filter value");
                return Err(EngineError::InvalidFilterValue {
                    key: key.to_string(),
                    reason: format!("expected an integer, got {:?}", text),
                });
            }
        };

        tracing::debug!(key = %key, value = ?value, "filter changed");
        self.state.insert(key, value);
        Ok(())
    }

    /// Current constraint for `key`
    pub fn get(&self, key: FilterKey) -> Option<i64> {
        self.state.get(&key).copied().flatten()
    }

    /// Clear every constraint
    pub fn reset(&mut self) {
        for value in self.state.values_mut() {
            *value = None;
        }
    }

    pub fn has_active_filters(&self) -> bool {
        self.state.values().any(Option::is_some)
    }

    /// Snapshot of the constraints currently in force
    pub fn active(&self) -> Vec<(FilterKey, i64)> {
        self.state
            .iter()
            .filter_map(|(key, value)| value.map(|v| (*key, v)))
            .collect()
    }

    /// Copy of the full state, including unconstrained keys
    pub fn state(&self) -> FilterState {
        self.state.clone()
    }

    /// Whether a record satisfies every active constraint
    pub fn accepts(&self, record: &Record) -> bool {
        self.state.iter().all(|(key, wanted)| match wanted {
            None => true,
            Some(v) => key.value_of(record) == Some(*v),
        })
    }

    /// Keep only results whose record satisfies every active constraint
    pub fn apply(&self, results: Vec<MatchResult>) -> Vec<MatchResult> {
        if !self.has_active_filters() {
            return results;
        }
        results
            .into_iter()
            .filter(|result| self.accepts(&result.record))
            .collect()
    }

    /// Distinct values of `key` present in the corpus, in display order
    pub fn options(&self, key: FilterKey, corpus: &Corpus) -> Vec<i64> {
        let distinct: BTreeSet<i64> = corpus
            .all()
            .iter()
            .filter_map(|record| key.value_of(record))
            .collect();

        match key.option_order() {
            OptionOrder::Ascending => distinct.into_iter().collect(),
            OptionOrder::Descending => distinct.into_iter().rev().collect(),
        }
    }

    fn declared_key(&self, key: &str) -> Result<FilterKey, EngineError> {
        let parsed: FilterKey = key
            .parse()
            .map_err(|_| EngineError::UnknownFilterKey(key.to_string()))?;
        if self.state.contains_key(&parsed) {
            Ok(parsed)
        } else {
            Err(EngineError::UnknownFilterKey(key.to_string()))
        }
    }
}
