//! Debounced query handling that keeps one current result set.
//!
//! Free-text changes wait for a quiet period before searching; each new
//! keystroke cancels the pending search and restarts the timer. Filter
//! changes re-run the search immediately.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

use super::{Corpus, EngineError, FilterSet, FilterValue, Matcher};
use crate::models::ResultSet;

/// Quiet period before a typed query is searched
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// Receives every new result set the pipeline publishes
///
/// Notifications arrive in publish order, one at a time. An observer may
/// read the pipeline but must not change its query or filters.
pub trait ResultObserver: Send + Sync {
    fn on_results(&self, results: &ResultSet);
}

impl<F> ResultObserver for F
where
    F: Fn(&ResultSet) + Send + Sync,
{
    fn on_results(&self, results: &ResultSet) {
        self(results)
    }
}

struct PipelineState {
    corpus: Corpus,
    matcher: Matcher,
    filters: FilterSet,
    query: String,
    results: Arc<ResultSet>,
    observers: Vec<Arc<dyn ResultObserver>>,
    searches: u64,
}

impl PipelineState {
    fn compute(&mut self) -> ResultSet {
        if self.corpus.is_empty() {
            return ResultSet::no_data(self.query.as_str());
        }

        self.searches += 1;
        let matched = self.matcher.search(&self.corpus, &self.query);
        ResultSet::new(self.query.as_str(), self.filters.apply(matched))
    }
}

struct PendingSearch {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct PendingSlot {
    generation: u64,
    current: Option<PendingSearch>,
}

/// Owns the current query, filters and result set for one session
///
/// Clones are handles to the same pipeline. Independent pipelines share
/// nothing.
#[derive(Clone)]
pub struct QueryPipeline {
    state: Arc<Mutex<PipelineState>>,
    pending: Arc<Mutex<PendingSlot>>,
    /// Held from compute through notify so observers see sets in store order
    publish: Arc<Mutex<()>>,
    debounce: Duration,
}

impl std::fmt::Debug for QueryPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock_state();
        f.debug_struct("QueryPipeline")
            .field("records", &state.corpus.len())
            .field("query", &state.query)
            .field("results", &state.results.len())
            .field("debounce", &self.debounce)
            .finish()
    }
}

impl QueryPipeline {
    /// Build a pipeline and compute the initial, unfiltered result set
    pub fn new(corpus: Corpus, matcher: Matcher, filters: FilterSet) -> Self {
        let mut state = PipelineState {
            corpus,
            matcher,
            filters,
            query: String::new(),
            results: Arc::new(ResultSet::default()),
            observers: Vec::new(),
            searches: 0,
        };
        state.results = Arc::new(state.compute());

        Self {
            state: Arc::new(Mutex::new(state)),
            pending: Arc::new(Mutex::new(PendingSlot::default())),
            publish: Arc::new(Mutex::new(())),
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    /// Set the quiet period for typed queries
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Register an observer for future result sets
    pub fn subscribe(&self, observer: impl ResultObserver + 'static) {
        self.lock_state().observers.push(Arc::new(observer));
    }

    /// Record new query text and schedule a search after the quiet period
    ///
    /// A search already scheduled is cancelled. Outside a tokio runtime there
    /// is no timer, so the search runs immediately.
    pub fn set_query(&self, text: impl Into<String>) {
        self.lock_state().query = text.into();

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                tracing::debug!("no async runtime, searching without debounce");
                self.cancel_pending();
                self.refresh();
                return;
            }
        };

        let mut slot = self.lock_pending();
        if let Some(previous) = slot.current.take() {
            previous.handle.abort();
        }
        slot.generation += 1;
        let generation = slot.generation;

        let pipeline = self.clone();
        let delay = self.debounce;
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if pipeline.claim(generation) {
                pipeline.refresh();
            }
        });
        slot.current = Some(PendingSearch { generation, handle });
    }

    /// Change one filter and re-run the search immediately
    ///
    /// Rejected changes leave the filters and result set untouched.
    pub fn set_filter(&self, key: &str, value: Option<FilterValue>) -> Result<(), EngineError> {
        self.lock_state().filters.set_filter(key, value)?;
        self.refresh();
        Ok(())
    }

    /// Clear every filter and re-run the search immediately
    pub fn reset_filters(&self) {
        self.lock_state().filters.reset();
        self.refresh();
    }

    /// Run a scheduled search now instead of waiting for the timer
    ///
    /// Returns `false` if nothing was pending.
    pub fn flush(&self) -> bool {
        if self.cancel_pending() {
            self.refresh();
            true
        } else {
            false
        }
    }

    pub fn has_pending(&self) -> bool {
        self.lock_pending().current.is_some()
    }

    /// The current result set
    pub fn get_results(&self) -> Arc<ResultSet> {
        Arc::clone(&self.lock_state().results)
    }

    /// Latest query text, which may not have been searched yet
    pub fn query(&self) -> String {
        self.lock_state().query.clone()
    }

    /// Snapshot of the filter set
    pub fn filters(&self) -> FilterSet {
        self.lock_state().filters.clone()
    }

    pub fn corpus(&self) -> Corpus {
        self.lock_state().corpus.clone()
    }

    /// Number of times the matcher has run
    pub fn search_count(&self) -> u64 {
        self.lock_state().searches
    }

    /// Recompute the result set from the current query and filters, then notify observers
    fn refresh(&self) -> Arc<ResultSet> {
        let _publishing = self.publish.lock().unwrap_or_else(PoisonError::into_inner);
        let (results, observers) = {
            let mut state = self.lock_state();
            let results = Arc::new(state.compute());
            state.results = Arc::clone(&results);
            (results, state.observers.clone())
        };

        tracing::debug!(
            query = %results.query,
            results = results.len(),
            no_data = results.no_data,
            "result set published"
        );

        for observer in &observers {
            observer.on_results(&results);
        }
        results
    }

    /// Take the pending search if it is still the one scheduled as `generation`
    fn claim(&self, generation: u64) -> bool {
        let mut slot = self.lock_pending();
        match &slot.current {
            Some(pending) if pending.generation == generation => {
                slot.current = None;
                true
            }
            _ => false,
        }
    }

    fn cancel_pending(&self) -> bool {
        match self.lock_pending().current.take() {
            Some(pending) => {
                pending.handle.abort();
                true
            }
            None => false,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, PipelineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_pending(&self) -> MutexGuard<'_, PendingSlot> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
