//! client.rs — Shared query cache
//!
//! One `QueryClient` is owned by the application and handed by reference to
//! every consumer. Each entry holds the last good value (as JSON), the last
//! error, a freshness stamp and a generation counter. A fetch records the
//! generation it was started under; when it resolves against a different
//! generation (cancelled, superseded, removed) its result is dropped.
//! Callers that ask for a key while its fetch is in flight wait for that
//! fetch and share its result.

use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{broadcast, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::key::QueryKey;

pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(60);
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(200);
const EVENT_CAPACITY: usize = 256;

// ── Options ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryOptions {
    /// How long a successful result is served without a network round-trip.
    pub stale_time: Duration,
    /// Extra attempts after a failed fetch. 0 = fail on first error.
    pub retries: u32,
    /// Delay before the first retry; doubles per attempt (capped at 16x).
    pub retry_backoff: Duration,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_time: DEFAULT_STALE_TIME,
            retries: 0,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

// ── Errors and events ───────────────────────────────────────────────

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("fetch failed: {0}")]
    Fetch(String),
    #[error("query was cancelled before it resolved")]
    Cancelled,
    #[error("cached value has unexpected shape: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEventKind {
    Fetching,
    Updated,
    Failed,
    Cancelled,
    Invalidated,
    Removed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEvent {
    pub key: QueryKey,
    pub kind: CacheEventKind,
}

/// Point-in-time view of one cache entry.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<T> {
    pub data: Option<T>,
    pub error: Option<String>,
    pub is_fetching: bool,
    pub is_stale: bool,
}

impl<T> QueryState<T> {
    /// Nothing to show yet and a fetch is outstanding (or about to be).
    pub fn is_loading(&self) -> bool {
        self.data.is_none() && self.error.is_none()
    }
}

// ── Entry ───────────────────────────────────────────────────────────

/// Outcome of an in-flight fetch as seen by callers that joined it.
type Shared = Option<Result<Value, QueryError>>;

enum Start {
    Join(watch::Receiver<Shared>),
    Lead(u64, watch::Sender<Shared>),
}

#[derive(Debug, Default)]
struct QueryEntry {
    data: Option<Value>,
    error: Option<String>,
    updated_at: Option<Instant>,
    invalidated: bool,
    generation: u64,
    fetching: bool,
    inflight: Option<watch::Receiver<Shared>>,
}

impl QueryEntry {
    /// The running fetch, if its owner is still alive.
    fn joinable(&self) -> Option<watch::Receiver<Shared>> {
        match &self.inflight {
            Some(rx) if self.fetching && rx.has_changed().is_ok() => Some(rx.clone()),
            _ => None,
        }
    }

    fn is_fresh(&self, stale_time: Duration, now: Instant) -> bool {
        if self.invalidated || self.data.is_none() {
            return false;
        }
        match self.updated_at {
            Some(at) => now.duration_since(at) < stale_time,
            None => false,
        }
    }
}

// ── Client ──────────────────────────────────────────────────────────

pub struct QueryClient {
    entries: Mutex<HashMap<QueryKey, QueryEntry>>,
    events: broadcast::Sender<CacheEvent>,
    options: QueryOptions,
    // Client-wide: a removed and recreated key never reuses a generation.
    generations: AtomicU64,
}

impl QueryClient {
    pub fn new() -> Self {
        Self::with_options(QueryOptions::default())
    }

    pub fn with_options(options: QueryOptions) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            entries: Mutex::new(HashMap::new()),
            events,
            options,
            generations: AtomicU64::new(0),
        }
    }

    pub fn options(&self) -> QueryOptions {
        self.options
    }

    /// Observe every change made to the cache.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, QueryEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn emit(&self, key: &QueryKey, kind: CacheEventKind) {
        // No subscribers is not an error.
        let _ = self.events.send(CacheEvent { key: key.clone(), kind });
    }

    fn is_current(&self, key: &QueryKey, generation: u64) -> bool {
        self.entries()
            .get(key)
            .map(|e| e.generation == generation)
            .unwrap_or(false)
    }

    /// Serve `key` from cache when fresh, otherwise run `fetcher` and store
    /// its result. While a fetch for `key` is in flight, later callers wait
    /// for it instead of starting their own. Resolution against a newer
    /// generation reports `Cancelled` and leaves the entry untouched.
    pub async fn fetch_query<T, F, Fut, E>(&self, key: &QueryKey, fetcher: F) -> Result<T, QueryError>
    where
        T: Serialize + DeserializeOwned,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let start = {
            let mut entries = self.entries();
            let entry = entries.entry(key.clone()).or_default();
            if entry.is_fresh(self.options.stale_time, Instant::now()) {
                if let Some(data) = &entry.data {
                    debug!(%key, "query cache hit");
                    return decode(data.clone());
                }
            }
            match entry.joinable() {
                Some(rx) => Start::Join(rx),
                None => {
                    let (tx, rx) = watch::channel(None);
                    entry.generation = self.next_generation();
                    entry.fetching = true;
                    entry.inflight = Some(rx);
                    Start::Lead(entry.generation, tx)
                }
            }
        };
        let (generation, tx) = match start {
            Start::Join(rx) => {
                debug!(%key, "joining in-flight fetch");
                return join_inflight(rx).await;
            }
            Start::Lead(generation, tx) => (generation, tx),
        };
        debug!(%key, generation, "query cache miss, fetching");
        self.emit(key, CacheEventKind::Fetching);

        let result = self.run_with_retries(key, generation, &fetcher).await;

        let resolved = match result {
            Ok(value) => serde_json::to_value(&value)
                .map(|json| (value, json))
                .map_err(|e| QueryError::Decode(e.to_string())),
            Err(message) => Err(QueryError::Fetch(message)),
        };

        let outcome = {
            let mut entries = self.entries();
            match entries.get_mut(key) {
                Some(entry) if entry.generation == generation => {
                    entry.fetching = false;
                    entry.inflight = None;
                    match resolved {
                        Ok((value, json)) => {
                            entry.data = Some(json.clone());
                            entry.error = None;
                            entry.invalidated = false;
                            entry.updated_at = Some(Instant::now());
                            tx.send_replace(Some(Ok(json)));
                            Ok(value)
                        }
                        Err(e) => {
                            if let QueryError::Fetch(message) = &e {
                                entry.error = Some(message.clone());
                            }
                            tx.send_replace(Some(Err(e.clone())));
                            Err(e)
                        }
                    }
                }
                _ => {
                    tx.send_replace(Some(Err(QueryError::Cancelled)));
                    Err(QueryError::Cancelled)
                }
            }
        };

        match &outcome {
            Ok(_) => {
                info!(%key, "query resolved");
                self.emit(key, CacheEventKind::Updated);
            }
            Err(QueryError::Cancelled) => {
                warn!(%key, generation, "discarding result of superseded fetch");
            }
            Err(e) => {
                info!(%key, error = %e, "query failed");
                self.emit(key, CacheEventKind::Failed);
            }
        }
        outcome
    }

    async fn run_with_retries<T, F, Fut, E>(
        &self,
        key: &QueryKey,
        generation: u64,
        fetcher: &F,
    ) -> Result<T, String>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let max_attempts = 1 + self.options.retries;
        let mut last_err = String::new();

        for attempt in 0..max_attempts {
            if attempt > 0 {
                if !self.is_current(key, generation) {
                    break;
                }
                let backoff = self.options.retry_backoff * (1u32 << (attempt - 1).min(4));
                debug!(%key, attempt = attempt + 1, max_attempts, ?backoff, "retrying query");
                tokio::time::sleep(backoff).await;
            }
            match fetcher().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    last_err = e.to_string();
                    warn!(%key, attempt = attempt + 1, error = %last_err, "query attempt failed");
                }
            }
        }

        Err(last_err)
    }

    /// Current cached value, if any and if it decodes as `T`.
    pub fn get_query_data<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let data = self.entries().get(key)?.data.clone()?;
        match decode(data) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(%key, error = %e, "cached value does not match requested type");
                None
            }
        }
    }

    /// Overwrite the cached value. The entry becomes fresh; an outstanding
    /// fetch is not cancelled.
    pub fn set_query_data<T: Serialize>(&self, key: &QueryKey, value: &T) -> Result<(), QueryError> {
        let json = serde_json::to_value(value).map_err(|e| QueryError::Decode(e.to_string()))?;
        {
            let mut entries = self.entries();
            let entry = entries.entry(key.clone()).or_default();
            entry.data = Some(json);
            entry.error = None;
            entry.invalidated = false;
            entry.updated_at = Some(Instant::now());
        }
        self.emit(key, CacheEventKind::Updated);
        Ok(())
    }

    /// Replace the cached value with `f(current)`. When `f` returns `None`
    /// the entry is left as it was.
    pub fn update_query_data<T, F>(&self, key: &QueryKey, f: F) -> Result<Option<T>, QueryError>
    where
        T: Serialize + DeserializeOwned + Clone,
        F: FnOnce(Option<T>) -> Option<T>,
    {
        let current = self.get_query_data::<T>(key);
        match f(current) {
            Some(next) => {
                self.set_query_data(key, &next)?;
                Ok(Some(next))
            }
            None => Ok(None),
        }
    }

    pub fn query_state<T: DeserializeOwned>(&self, key: &QueryKey) -> QueryState<T> {
        let entries = self.entries();
        match entries.get(key) {
            Some(entry) => QueryState {
                data: entry.data.clone().and_then(|d| decode(d).ok()),
                error: entry.error.clone(),
                is_fetching: entry.fetching,
                is_stale: !entry.is_fresh(self.options.stale_time, Instant::now()),
            },
            None => QueryState {
                data: None,
                error: None,
                is_fetching: false,
                is_stale: true,
            },
        }
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.entries().get(key).map(|e| e.fetching).unwrap_or(false)
    }

    /// Abandon outstanding fetches under `prefix`. Their results will be
    /// discarded when they resolve; cached data is kept.
    pub fn cancel_queries(&self, prefix: &QueryKey) -> usize {
        let cancelled: Vec<QueryKey> = {
            let mut entries = self.entries();
            entries
                .iter_mut()
                .filter(|(k, e)| e.fetching && k.starts_with(prefix))
                .map(|(k, e)| {
                    e.generation = self.next_generation();
                    e.fetching = false;
                    e.inflight = None;
                    k.clone()
                })
                .collect()
        };
        for key in &cancelled {
            debug!(%key, "query cancelled");
            self.emit(key, CacheEventKind::Cancelled);
        }
        cancelled.len()
    }

    /// Mark entries under `prefix` stale so the next fetch goes to network.
    pub fn invalidate_queries(&self, prefix: &QueryKey) -> usize {
        let invalidated: Vec<QueryKey> = {
            let mut entries = self.entries();
            entries
                .iter_mut()
                .filter(|(k, _)| k.starts_with(prefix))
                .map(|(k, e)| {
                    e.invalidated = true;
                    k.clone()
                })
                .collect()
        };
        for key in &invalidated {
            debug!(%key, "query invalidated");
            self.emit(key, CacheEventKind::Invalidated);
        }
        invalidated.len()
    }

    /// Drop entries under `prefix`. Outstanding fetches for them resolve as
    /// cancelled.
    pub fn remove_queries(&self, prefix: &QueryKey) -> usize {
        let removed: Vec<QueryKey> = {
            let mut entries = self.entries();
            let keys: Vec<QueryKey> = entries.keys().filter(|k| k.starts_with(prefix)).cloned().collect();
            for k in &keys {
                entries.remove(k);
            }
            keys
        };
        for key in &removed {
            self.emit(key, CacheEventKind::Removed);
        }
        removed.len()
    }

    pub fn clear(&self) {
        let removed: Vec<QueryKey> = self.entries().drain().map(|(k, _)| k).collect();
        for key in &removed {
            self.emit(key, CacheEventKind::Removed);
        }
    }

    pub fn keys(&self) -> Vec<QueryKey> {
        self.entries().keys().cloned().collect()
    }
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for another caller's fetch of the same key. A fetch whose owner
/// went away without resolving reads as cancelled.
async fn join_inflight<T: DeserializeOwned>(mut rx: watch::Receiver<Shared>) -> Result<T, QueryError> {
    let shared = match rx.wait_for(Option::is_some).await {
        Ok(shared) => shared.clone(),
        Err(_) => return Err(QueryError::Cancelled),
    };
    match shared {
        Some(Ok(json)) => decode(json),
        Some(Err(e)) => Err(e),
        None => Err(QueryError::Cancelled),
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, QueryError> {
    serde_json::from_value(value).map_err(|e| QueryError::Decode(e.to_string()))
}
