//! gift-query — shared query cache for the gift shop client
//!
//! Results are cached per composite [`QueryKey`]. A single [`QueryClient`]
//! is shared by every view so two views observing the same key always see
//! the same value, including optimistic writes.

mod client;
mod key;

pub use client::{
    CacheEvent, CacheEventKind, QueryClient, QueryError, QueryOptions, QueryState,
    DEFAULT_RETRY_BACKOFF, DEFAULT_STALE_TIME,
};
pub use key::{KeyPart, QueryKey};
