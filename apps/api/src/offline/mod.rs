//! Offline cache strategy: the service-worker lifecycle as an explicit
//! state machine.
//!
//! `Registration` owns the versioned cache stores, the active worker and at
//! most one waiting worker. Transitions: install → (wait) → activate →
//! superseded. Steady state is the network-first `fetch` decision.

pub mod network;
pub mod storage;
pub mod worker;

pub use network::{FetchRequest, FetchResponse, HttpNetwork, Network, NetworkError};
pub use storage::{CacheStorage, CacheStore, CachedResponse};
pub use worker::{CacheConfig, CacheError, FetchError, Registration, WorkerState};
