use thiserror::Error;
use tracing::{debug, info, warn};

use super::network::{FetchRequest, FetchResponse, Network, NetworkError};
use super::storage::{CacheStorage, CacheStore};

pub const CACHE_VERSION: &str = "orientation-era-v1";
pub const EXCLUDED_PREFIX: &str = "/api/";
pub const SKIP_WAITING_MESSAGE: &str = "skipWaiting";

/// Cache key of the root document, served to offline navigations that miss.
const ROOT_DOCUMENT: &str = "/";

const STATIC_ASSETS: [&str; 7] = [
    "/",
    "/index.html",
    "/manifest.json",
    "/favicon.svg",
    "/icons/icon.svg",
    "/icons/icon-192.svg",
    "/icons/icon-512.svg",
];

/// Installing has no variant: it spans the `install` call, which holds the
/// registration exclusively, and a worker only exists once its precache
/// succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    WaitingToActivate,
    Active,
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub version: String,
    pub static_assets: Vec<String>,
    pub excluded_prefix: String,
    /// Activate right after install even while an older worker controls clients.
    pub skip_waiting_on_install: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            version: CACHE_VERSION.to_string(),
            static_assets: STATIC_ASSETS.iter().map(|s| s.to_string()).collect(),
            excluded_prefix: EXCLUDED_PREFIX.to_string(),
            skip_waiting_on_install: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Worker {
    config: CacheConfig,
    state: WorkerState,
    skip_waiting: bool,
}

impl Worker {
    pub fn version(&self) -> &str {
        &self.config.version
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("precache of {path} failed: {source}")]
    Precache {
        path: String,
        #[source]
        source: NetworkError,
    },

    #[error("precache of {path} returned status {status}")]
    PrecacheStatus { path: String, status: u16 },
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("offline and no cached response for {path}")]
    Offline {
        path: String,
        #[source]
        source: NetworkError,
    },
}

/// Versioned cache stores plus the worker lifecycle that manages them.
pub struct Registration<N> {
    network: N,
    storage: CacheStorage,
    active: Option<Worker>,
    waiting: Option<Worker>,
    superseded: Vec<Worker>,
    /// Version of the worker controlling open clients, if any.
    controller: Option<String>,
    clients_released: bool,
}

impl<N: Network> Registration<N> {
    pub fn new(network: N) -> Self {
        Self::with_storage(network, CacheStorage::default())
    }

    /// Starts from stores left behind by an earlier session.
    pub fn with_storage(network: N, storage: CacheStorage) -> Self {
        Self {
            network,
            storage,
            active: None,
            waiting: None,
            superseded: Vec::new(),
            controller: None,
            clients_released: false,
        }
    }

    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    pub fn active(&self) -> Option<&Worker> {
        self.active.as_ref()
    }

    pub fn waiting(&self) -> Option<&Worker> {
        self.waiting.as_ref()
    }

    pub fn superseded(&self) -> &[Worker] {
        &self.superseded
    }

    pub fn controller(&self) -> Option<&str> {
        self.controller.as_deref()
    }

    /// Precaches every static asset into a fresh store, then moves the new
    /// worker to waiting (and on to active when nothing holds it back).
    ///
    /// All or nothing: if any asset fails, no store is written and the new
    /// worker is discarded.
    pub async fn install(&mut self, config: CacheConfig) -> Result<WorkerState, CacheError> {
        info!("Installing cache {}", config.version);

        let mut staged = CacheStore::default();
        for path in &config.static_assets {
            let response = self
                .network
                .fetch(&FetchRequest::get(path.as_str()))
                .await
                .map_err(|source| CacheError::Precache {
                    path: path.clone(),
                    source,
                })?;

            if !response.is_success() {
                return Err(CacheError::PrecacheStatus {
                    path: path.clone(),
                    status: response.status,
                });
            }
            staged.put(path.as_str(), response);
        }

        debug!("Precached {} assets", staged.len());
        self.storage.commit(&config.version, staged);

        let skip_waiting = config.skip_waiting_on_install;
        if let Some(previous) = self.waiting.replace(Worker {
            config,
            state: WorkerState::WaitingToActivate,
            skip_waiting,
        }) {
            debug!("Replacing waiting worker {}", previous.version());
        }

        if self.try_activate() {
            Ok(WorkerState::Active)
        } else {
            Ok(WorkerState::WaitingToActivate)
        }
    }

    /// Every client controlled by the old worker has closed. Only counts for
    /// a worker that is already waiting.
    pub fn release_clients(&mut self) -> bool {
        if self.waiting.is_none() {
            debug!("No waiting worker, ignoring client release");
            return false;
        }
        self.clients_released = true;
        self.try_activate()
    }

    /// Messages go to the waiting worker. Returns whether it activated.
    pub fn post_message(&mut self, message: &str) -> bool {
        if message != SKIP_WAITING_MESSAGE {
            debug!("Ignoring message {:?}", message);
            return false;
        }

        match self.waiting.as_mut() {
            Some(worker) => {
                worker.skip_waiting = true;
                self.try_activate()
            }
            None => false,
        }
    }

    /// Network-first fetch.
    ///
    /// Requests under the excluded prefix always go to the network and never
    /// touch the cache. Anything else is written to the current store on
    /// success, and served from it (or the root document, for HTML
    /// navigations) when the network fails.
    pub async fn fetch(&mut self, request: &FetchRequest) -> Result<FetchResponse, FetchError> {
        let Some(active) = self.active.as_ref() else {
            return Ok(self.network.fetch(request).await?);
        };

        if request.path.starts_with(&active.config.excluded_prefix) {
            return Ok(self.network.fetch(request).await?);
        }

        let version = active.config.version.clone();
        match self.network.fetch(request).await {
            Ok(response) => {
                self.storage
                    .open(&version)
                    .put(request.key(), response.clone());
                Ok(response)
            }
            Err(source) => {
                warn!("Network failed for {}: {}", request.path, source);
                self.cached_fallback(&version, request)
                    .ok_or_else(|| FetchError::Offline {
                        path: request.path.clone(),
                        source,
                    })
            }
        }
    }

    fn cached_fallback(&self, version: &str, request: &FetchRequest) -> Option<FetchResponse> {
        let store = self.storage.get(version)?;
        if let Some(hit) = store.get(request.key()) {
            return Some(hit.response.clone());
        }
        if request.accepts_html() {
            return store.get(ROOT_DOCUMENT).map(|hit| hit.response.clone());
        }
        None
    }

    fn try_activate(&mut self) -> bool {
        let Some(worker) = self.waiting.take() else {
            return false;
        };

        let held_back = self.active.is_some() && !self.clients_released;
        if held_back && !worker.skip_waiting {
            debug!("Worker {} waiting for clients to close", worker.version());
            self.waiting = Some(worker);
            return false;
        }

        self.activate(worker);
        true
    }

    fn activate(&mut self, mut worker: Worker) {
        for name in self.storage.names() {
            if name != worker.version() {
                info!("Deleting old cache {}", name);
                self.storage.delete(&name);
            }
        }

        if let Some(mut previous) = self.active.take() {
            previous.state = WorkerState::Superseded;
            self.superseded.push(previous);
        }

        worker.state = WorkerState::Active;
        self.controller = Some(worker.version().to_string());
        self.clients_released = false;
        info!("Cache {} active", worker.version());
        self.active = Some(worker);
    }
}
