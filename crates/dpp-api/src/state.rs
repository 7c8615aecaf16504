//! # Shared Service State
//!
//! Shared state for the API service: the in-memory application store,
//! the application number generator, the clock, and runtime configuration.
//!
//! ## Concurrency Model
//!
//! [`Store`] wraps a `HashMap` in an `Arc<RwLock>`. Reads take a shared
//! lock, writes an exclusive one. `insert_new` and `try_update` perform
//! their check and mutation under a single write lock, so application
//! number uniqueness and status transition validation never race.
//!
//! ## Persistence
//!
//! The store is authoritative at runtime. When a Postgres pool is
//! configured, writes go through to the database and the store is
//! hydrated from it on startup (see [`AppState::hydrate_from_db`]).

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;
use sqlx::PgPool;

use dpp_core::{ApplicationNumber, Clock, SystemClock};
use dpp_state::{ApplicationRecord, NumberGenerator, NumberGeneratorError};

use crate::middleware::rate_limit::RateLimitConfig;

// ─── Generic Store ──────────────────────────────────────────────────────────

/// Thread-safe, keyed in-memory store.
///
/// `Clone` is shallow: clones share the same underlying map.
#[derive(Debug)]
pub struct Store<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    data: Arc<RwLock<HashMap<K, V>>>,
}

impl<K, V> Clone for Store<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<K, V> Default for Store<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Store<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    /// A store holding no applications.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert or replace a value.
    pub fn insert(&self, key: K, value: V) {
        self.data.write().insert(key, value);
    }

    /// Insert a value only if the key is not already present.
    ///
    /// Returns `true` if the value was inserted. The check and insert
    /// happen under one write lock, so two concurrent calls with the
    /// same key cannot both succeed.
    pub fn insert_new(&self, key: K, value: V) -> bool {
        let mut data = self.data.write();
        if data.contains_key(&key) {
            return false;
        }
        data.insert(key, value);
        true
    }

    /// Get a clone of the value for a key.
    pub fn get(&self, key: &K) -> Option<V> {
        self.data.read().get(key).cloned()
    }

    /// List clones of all values, in arbitrary order.
    pub fn list(&self) -> Vec<V> {
        self.data.read().values().cloned().collect()
    }

    /// Mutate the value for a key in place, returning the updated value.
    ///
    /// Returns `None` if the key is absent.
    #[allow(dead_code)]
    pub fn update<F>(&self, key: &K, f: F) -> Option<V>
    where
        F: FnOnce(&mut V),
    {
        let mut data = self.data.write();
        let value = data.get_mut(key)?;
        f(value);
        Some(value.clone())
    }

    /// Mutate the value for a key with a fallible closure.
    ///
    /// The closure runs under the write lock, so read-validate-update
    /// sequences are atomic. Returns `None` if the key is absent,
    /// otherwise the closure's result.
    pub fn try_update<F, R, E>(&self, key: &K, f: F) -> Option<Result<R, E>>
    where
        F: FnOnce(&mut V) -> Result<R, E>,
    {
        let mut data = self.data.write();
        let value = data.get_mut(key)?;
        Some(f(value))
    }

    /// Remove a value, returning it if present.
    #[allow(dead_code)]
    pub fn remove(&self, key: &K) -> Option<V> {
        self.data.write().remove(key)
    }

    /// Check whether a key is present.
    pub fn contains(&self, key: &K) -> bool {
        self.data.read().contains_key(key)
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// True when no applications are held.
    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

// ─── Configuration ──────────────────────────────────────────────────────────

/// Runtime configuration for the API service.
///
/// Custom `Debug` redacts the auth token to prevent credential leakage
/// in log output.
#[derive(Clone)]
pub struct AppConfig {
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Shared bearer token secret. `None` disables authentication
    /// (development mode: every request runs as admin).
    pub auth_token: Option<String>,
    /// Prefix for generated application numbers.
    pub number_prefix: String,
    /// Per-client rate limit applied to the whole API surface.
    pub rate_limit: RateLimitConfig,
    /// Origin allowed by the CORS layer (the web frontend).
    pub frontend_origin: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .field("number_prefix", &self.number_prefix)
            .field("rate_limit", &self.rate_limit)
            .field("frontend_origin", &self.frontend_origin)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
            number_prefix: "DESH".to_string(),
            rate_limit: RateLimitConfig::default(),
            frontend_origin: "http://localhost:3000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Read configuration from the `DPP_*` environment variables.
    ///
    /// Variables (all optional):
    /// - `DPP_PORT` (default: 8080)
    /// - `DPP_AUTH_TOKEN` (absent = auth disabled)
    /// - `DPP_NUMBER_PREFIX` (default: `DESH`)
    /// - `DPP_RATE_LIMIT_MAX` (default: 100)
    /// - `DPP_RATE_LIMIT_WINDOW_SECS` (default: 900)
    /// - `DPP_FRONTEND_ORIGIN` (default: `http://localhost:3000`)
    /// - `DPP_REQUEST_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_parsed("DPP_PORT", defaults.port),
            auth_token: std::env::var("DPP_AUTH_TOKEN").ok().filter(|t| !t.is_empty()),
            number_prefix: std::env::var("DPP_NUMBER_PREFIX")
                .unwrap_or(defaults.number_prefix),
            rate_limit: RateLimitConfig {
                max_requests: env_parsed(
                    "DPP_RATE_LIMIT_MAX",
                    defaults.rate_limit.max_requests,
                ),
                window_secs: env_parsed(
                    "DPP_RATE_LIMIT_WINDOW_SECS",
                    defaults.rate_limit.window_secs,
                ),
            },
            frontend_origin: std::env::var("DPP_FRONTEND_ORIGIN")
                .unwrap_or(defaults.frontend_origin),
            request_timeout_secs: env_parsed(
                "DPP_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            ),
        }
    }
}

fn env_parsed<T: std::str::FromStr>(var: &str, default: T) -> T {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ─── AppState ───────────────────────────────────────────────────────────────

/// Shared application state, cloned into every handler.
///
/// Cloning is cheap: stores and the generator are `Arc`-backed.
#[derive(Clone)]
pub struct AppState {
    /// All submitted applications, keyed by application number.
    pub applications: Store<ApplicationNumber, ApplicationRecord>,
    /// Generator for new application numbers.
    pub number_gen: Arc<NumberGenerator>,
    /// Clock used for submission and status timestamps.
    pub clock: Arc<dyn Clock>,
    /// Optional Postgres pool. `None` means in-memory-only mode.
    pub db_pool: Option<PgPool>,
    /// Runtime configuration.
    pub config: AppConfig,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("applications", &self.applications.len())
            .field("db_pool", &self.db_pool.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create state with default configuration, the system clock, and no
    /// database. Suitable for tests and local development.
    pub fn new() -> Self {
        Self::with_parts(AppConfig::default(), Arc::new(SystemClock), None)
            .expect("default number prefix is valid")
    }

    /// Create state from configuration with the system clock and no database.
    ///
    /// Fails if `config.number_prefix` is not a valid application number
    /// prefix (1-8 ASCII letters).
    pub fn with_config(config: AppConfig) -> Result<Self, NumberGeneratorError> {
        Self::with_parts(config, Arc::new(SystemClock), None)
    }

    /// Create state from all parts. Tests inject a fixed clock here;
    /// `main` injects the database pool.
    pub fn with_parts(
        config: AppConfig,
        clock: Arc<dyn Clock>,
        db_pool: Option<PgPool>,
    ) -> Result<Self, NumberGeneratorError> {
        let number_gen = NumberGenerator::new(&config.number_prefix, Arc::clone(&clock))?;
        Ok(Self {
            applications: Store::new(),
            number_gen: Arc::new(number_gen),
            clock,
            db_pool,
            config,
        })
    }

    /// Load all applications from the database into the in-memory store.
    ///
    /// No-op when no database is configured. Rows that fail validation are
    /// skipped with a warning rather than aborting startup.
    pub async fn hydrate_from_db(&self) -> Result<(), String> {
        let Some(pool) = &self.db_pool else {
            return Ok(());
        };

        let records = crate::db::applications::load_all(pool)
            .await
            .map_err(|e| format!("failed to load applications from database: {e}"))?;

        let count = records.len();
        for record in records {
            self.applications
                .insert(record.application_no.clone(), record);
        }

        tracing::info!(applications = count, "Hydrated in-memory store from database");
        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
