//! Process-wide connection caching.
//!
//! The registry owns two caches: resolved identity key → handle, and
//! logical name → handle. It is an explicit object rather than module
//! state so tests and embedding applications control its lifetime.

use crate::config::ConnectionConfig;
use crate::driver::{Driver, Handle};
use crate::error::{Error, Result};
use crate::prompt::{PromptIo, Terminal};
use crate::resolver::ConfigResolver;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Environment variable selecting the default logical connection name.
pub const DEFAULT_CONN_ENV: &str = "DBCONNS_CONN";

/// The default logical name: `$DBCONNS_CONN`, else `default`.
pub fn default_connection_name() -> String {
    std::env::var(DEFAULT_CONN_ENV)
        .ok()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "default".to_string())
}

/// Caches live connections by identity key and by logical name.
///
/// An identity key, once mapped to a handle, is never remapped; a bound
/// name is never re-resolved. Materialization happens under the identity
/// cache lock, so overlapping requests for one key produce one handle.
pub struct ConnectionRegistry {
    driver: Arc<dyn Driver>,
    resolver: ConfigResolver,
    io: Arc<Mutex<dyn PromptIo + Send>>,
    by_identity: Mutex<HashMap<String, Handle>>,
    by_name: Mutex<HashMap<String, Handle>>,
    default_name: String,
}

impl ConnectionRegistry {
    /// Registry using the real terminal, the process working directory
    /// for profile discovery, and the environment's default name.
    pub fn new(driver: Arc<dyn Driver>) -> std::io::Result<Self> {
        Ok(Self {
            driver,
            resolver: ConfigResolver::from_cwd()?,
            io: Arc::new(Mutex::new(Terminal)),
            by_identity: Mutex::new(HashMap::new()),
            by_name: Mutex::new(HashMap::new()),
            default_name: default_connection_name(),
        })
    }

    /// Replace the profile resolver.
    pub fn with_resolver(mut self, resolver: ConfigResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replace the prompt I/O source.
    pub fn with_io(mut self, io: Arc<Mutex<dyn PromptIo + Send>>) -> Self {
        self.io = io;
        self
    }

    /// Replace the default logical name.
    pub fn with_default_name(mut self, name: impl Into<String>) -> Self {
        self.default_name = name.into();
        self
    }

    /// Get (or create) the connection bound to `name`.
    ///
    /// `None` selects the default name. A cache hit returns the bound
    /// handle as-is; a miss resolves the profile from config files,
    /// prompts for whatever is missing, and binds the result. Fails with
    /// [`Error::NotFound`] when no file defines the section.
    pub fn get_named(&self, name: Option<&str>) -> Result<Handle> {
        let name = name.unwrap_or(&self.default_name);

        if let Some(handle) = self.lock_names().get(name) {
            return Ok(handle.clone());
        }

        let mut config = self
            .resolver
            .resolve(name)?
            .ok_or_else(|| Error::NotFound(name.to_string()))?;

        info!(name, "connecting");
        let handle = self.connection_for(&mut config)?;
        self.lock_names().insert(name.to_string(), handle.clone());
        Ok(handle)
    }

    /// Force-bind `handle` under `name`, bypassing resolution.
    pub fn set_named(&self, name: Option<&str>, handle: Handle) -> Handle {
        let name = name.unwrap_or(&self.default_name);
        self.lock_names().insert(name.to_string(), handle.clone());
        handle
    }

    /// Materialize (or fetch) the handle for a caller-built config and
    /// bind it under `name`.
    pub fn set_from_config(
        &self,
        config: &mut ConnectionConfig,
        name: Option<&str>,
    ) -> Result<Handle> {
        let handle = self.connection_for(config)?;
        Ok(self.set_named(name, handle))
    }

    /// Release the connection bound to `name`.
    ///
    /// Currently a no-op: neither cache supports eviction and handles are
    /// never torn down. Kept for interface compatibility.
    pub fn close(&self, name: Option<&str>) -> Result<()> {
        let name = name.unwrap_or(&self.default_name);
        warn!(name, "close() is not implemented; the connection stays cached and open");
        Ok(())
    }

    /// Get (or create) the cached connection for `config`'s identity.
    ///
    /// The cache is consulted before prompting, so an already-resolved
    /// identity never re-prompts. On a miss the config is filled, the key
    /// recomputed (prompting may have changed it), and the connection
    /// materialized under the cache lock.
    pub(crate) fn connection_for(&self, config: &mut ConnectionConfig) -> Result<Handle> {
        let key = config.identity_key();
        if let Some(handle) = self.lock_identities().get(&key) {
            return Ok(handle.clone());
        }

        if !config.is_filled() {
            let mut io = self.io.lock().unwrap_or_else(|e| e.into_inner());
            config.fill(&mut *io)?;
        }

        let key = config.identity_key();
        let mut cache = self.lock_identities();
        if let Some(handle) = cache.get(&key) {
            return Ok(handle.clone());
        }

        let params = config.connect_params()?;
        let handle = self.driver.connect(&params)?;
        cache.insert(key, handle.clone());
        Ok(handle)
    }

    fn lock_names(&self) -> std::sync::MutexGuard<'_, HashMap<String, Handle>> {
        self.by_name.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_identities(&self) -> std::sync::MutexGuard<'_, HashMap<String, Handle>> {
        self.by_identity.lock().unwrap_or_else(|e| e.into_inner())
    }
}
