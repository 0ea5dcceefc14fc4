//! Connection registry: named, lazily created, shared pools.
//!
//! Pools are keyed by the logical connection name from the configuration.
//! The registry guarantees at most one pool per name even under concurrent
//! lookups: the map lock is held across pool creation, so a second caller
//! for the same name waits and then receives the pool the first one built.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::ConnectionConfig;
use crate::drivers::PoolImpl;
use crate::error::Result;

/// Registry of live connection pools, keyed by logical name.
#[derive(Default)]
pub struct ConnectionRegistry {
    pools: Mutex<HashMap<String, Arc<PoolImpl>>>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the pool for `name`, creating it from `config` on first use.
    ///
    /// Creation failures are not cached; a later call retries.
    pub async fn get_or_connect(
        &self,
        name: &str,
        config: &ConnectionConfig,
    ) -> Result<Arc<PoolImpl>> {
        let mut pools = self.pools.lock().await;
        if let Some(pool) = pools.get(name) {
            debug!("Reusing pool for connection '{}'", name);
            return Ok(Arc::clone(pool));
        }

        info!("Creating pool for connection '{}'", name);
        let pool = Arc::new(PoolImpl::connect(config).await?);
        pools.insert(name.to_string(), Arc::clone(&pool));
        Ok(pool)
    }

    /// Get an already created pool, if any.
    pub async fn get(&self, name: &str) -> Option<Arc<PoolImpl>> {
        self.pools.lock().await.get(name).map(Arc::clone)
    }

    /// Drop and close the pool for `name`. Returns whether one existed.
    pub async fn disconnect(&self, name: &str) -> bool {
        let removed = self.pools.lock().await.remove(name);
        match removed {
            Some(pool) => {
                pool.close().await;
                info!("Closed pool for connection '{}'", name);
                true
            }
            None => false,
        }
    }

    /// Close every pool and empty the registry.
    pub async fn close_all(&self) {
        let mut pools = self.pools.lock().await;
        for (name, pool) in pools.drain() {
            pool.close().await;
            debug!("Closed pool for connection '{}'", name);
        }
    }

    /// Number of live pools.
    pub async fn len(&self) -> usize {
        self.pools.lock().await.len()
    }

    /// Check if the registry has no pools.
    pub async fn is_empty(&self) -> bool {
        self.pools.lock().await.is_empty()
    }
}
