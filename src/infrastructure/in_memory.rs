use crate::domain::pool::{Participant, Pool, PoolId};
use crate::domain::ports::PoolStore;
use crate::error::{PoolError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for pools.
///
/// Pools are kept in insertion order so listings and searches are stable.
/// The version check in `append` runs under the write guard, which makes the
/// compare-and-swap atomic.
#[derive(Default, Clone)]
pub struct InMemoryPoolStore {
    pools: Arc<RwLock<Vec<Pool>>>,
}

impl InMemoryPoolStore {
    /// Creates a new, empty in-memory pool store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `pools`.
    pub fn with_pools(pools: Vec<Pool>) -> Self {
        Self {
            pools: Arc::new(RwLock::new(pools)),
        }
    }
}

#[async_trait]
impl PoolStore for InMemoryPoolStore {
    async fn get(&self, id: &PoolId) -> Result<Option<Pool>> {
        let pools = self.pools.read().await;
        Ok(pools.iter().find(|p| &p.id == id).cloned())
    }

    async fn all(&self) -> Result<Vec<Pool>> {
        let pools = self.pools.read().await;
        Ok(pools.clone())
    }

    async fn insert_if_absent(&self, pool: Pool) -> Result<bool> {
        let mut pools = self.pools.write().await;
        if pools.iter().any(|p| p.id == pool.id) {
            return Ok(false);
        }
        pools.push(pool);
        Ok(true)
    }

    async fn append(
        &self,
        id: &PoolId,
        expected_version: u64,
        participant: Participant,
    ) -> Result<Pool> {
        let mut pools = self.pools.write().await;
        let pool = pools
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| PoolError::PoolNotFound(id.clone()))?;

        if pool.version != expected_version {
            return Err(PoolError::Conflict { pool: id.clone() });
        }

        pool.append(participant);
        Ok(pool.clone())
    }
}
