use crate::domain::pool::{Participant, Pool, PoolId};
use crate::domain::ports::PoolStore;
use crate::error::{PoolError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, IteratorMode, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for storing pools, keyed by pool id.
pub const CF_POOLS: &str = "pools";

/// A persistent pool store backed by RocksDB.
///
/// Pools are stored as JSON under their id, so `all` returns them in id
/// order. Read-modify-write operations are serialized through `write_lock`
/// to keep `append` a true compare-and-swap.
///
/// `Clone` shares the underlying `Arc<DB>` and lock.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, creating
    /// the "pools" column family if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_pools = ColumnFamilyDescriptor::new(CF_POOLS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_pools])?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db.cf_handle(CF_POOLS).ok_or_else(|| {
            PoolError::InternalError(Box::new(std::io::Error::other(
                "Pools column family not found",
            )))
        })
    }

    fn read(&self, id: &PoolId) -> Result<Option<Pool>> {
        let cf = self.cf()?;
        match self.db.get_cf(cf, id.as_str().as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write(&self, pool: &Pool) -> Result<()> {
        let cf = self.cf()?;
        let value = serde_json::to_vec(pool)?;
        self.db.put_cf(cf, pool.id.as_str().as_bytes(), value)?;
        Ok(())
    }
}

#[async_trait]
impl PoolStore for RocksDBStore {
    async fn get(&self, id: &PoolId) -> Result<Option<Pool>> {
        self.read(id)
    }

    async fn all(&self) -> Result<Vec<Pool>> {
        let cf = self.cf()?;
        let mut pools = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            pools.push(serde_json::from_slice(&value)?);
        }
        Ok(pools)
    }

    async fn insert_if_absent(&self, pool: Pool) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        if self.read(&pool.id)?.is_some() {
            return Ok(false);
        }
        self.write(&pool)?;
        Ok(true)
    }

    async fn append(
        &self,
        id: &PoolId,
        expected_version: u64,
        participant: Participant,
    ) -> Result<Pool> {
        let _guard = self.write_lock.lock().await;
        let mut pool = self
            .read(id)?
            .ok_or_else(|| PoolError::PoolNotFound(id.clone()))?;

        if pool.version != expected_version {
            return Err(PoolError::Conflict { pool: id.clone() });
        }

        pool.append(participant);
        self.write(&pool)?;
        Ok(pool)
    }
}
