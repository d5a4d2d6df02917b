use super::pool::{Participant, Pool, PoolId};
use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
pub trait PoolStore: Send + Sync {
    async fn get(&self, id: &PoolId) -> Result<Option<Pool>>;
    async fn all(&self) -> Result<Vec<Pool>>;
    /// Inserts the pool unless one with the same id exists. Returns whether
    /// it was inserted.
    async fn insert_if_absent(&self, pool: Pool) -> Result<bool>;
    /// Appends a participant if the stored version still equals
    /// `expected_version`, failing with `PoolError::Conflict` otherwise.
    async fn append(
        &self,
        id: &PoolId,
        expected_version: u64,
        participant: Participant,
    ) -> Result<Pool>;
}

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
    fn epoch_millis(&self) -> i64;
}

pub type PoolStoreBox = Box<dyn PoolStore>;
pub type PoolStoreFactory = Box<dyn Fn() -> PoolStoreBox + Send + Sync>;
pub type ClockBox = Box<dyn Clock>;
