use crate::domain::pool::{Pool, PoolStatus};
use crate::error::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

/// One output row per pool.
#[derive(Debug, Serialize, PartialEq)]
pub struct PoolSummary {
    pub pool: String,
    pub target: u32,
    pub committed: u32,
    pub remaining: u32,
    pub progress: u32,
    pub status: PoolStatus,
    pub price: Decimal,
    pub value: Decimal,
}

impl From<&Pool> for PoolSummary {
    fn from(pool: &Pool) -> Self {
        Self {
            pool: pool.id.to_string(),
            target: pool.target_quantity,
            committed: pool.committed(),
            remaining: pool.remaining(),
            progress: pool.progress_percent(),
            status: pool.status(),
            price: pool.price_per_unit.value().normalize(),
            value: pool.committed_value().normalize(),
        }
    }
}

/// Summary column names, written even when no pool matches.
pub const SUMMARY_HEADER: [&str; 8] = [
    "pool",
    "target",
    "committed",
    "remaining",
    "progress",
    "status",
    "price",
    "value",
];

/// Writes pool summaries as CSV.
pub struct PoolWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> PoolWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(sink),
        }
    }

    pub fn write_pools<'a>(&mut self, pools: impl IntoIterator<Item = &'a Pool>) -> Result<()> {
        self.writer.write_record(SUMMARY_HEADER)?;
        for pool in pools {
            self.writer.serialize(PoolSummary::from(pool))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
