//! Adapters for the domain ports: pool stores, clocks and seed data.

pub mod clock;
pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod seed;
