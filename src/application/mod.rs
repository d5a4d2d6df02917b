//! Application layer containing the pool workflow orchestration.
//!
//! This module defines the `PoolEngine`, the primary entry point for joining
//! pools, dispatching payments and searching. It drives the domain rules
//! against an injected `PoolStore`.

pub mod engine;
