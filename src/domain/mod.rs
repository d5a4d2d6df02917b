//! Domain layer: pool accounting, payment rules and the ports the
//! application layer depends on.

pub mod payment;
pub mod pool;
pub mod ports;
pub mod search;
