//! Outer interfaces of the crate.

pub mod csv;
