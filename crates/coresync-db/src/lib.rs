//! Persistence layer for CoreSync: configuration, pool, migrations, row
//! models and per-table query functions.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
