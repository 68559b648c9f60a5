//! Domain logic for CoreSync: plan normalization and persistence, plan
//! generation, session tokens, nutrition lookups and exercise search.

pub mod exercise;
pub mod generator;
pub mod nutrition;
pub mod plan;
pub mod token;
