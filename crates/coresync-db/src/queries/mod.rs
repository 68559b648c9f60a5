//! Query functions, one module per table.

pub mod ai_plans;
pub mod goals;
pub mod history;
pub mod profiles;
pub mod routines;
pub mod sessions;
pub mod users;
pub mod workouts;
