//! Food search and calorie targets.
//!
//! Food lookups go to FatSecret when credentials are configured and fall
//! back to a small built-in table otherwise (or when FatSecret fails).

pub mod bmr;
pub mod fallback;
pub mod fatsecret;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use bmr::{BmrReport, BodyMetrics, age_on, compute_bmr};
pub use fallback::search_fallback_foods;
pub use fatsecret::{FatSecretClient, FatSecretConfig, TokenCache};

/// Errors from the FatSecret integration. Callers normally never see these
/// because search falls back to the built-in table.
#[derive(Debug, Error)]
pub enum NutritionError {
    #[error("FatSecret credentials are not configured")]
    MissingCredentials,

    #[error("FatSecret request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("FatSecret returned {status}")]
    Status { status: u16 },

    #[error("FatSecret error: {0}")]
    Api(String),

    #[error("unexpected FatSecret response: {0}")]
    InvalidResponse(String),
}

/// One food with per-serving macros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub food_id: String,
    pub food_name: String,
    #[serde(default)]
    pub brand: String,
    pub calories: u32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub serving: String,
}

/// Where a search result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodSource {
    Fatsecret,
    Fallback,
}

/// Food search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodSearch {
    pub foods: Vec<FoodItem>,
    pub source: FoodSource,
    pub is_fallback: bool,
}

impl FoodSearch {
    pub fn fallback(query: &str) -> Self {
        Self {
            foods: search_fallback_foods(query),
            source: FoodSource::Fallback,
            is_fallback: true,
        }
    }
}
