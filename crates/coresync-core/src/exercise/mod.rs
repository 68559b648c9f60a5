//! Exercise lookup against the ExerciseDB search API.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

pub const DEFAULT_BASE_URL: &str = "https://www.exercisedb.dev/api/v1/exercises";

const REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Error)]
pub enum ExerciseSearchError {
    #[error("exercise search request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("exercise search returned {status}")]
    Status { status: u16 },
}

/// The fields of an ExerciseDB record the app shows. Field names follow
/// the upstream camelCase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSummary {
    pub name: Option<String>,
    pub equipments: Option<Value>,
    pub instructions: Option<Value>,
    pub target_muscles: Option<Value>,
    pub secondary_muscles: Option<Value>,
    pub gif_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Value>,
}

/// Client for `GET {base_url}/search?q=`.
#[derive(Debug, Clone)]
pub struct ExerciseSearchClient {
    client: Client,
    base_url: String,
}

impl ExerciseSearchClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ExerciseSearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<ExerciseSummary>, ExerciseSearchError> {
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("q", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExerciseSearchError::Status {
                status: status.as_u16(),
            });
        }

        let body: SearchResponse = response.json().await?;
        Ok(body.data.iter().map(summarize).collect())
    }
}

/// Keep only the displayed fields. Absent fields become `null`.
fn summarize(record: &Value) -> ExerciseSummary {
    let field = |key: &str| record.get(key).filter(|v| !v.is_null()).cloned();
    ExerciseSummary {
        name: record.get("name").and_then(Value::as_str).map(str::to_string),
        equipments: field("equipments"),
        instructions: field("instructions"),
        target_muscles: field("targetMuscles"),
        secondary_muscles: field("secondaryMuscles"),
        gif_url: record.get("gifUrl").and_then(Value::as_str).map(str::to_string),
    }
}
