//! FatSecret Platform API client (OAuth 2.0 client credentials).

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::{FoodItem, FoodSearch, FoodSource, NutritionError};

pub const DEFAULT_TOKEN_URL: &str = "https://oauth.fatsecret.com/connect/token";
pub const DEFAULT_API_URL: &str = "https://platform.fatsecret.com/rest/server.api";

/// Refresh this long before the server-side expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Lifetime assumed when the token response omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(86_400);

/// Longer upstream lifetimes are cut to this.
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(7 * 86_400);

const MAX_RESULTS: u32 = 10;
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Credentials and endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FatSecretConfig {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
    pub api_url: String,
}

impl FatSecretConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

/// Cached bearer token with an explicit expiry.
#[derive(Debug, Default)]
pub struct TokenCache {
    token: Option<(String, Instant)>,
}

impl TokenCache {
    /// The cached token if it is still good for at least [`EXPIRY_MARGIN`].
    pub fn get(&self, now: Instant) -> Option<&str> {
        match &self.token {
            Some((token, expires_at)) if now + EXPIRY_MARGIN < *expires_at => Some(token),
            _ => None,
        }
    }

    /// Cache `token` until `now + lifetime`, with `lifetime` capped at
    /// [`MAX_TOKEN_LIFETIME`]. A token whose expiry cannot be represented is
    /// not cached.
    pub fn store(&mut self, token: String, lifetime: Duration, now: Instant) {
        self.token = now
            .checked_add(lifetime.min(MAX_TOKEN_LIFETIME))
            .map(|expires_at| (token, expires_at));
    }

    pub fn clear(&mut self) {
        self.token = None;
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

/// FatSecret food search with a shared token cache.
///
/// The cache lock is held across a refresh, so concurrent searches never
/// request more than one token at a time.
#[derive(Debug)]
pub struct FatSecretClient {
    client: Client,
    config: Option<FatSecretConfig>,
    cache: Mutex<TokenCache>,
}

impl FatSecretClient {
    /// `None` (or blank credentials) makes every search use the fallback table.
    pub fn new(config: Option<FatSecretConfig>) -> Result<Self, NutritionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            config: config.filter(FatSecretConfig::has_credentials),
            cache: Mutex::new(TokenCache::default()),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    /// Search foods, falling back to the built-in table on any failure or
    /// an empty FatSecret result.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> FoodSearch {
        match self.search_remote(query).await {
            Ok(foods) if !foods.is_empty() => FoodSearch {
                foods,
                source: FoodSource::Fatsecret,
                is_fallback: false,
            },
            Ok(_) => {
                debug!("FatSecret returned no foods, using fallback table");
                FoodSearch::fallback(query)
            }
            Err(NutritionError::MissingCredentials) => FoodSearch::fallback(query),
            Err(e) => {
                warn!(error = %e, "FatSecret search failed, using fallback table");
                FoodSearch::fallback(query)
            }
        }
    }

    /// Query FatSecret directly, without the fallback.
    pub async fn search_remote(&self, query: &str) -> Result<Vec<FoodItem>, NutritionError> {
        let config = self.config.as_ref().ok_or(NutritionError::MissingCredentials)?;
        let token = self.access_token(config).await?;

        let max_results = MAX_RESULTS.to_string();
        let response = self
            .client
            .post(&config.api_url)
            .bearer_auth(&token)
            .form(&[
                ("method", "foods.search"),
                ("search_expression", query),
                ("format", "json"),
                ("max_results", max_results.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NutritionError::Status {
                status: status.as_u16(),
            });
        }
        let body: Value = response.json().await?;
        if let Some(error) = body.get("error") {
            // FatSecret reports bad tokens in-band; force a refresh next time.
            self.cache.lock().await.clear();
            let message = error["message"].as_str().unwrap_or("unknown error");
            return Err(NutritionError::Api(message.to_string()));
        }

        Ok(parse_search_response(&body))
    }

    async fn access_token(&self, config: &FatSecretConfig) -> Result<String, NutritionError> {
        let mut cache = self.cache.lock().await;
        if let Some(token) = cache.get(Instant::now()) {
            return Ok(token.to_string());
        }

        let response = self
            .client
            .post(&config.token_url)
            .basic_auth(&config.client_id, Some(&config.client_secret))
            .form(&[("grant_type", "client_credentials"), ("scope", "basic")])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NutritionError::Status {
                status: status.as_u16(),
            });
        }
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| NutritionError::InvalidResponse(format!("token response: {e}")))?;

        let lifetime = token
            .expires_in
            .map_or(DEFAULT_TOKEN_LIFETIME, Duration::from_secs);
        debug!(lifetime_secs = lifetime.as_secs(), "refreshed FatSecret token");
        cache.store(token.access_token.clone(), lifetime, Instant::now());
        Ok(token.access_token)
    }
}

/// Turn a `foods.search` body into items. A single match arrives as an
/// object rather than a one-element array.
fn parse_search_response(body: &Value) -> Vec<FoodItem> {
    let foods = &body["foods"]["food"];
    let entries: Vec<&Value> = match foods {
        Value::Array(items) => items.iter().collect(),
        Value::Object(_) => vec![foods],
        _ => Vec::new(),
    };
    entries.into_iter().map(parse_food).collect()
}

fn parse_food(food: &Value) -> FoodItem {
    let description = food["food_description"].as_str().unwrap_or_default();
    let macros = parse_food_description(description);
    FoodItem {
        food_id: json_text(&food["food_id"]),
        food_name: json_text(&food["food_name"]),
        brand: json_text(&food["brand_name"]),
        calories: macros.calories,
        protein: macros.protein,
        carbs: macros.carbs,
        fat: macros.fat,
        serving: macros.serving,
    }
}

fn json_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

/// Macros parsed from a FatSecret `food_description`.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptionMacros {
    pub serving: String,
    pub calories: u32,
    pub fat: f64,
    pub carbs: f64,
    pub protein: f64,
}

/// Parse `"Per 100g - Calories: 165kcal | Fat: 3.57g | Carbs: 0.00g | Protein: 31.02g"`.
///
/// Missing or garbled fields read as zero. The serving is the text before
/// `" - "`, or `"1 serving"`.
pub fn parse_food_description(description: &str) -> DescriptionMacros {
    let serving = description
        .split_once(" - ")
        .map_or("1 serving", |(serving, _)| serving)
        .to_string();
    DescriptionMacros {
        serving,
        // Truncated toward zero; negative values never occur in practice.
        calories: labelled_number(description, "Calories:", "kcal").map_or(0, |c| c.max(0.0) as u32),
        fat: labelled_number(description, "Fat:", "g").unwrap_or(0.0),
        carbs: labelled_number(description, "Carbs:", "g").unwrap_or(0.0),
        protein: labelled_number(description, "Protein:", "g").unwrap_or(0.0),
    }
}

fn labelled_number(description: &str, label: &str, unit: &str) -> Option<f64> {
    let (_, after) = description.split_once(label)?;
    let field = after.split('|').next()?;
    field.replace(unit, "").trim().parse().ok()
}
