//! http handlers for the recommendation service
//!
//! `GET /api/recommendations?name=...` is the shareable, cacheable form;
//! `POST /api/recommendations` takes the same fields as json. weights and
//! `top_n` fall back to the configured defaults when omitted.

use crate::config::Config;
use crate::dataset::Dataset;
use crate::hybrid::{format_results, GameCard, HybridError, HybridRecommender};
use crate::scoring::{FusionConfig, InvalidWeight};
use actix_web::{web, HttpRequest, HttpResponse, Result as ActixResult};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

#[derive(Debug, Deserialize)]
pub struct RecommendQuery {
    /// name of the selected game
    pub name: String,
    #[serde(default)]
    pub cbf_weight: Option<f32>,
    #[serde(default)]
    pub cf_weight: Option<f32>,
    #[serde(default)]
    pub top_n: Option<usize>,
}

impl RecommendQuery {
    fn fusion_config(&self, defaults: &FusionConfig) -> FusionConfig {
        FusionConfig {
            cbf_weight: self.cbf_weight.unwrap_or(defaults.cbf_weight),
            cf_weight: self.cf_weight.unwrap_or(defaults.cf_weight),
            top_n: self.top_n.unwrap_or(defaults.top_n),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub results: Vec<GameCard>,
    /// false when the game had no collaborative data and only content was used
    pub cf_available: bool,
}

#[derive(Debug, Serialize)]
pub struct GamesResponse {
    pub games: Vec<String>,
}

/// errors that can occur while serving a recommendation
#[derive(Debug, thiserror::Error)]
pub enum RecommendApiError {
    #[error(transparent)]
    Hybrid(#[from] HybridError),

    #[error(transparent)]
    InvalidWeight(#[from] InvalidWeight),
}

impl RecommendApiError {
    fn into_actix_error(self) -> actix_web::Error {
        match &self {
            RecommendApiError::Hybrid(HybridError::NotFound(_)) => {
                actix_web::error::ErrorNotFound(self.to_string())
            }
            RecommendApiError::InvalidWeight(_) => actix_web::error::ErrorBadRequest(self.to_string()),
            RecommendApiError::Hybrid(HybridError::Inconsistent(_)) => {
                actix_web::error::ErrorInternalServerError(self.to_string())
            }
        }
    }
}

/// generate etag for caching based on query parameters
///
/// the dataset never changes while the process runs, so equal parameters
/// always produce equal responses.
fn generate_etag(name: &str, fusion: &FusionConfig) -> String {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    fusion.cbf_weight.to_bits().hash(&mut hasher);
    fusion.cf_weight.to_bits().hash(&mut hasher);
    fusion.top_n.hash(&mut hasher);
    format!("\"{}\"", hasher.finish())
}

/// shared implementation used by both POST and GET handlers
fn perform_recommend(
    name: &str,
    fusion: &FusionConfig,
    config: &Config,
    dataset: &Dataset,
) -> Result<RecommendResponse, RecommendApiError> {
    logfire::info!(
        "recommendation request received",
        query = name.to_string(),
        cbf_weight = fusion.cbf_weight as f64,
        cf_weight = fusion.cf_weight as f64,
        top_n = fusion.top_n as i64
    );

    fusion.validate()?;

    let outcome = HybridRecommender::new(dataset)
        .skip_unknown(config.cf_skip_unknown)
        .recommend(name, fusion)?;

    let results = format_results(&dataset.catalog, outcome.records);

    let top_result_name = results
        .first()
        .map(|r| r.name.clone())
        .unwrap_or_else(|| "none".to_string());

    logfire::info!(
        "recommendation completed successfully",
        query = name.to_string(),
        results_count = results.len() as i64,
        cf_available = outcome.cf_available,
        top_result = &top_result_name
    );

    Ok(RecommendResponse {
        results,
        cf_available: outcome.cf_available,
    })
}

/// POST /api/recommendations handler
pub async fn recommend(
    query: web::Json<RecommendQuery>,
    config: web::Data<Config>,
    dataset: web::Data<Dataset>,
) -> ActixResult<HttpResponse> {
    let fusion = query.fusion_config(&config.fusion);
    let response = perform_recommend(&query.name, &fusion, &config, &dataset)
        .map_err(|e| e.into_actix_error())?;
    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/recommendations handler for shareable URLs
pub async fn recommend_get(
    query: web::Query<RecommendQuery>,
    config: web::Data<Config>,
    dataset: web::Data<Dataset>,
    req: HttpRequest,
) -> ActixResult<HttpResponse> {
    let fusion = query.fusion_config(&config.fusion);
    let etag = generate_etag(&query.name, &fusion);

    if let Some(if_none_match) = req.headers().get("if-none-match") {
        if if_none_match.to_str().unwrap_or("") == etag {
            return Ok(HttpResponse::NotModified()
                .insert_header(("etag", etag))
                .finish());
        }
    }

    let response = perform_recommend(&query.name, &fusion, &config, &dataset)
        .map_err(|e| e.into_actix_error())?;

    Ok(HttpResponse::Ok()
        .insert_header(("etag", etag.clone()))
        .insert_header(("cache-control", "public, max-age=300"))
        .json(response))
}

/// GET /api/games handler: every selectable game name, in catalog order
pub async fn list_games(dataset: web::Data<Dataset>) -> HttpResponse {
    let games = dataset
        .catalog
        .items()
        .iter()
        .map(|item| item.name.clone())
        .collect();
    HttpResponse::Ok().json(GamesResponse { games })
}
