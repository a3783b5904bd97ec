//! hybrid recommendations combining content and collaborative similarity
//!
//! ## stages
//!
//! ### 1. content (CBF)
//! - neighbors from the content matrix, resolved through the catalog
//! - mandatory: an unknown game fails the whole call
//!
//! ### 2. collaborative (CF)
//! - neighbors from the collaborative matrix, resolved through its own index
//! - optional: games with too little interaction data are missing from the
//!   index, in which case the call falls back to the content ranking alone
//!
//! ### 3. weighted fusion
//! - outer join, per-column min-max normalization, weighted sum
//! - see [`crate::scoring`] for the details
//!
//! errors are typed: callers can tell an unknown game (`NotFound`) from a
//! corrupt artifact (`Inconsistent`) from a game with no neighbors (empty `Ok`).

use serde::Serialize;

use crate::catalog::Catalog;
use crate::collaborative::CollaborativeRecommender;
use crate::content::ContentRecommender;
use crate::dataset::Dataset;
use crate::providers::{Recommendation, RecommendError, Recommender};
use crate::scoring::{
    fuse_scores, merge_outer, normalize_columns, FusionConfig, HybridRecommendation,
};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum HybridError {
    #[error("game not found: {0}")]
    NotFound(String),

    #[error("inconsistent similarity data: {0}")]
    Inconsistent(String),
}

/// fused results plus whether collaborative data contributed
#[derive(Debug, Clone, PartialEq)]
pub struct HybridOutcome {
    pub records: Vec<HybridRecommendation>,
    pub cf_available: bool,
}

pub struct HybridRecommender<'a> {
    content: ContentRecommender<'a>,
    collaborative: CollaborativeRecommender<'a>,
}

impl<'a> HybridRecommender<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self {
            content: ContentRecommender::new(&dataset.catalog, &dataset.content),
            collaborative: CollaborativeRecommender::new(
                &dataset.catalog,
                &dataset.collaborative,
            ),
        }
    }

    /// tolerate collaborative neighbors missing from the catalog
    pub fn skip_unknown(mut self, skip: bool) -> Self {
        self.collaborative = self.collaborative.skip_unknown(skip);
        self
    }

    pub fn recommend(
        &self,
        query_name: &str,
        config: &FusionConfig,
    ) -> Result<HybridOutcome, HybridError> {
        let _span = logfire::span!(
            "recommend.hybrid",
            query = query_name,
            cbf_weight = config.cbf_weight as f64,
            cf_weight = config.cf_weight as f64,
            top_n = config.top_n as i64
        )
        .entered();

        let content = self.content.recommend(query_name).map_err(|e| match e {
            RecommendError::NotFound { .. } => HybridError::NotFound(query_name.to_string()),
            RecommendError::Inconsistent { name } => HybridError::Inconsistent(name),
        })?;

        logfire::info!(
            "content recommendations ready",
            query = query_name.to_string(),
            results_found = content.len() as i64
        );

        let collaborative = match self.collaborative.recommend(query_name) {
            Ok(recs) => Some(recs),
            Err(RecommendError::NotFound { .. }) => {
                logfire::info!(
                    "no collaborative data, using content only",
                    query = query_name.to_string()
                );
                None
            }
            Err(RecommendError::Inconsistent { name }) => {
                return Err(HybridError::Inconsistent(name))
            }
        };

        let Some(collaborative) = collaborative else {
            return Ok(HybridOutcome {
                records: content_only(content, config.top_n),
                cf_available: false,
            });
        };

        let mut rows = merge_outer(&content, &collaborative);
        let merged = rows.len();
        normalize_columns(&mut rows);
        let records = fuse_scores(rows, config);

        logfire::info!(
            "weighted fusion completed",
            query = query_name.to_string(),
            content_found = content.len() as i64,
            collaborative_found = collaborative.len() as i64,
            merged = merged as i64,
            top_score = records.first().map(|r| r.hybrid_score as f64).unwrap_or(0.0)
        );

        Ok(HybridOutcome {
            records,
            cf_available: true,
        })
    }
}

/// content ranking relabeled as hybrid scores, order unchanged
fn content_only(content: Vec<Recommendation>, top_n: usize) -> Vec<HybridRecommendation> {
    content
        .into_iter()
        .take(top_n)
        .map(|rec| HybridRecommendation {
            game_id: rec.game_id,
            name: rec.name,
            hybrid_score: rec.score,
        })
        .collect()
}

/// a display-ready recommendation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameCard {
    pub game_id: String,
    pub name: String,
    pub score: f32,
    pub cover_image: String,
    pub genres: String,
    pub platforms: String,
    pub rating: String,
    pub game_link: String,
}

fn display_attribute(attributes: Option<&serde_json::Map<String, serde_json::Value>>, key: &str) -> String {
    use serde_json::Value;

    match attributes.and_then(|attrs| attrs.get(key)) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(values)) => values
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}

/// join hybrid records with the catalog's display attributes
pub fn format_results(catalog: &Catalog, records: Vec<HybridRecommendation>) -> Vec<GameCard> {
    records
        .into_iter()
        .map(|rec| {
            let attributes = catalog.find_by_id(&rec.game_id).map(|item| &item.attributes);
            GameCard {
                cover_image: display_attribute(attributes, "cover_image"),
                genres: display_attribute(attributes, "genres"),
                platforms: display_attribute(attributes, "platforms"),
                rating: display_attribute(attributes, "rating"),
                game_link: display_attribute(attributes, "game_link"),
                game_id: rec.game_id,
                name: rec.name,
                score: rec.hybrid_score,
            }
        })
        .collect()
}
