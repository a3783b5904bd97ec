//! recommender abstraction shared by the content and collaborative sources
//!
//! both sources answer the same question (rank games similar to one game) from
//! different precomputed signals, so the hybrid layer only sees this trait.
//! implementations are pure reads over the immutable dataset and therefore
//! safe to call from any actix worker.

use thiserror::Error;

/// number of neighbors each source contributes before merging
pub const RESULTS_PER_SOURCE: usize = 10;

/// errors a single similarity source can produce
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecommendError {
    /// the query game is not indexed by this source
    #[error("game not found in {source_name}: {query}")]
    NotFound {
        source_name: &'static str,
        query: String,
    },

    /// the collaborative index names a game the catalog does not have
    #[error("collaborative index references unknown game: {name}")]
    Inconsistent { name: String },
}

/// a single ranked neighbor from one source
#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub game_id: String,
    pub name: String,
    /// raw matrix value, not normalized
    pub score: f32,
}

/// a source that can rank games similar to a query game
pub trait Recommender: Send + Sync {
    /// up to `RESULTS_PER_SOURCE` neighbors, best first, never the query itself
    fn recommend(&self, query_name: &str) -> Result<Vec<Recommendation>, RecommendError>;

    /// human-readable name for logging/debugging
    fn name(&self) -> &'static str;
}
