use crate::catalog::Catalog;
use crate::providers::{Recommendation, RecommendError, Recommender, RESULTS_PER_SOURCE};
use crate::similarity::SimilarityMatrix;

/// ranks games by content similarity, indexed by catalog position
pub struct ContentRecommender<'a> {
    catalog: &'a Catalog,
    matrix: &'a SimilarityMatrix,
}

impl<'a> ContentRecommender<'a> {
    pub fn new(catalog: &'a Catalog, matrix: &'a SimilarityMatrix) -> Self {
        Self { catalog, matrix }
    }
}

impl Recommender for ContentRecommender<'_> {
    fn recommend(&self, query_name: &str) -> Result<Vec<Recommendation>, RecommendError> {
        let position = self
            .catalog
            .position_of_name(query_name)
            .ok_or_else(|| RecommendError::NotFound {
                source_name: self.name(),
                query: query_name.to_string(),
            })?;

        let _span = logfire::span!(
            "recommend.content",
            query = query_name,
            position = position as i64
        )
        .entered();

        let recommendations: Vec<Recommendation> = self
            .matrix
            .ranked_neighbors(position)
            .into_iter()
            .filter_map(|(neighbor, score)| {
                self.catalog.get(neighbor).map(|item| Recommendation {
                    game_id: item.game_id.clone(),
                    name: item.name.clone(),
                    score,
                })
            })
            .take(RESULTS_PER_SOURCE)
            .collect();

        Ok(recommendations)
    }

    fn name(&self) -> &'static str {
        "content"
    }
}
