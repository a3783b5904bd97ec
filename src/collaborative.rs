use crate::catalog::Catalog;
use crate::providers::{Recommendation, RecommendError, Recommender, RESULTS_PER_SOURCE};
use crate::similarity::CollaborativeSimilarity;

/// ranks games by collaborative similarity
///
/// the query is resolved against the collaborative index (exact name), and
/// each neighbor is mapped back to the catalog by name to pick up its id.
/// a neighbor that maps back to the query's own catalog entry is dropped.
pub struct CollaborativeRecommender<'a> {
    catalog: &'a Catalog,
    similarity: &'a CollaborativeSimilarity,
    skip_unknown: bool,
}

impl<'a> CollaborativeRecommender<'a> {
    pub fn new(catalog: &'a Catalog, similarity: &'a CollaborativeSimilarity) -> Self {
        Self {
            catalog,
            similarity,
            skip_unknown: false,
        }
    }

    /// drop neighbors missing from the catalog instead of failing
    pub fn skip_unknown(mut self, skip: bool) -> Self {
        self.skip_unknown = skip;
        self
    }

    fn to_recommendation(
        &self,
        position: usize,
        score: f32,
        query_id: Option<&str>,
    ) -> Option<Result<Recommendation, RecommendError>> {
        let cf_name = self.similarity.name_at(position)?;

        match self.catalog.find_by_name(cf_name) {
            Some(item) if Some(item.game_id.as_str()) == query_id => None,
            Some(item) => Some(Ok(Recommendation {
                game_id: item.game_id.clone(),
                name: item.name.clone(),
                score,
            })),
            None if self.skip_unknown => {
                logfire::warn!(
                    "skipping collaborative neighbor missing from catalog",
                    game = cf_name.to_string()
                );
                None
            }
            None => Some(Err(RecommendError::Inconsistent {
                name: cf_name.to_string(),
            })),
        }
    }
}

impl Recommender for CollaborativeRecommender<'_> {
    fn recommend(&self, query_name: &str) -> Result<Vec<Recommendation>, RecommendError> {
        let position =
            self.similarity
                .position_of(query_name)
                .ok_or_else(|| RecommendError::NotFound {
                    source_name: self.name(),
                    query: query_name.to_string(),
                })?;

        let _span = logfire::span!(
            "recommend.collaborative",
            query = query_name,
            position = position as i64
        )
        .entered();

        let query_id = self
            .catalog
            .find_by_name(query_name)
            .map(|item| item.game_id.as_str());

        self.similarity
            .matrix()
            .ranked_neighbors(position)
            .into_iter()
            .filter_map(|(neighbor, score)| self.to_recommendation(neighbor, score, query_id))
            .take(RESULTS_PER_SOURCE)
            .collect()
    }

    fn name(&self) -> &'static str {
        "collaborative"
    }
}
