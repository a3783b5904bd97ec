//! the immutable recommendation context
//!
//! built once at startup and shared read-only (`Arc<Dataset>`) by every
//! request. a reload, if ever needed, swaps the whole `Arc`.

use crate::catalog::{Catalog, DuplicateId, Item};
use crate::similarity::{
    CollaborativeIndexError, CollaborativeSimilarity, MatrixError, SimilarityMatrix,
};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse dataset: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    DuplicateId(#[from] DuplicateId),

    #[error("content similarity: {0}")]
    ContentMatrix(MatrixError),

    #[error("collaborative similarity: {0}")]
    CollaborativeMatrix(MatrixError),

    #[error("collaborative index: {0}")]
    CollaborativeIndex(#[from] CollaborativeIndexError),

    #[error("content matrix is {matrix}x{matrix} but the catalog has {catalog} games")]
    DimensionMismatch { matrix: usize, catalog: usize },
}

/// on-disk artifact layout
#[derive(Debug, Deserialize)]
struct RawDataset {
    games: Vec<Item>,
    content_similarity: Vec<Vec<f32>>,
    collaborative_index: Vec<String>,
    collaborative_similarity: Vec<Vec<f32>>,
}

#[derive(Debug)]
pub struct Dataset {
    pub catalog: Catalog,
    pub content: SimilarityMatrix,
    pub collaborative: CollaborativeSimilarity,
}

impl Dataset {
    pub fn from_parts(
        games: Vec<Item>,
        content_rows: Vec<Vec<f32>>,
        collaborative_index: Vec<String>,
        collaborative_rows: Vec<Vec<f32>>,
    ) -> Result<Self, DatasetError> {
        let catalog = Catalog::new(games)?;

        let content =
            SimilarityMatrix::from_rows(content_rows).map_err(DatasetError::ContentMatrix)?;
        if content.size() != catalog.len() {
            return Err(DatasetError::DimensionMismatch {
                matrix: content.size(),
                catalog: catalog.len(),
            });
        }

        let cf_matrix = SimilarityMatrix::from_rows(collaborative_rows)
            .map_err(DatasetError::CollaborativeMatrix)?;
        let collaborative = CollaborativeSimilarity::new(cf_matrix, collaborative_index)?;

        Ok(Self {
            catalog,
            content,
            collaborative,
        })
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, DatasetError> {
        let raw: RawDataset = serde_json::from_slice(bytes)?;
        Self::from_parts(
            raw.games,
            raw.content_similarity,
            raw.collaborative_index,
            raw.collaborative_similarity,
        )
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        log::debug!("read dataset {} ({} bytes)", path.display(), bytes.len());

        let dataset = Self::from_json_slice(&bytes)?;
        log::debug!(
            "dataset loaded: {} games, {} in collaborative index",
            dataset.catalog.len(),
            dataset.collaborative.len()
        );
        Ok(dataset)
    }
}
