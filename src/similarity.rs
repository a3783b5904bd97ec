//! precomputed similarity sources
//!
//! the content matrix is positionally aligned with the catalog. the
//! collaborative matrix has its own name-keyed index and may cover a
//! different subset and ordering of games; the two index spaces are only
//! ever bridged by name.

use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum MatrixError {
    #[error("row {row} has {len} columns, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("non-finite similarity at ({row}, {col})")]
    NonFinite { row: usize, col: usize },
}

/// dense square matrix of pairwise similarity scores
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    size: usize,
    values: Vec<f32>,
}

impl SimilarityMatrix {
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Result<Self, MatrixError> {
        let size = rows.len();
        let mut values = Vec::with_capacity(size * size);

        for (row, cells) in rows.into_iter().enumerate() {
            if cells.len() != size {
                return Err(MatrixError::NotSquare {
                    row,
                    len: cells.len(),
                    expected: size,
                });
            }
            if let Some(col) = cells.iter().position(|v| !v.is_finite()) {
                return Err(MatrixError::NonFinite { row, col });
            }
            values.extend(cells);
        }

        Ok(Self { size, values })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.size {
            return None;
        }
        let start = index * self.size;
        Some(&self.values[start..start + self.size])
    }

    /// positions of `row` ranked by score descending, excluding `row` itself
    ///
    /// ties keep ascending position order.
    pub fn ranked_neighbors(&self, row: usize) -> Vec<(usize, f32)> {
        let Some(scores) = self.row(row) else {
            return Vec::new();
        };

        let mut ranked: Vec<(usize, f32)> = scores
            .iter()
            .copied()
            .enumerate()
            .filter(|(position, _)| *position != row)
            .collect();

        // sort_by is stable, so equal scores stay in position order
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CollaborativeIndexError {
    #[error("collaborative index has {names} names but the matrix is {size}x{size}")]
    Length { names: usize, size: usize },

    #[error("duplicate name in collaborative index: {0}")]
    DuplicateName(String),
}

/// collaborative matrix plus its own exact name index
#[derive(Debug, Clone)]
pub struct CollaborativeSimilarity {
    matrix: SimilarityMatrix,
    names: Vec<String>,
    by_name: HashMap<String, usize>,
}

impl CollaborativeSimilarity {
    pub fn new(
        matrix: SimilarityMatrix,
        names: Vec<String>,
    ) -> Result<Self, CollaborativeIndexError> {
        if names.len() != matrix.size() {
            return Err(CollaborativeIndexError::Length {
                names: names.len(),
                size: matrix.size(),
            });
        }

        let mut by_name = HashMap::with_capacity(names.len());
        for (position, name) in names.iter().enumerate() {
            if by_name.insert(name.clone(), position).is_some() {
                return Err(CollaborativeIndexError::DuplicateName(name.clone()));
            }
        }

        Ok(Self {
            matrix,
            names,
            by_name,
        })
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }

    /// exact, case-sensitive lookup
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn name_at(&self, position: usize) -> Option<&str> {
        self.names.get(position).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}
