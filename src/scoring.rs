//! score fusion and normalization for hybrid recommendations
//!
//! this module handles the weighted combination of content-based (CBF) and
//! collaborative (CF) similarity scores.
//!
//! ## merge
//!
//! the two neighbor lists are full-outer-joined on `(game_id, name)`. a game
//! present on one side only gets 0 for the other. merge order is content rank
//! order, followed by collaborative-only games in collaborative rank order.
//!
//! ## normalization
//!
//! - **min-max scaling** per column: `(x - min) / (max - min)`, mapping to [0, 1]
//! - a column with a single distinct value is left untouched
//!
//! ## fusion formula
//!
//! ```text
//! score = cbf_weight * cbf + cf_weight * cf
//! ```
//!
//! weights are not required to sum to 1.

use std::collections::HashMap;

use crate::providers::Recommendation;

/// configuration for score fusion
#[derive(Debug, Clone, PartialEq)]
pub struct FusionConfig {
    /// weight for normalized content scores
    pub cbf_weight: f32,
    /// weight for normalized collaborative scores
    pub cf_weight: f32,
    /// maximum number of fused results
    pub top_n: usize,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            cbf_weight: 0.7,
            cf_weight: 0.3,
            top_n: 10,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("invalid {field}: {value} (weights must be finite and non-negative)")]
pub struct InvalidWeight {
    pub field: &'static str,
    pub value: f32,
}

impl FusionConfig {
    pub fn new(cbf_weight: f32, cf_weight: f32, top_n: usize) -> Self {
        Self {
            cbf_weight,
            cf_weight,
            top_n,
        }
    }

    pub fn validate(&self) -> Result<(), InvalidWeight> {
        for (field, value) in [("cbf_weight", self.cbf_weight), ("cf_weight", self.cf_weight)] {
            if !value.is_finite() || value < 0.0 {
                return Err(InvalidWeight { field, value });
            }
        }
        Ok(())
    }
}

/// a fused recommendation
#[derive(Debug, Clone, PartialEq)]
pub struct HybridRecommendation {
    pub game_id: String,
    pub name: String,
    pub hybrid_score: f32,
}

/// one row of the outer join
#[derive(Debug, Clone, PartialEq)]
pub struct MergedRow {
    pub game_id: String,
    pub name: String,
    pub cbf_score: f32,
    pub cf_score: f32,
}

/// full outer join of the two neighbor lists, missing side filled with 0
pub fn merge_outer(content: &[Recommendation], collaborative: &[Recommendation]) -> Vec<MergedRow> {
    let mut rows: Vec<MergedRow> = Vec::with_capacity(content.len() + collaborative.len());
    let mut slots: HashMap<(&str, &str), usize> = HashMap::new();

    for rec in content {
        let key = (rec.game_id.as_str(), rec.name.as_str());
        match slots.get(&key) {
            Some(&slot) => rows[slot].cbf_score = rec.score,
            None => {
                slots.insert(key, rows.len());
                rows.push(MergedRow {
                    game_id: rec.game_id.clone(),
                    name: rec.name.clone(),
                    cbf_score: rec.score,
                    cf_score: 0.0,
                });
            }
        }
    }

    for rec in collaborative {
        let key = (rec.game_id.as_str(), rec.name.as_str());
        match slots.get(&key) {
            Some(&slot) => rows[slot].cf_score = rec.score,
            None => {
                slots.insert(key, rows.len());
                rows.push(MergedRow {
                    game_id: rec.game_id.clone(),
                    name: rec.name.clone(),
                    cbf_score: 0.0,
                    cf_score: rec.score,
                });
            }
        }
    }

    rows
}

/// min-max scale `scores` in place
///
/// returns false (and leaves the values unchanged) when there are fewer than
/// two distinct values.
pub fn min_max_normalize(scores: &mut [f32]) -> bool {
    let (min, max) = scores
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &s| {
            (lo.min(s), hi.max(s))
        });

    if max <= min {
        return false;
    }

    // f64 keeps `max - min` finite for extreme f32 inputs
    let (min, range) = (min as f64, max as f64 - min as f64);
    for score in scores.iter_mut() {
        *score = ((*score as f64 - min) / range) as f32;
    }
    true
}

/// normalize both columns of the merged rows independently
pub fn normalize_columns(rows: &mut [MergedRow]) {
    let mut cbf: Vec<f32> = rows.iter().map(|r| r.cbf_score).collect();
    let mut cf: Vec<f32> = rows.iter().map(|r| r.cf_score).collect();

    min_max_normalize(&mut cbf);
    min_max_normalize(&mut cf);

    for ((row, cbf), cf) in rows.iter_mut().zip(cbf).zip(cf) {
        row.cbf_score = cbf;
        row.cf_score = cf;
    }
}

/// fuse normalized rows using the weighted combination
///
/// returns the top `config.top_n` sorted by fused score (descending); equal
/// scores keep merge order.
pub fn fuse_scores(rows: Vec<MergedRow>, config: &FusionConfig) -> Vec<HybridRecommendation> {
    let mut fused: Vec<HybridRecommendation> = rows
        .into_iter()
        .map(|row| HybridRecommendation {
            hybrid_score: config.cbf_weight * row.cbf_score + config.cf_weight * row.cf_score,
            game_id: row.game_id,
            name: row.name,
        })
        .collect();

    // sort descending by score
    fused.sort_by(|a, b| {
        b.hybrid_score
            .partial_cmp(&a.hybrid_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    fused.truncate(config.top_n);

    fused
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, score: f32) -> Recommendation {
        Recommendation {
            game_id: id.to_string(),
            name: id.to_uppercase(),
            score,
        }
    }

    #[test]
    fn test_min_max_normalize() {
        let mut scores = vec![10.0, 5.0, 2.5, 0.0];
        assert!(min_max_normalize(&mut scores));

        assert!((scores[0] - 1.0).abs() < 0.001);
        assert!((scores[1] - 0.5).abs() < 0.001);
        assert!((scores[2] - 0.25).abs() < 0.001);
        assert!((scores[3] - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_min_max_is_a_fixed_point() {
        let mut scores = vec![0.0, 0.3, 1.0, 0.75];
        min_max_normalize(&mut scores);
        let once = scores.clone();
        min_max_normalize(&mut scores);
        assert_eq!(once, scores);
    }

    #[test]
    fn test_degenerate_column_left_unscaled() {
        let mut equal = vec![0.4, 0.4, 0.4];
        assert!(!min_max_normalize(&mut equal));
        assert_eq!(equal, vec![0.4, 0.4, 0.4]);

        let mut empty: Vec<f32> = vec![];
        assert!(!min_max_normalize(&mut empty));

        let mut single = vec![7.0];
        assert!(!min_max_normalize(&mut single));
        assert_eq!(single, vec![7.0]);
    }

    #[test]
    fn test_extreme_range_stays_finite() {
        let mut scores = vec![3.0e38, -3.0e38, 0.0];
        assert!(min_max_normalize(&mut scores));
        assert_eq!(scores, vec![1.0, 0.0, 0.5]);
    }

    #[test]
    fn test_merge_disjoint_sources_keeps_every_row() {
        let content: Vec<Recommendation> = (0..10).map(|i| rec(&format!("c{i}"), 0.9)).collect();
        let collaborative: Vec<Recommendation> =
            (0..10).map(|i| rec(&format!("f{i}"), 0.4)).collect();

        let rows = merge_outer(&content, &collaborative);
        assert_eq!(rows.len(), 20);
        assert!(rows[..10].iter().all(|r| r.cf_score == 0.0));
        assert!(rows[10..].iter().all(|r| r.cbf_score == 0.0));
    }

    #[test]
    fn test_merge_is_full_outer_join() {
        let content = vec![rec("a", 0.9), rec("b", 0.5)];
        let collaborative = vec![rec("c", 0.8), rec("a", 0.4)];

        let rows = merge_outer(&content, &collaborative);
        let got: Vec<(&str, f32, f32)> = rows
            .iter()
            .map(|r| (r.game_id.as_str(), r.cbf_score, r.cf_score))
            .collect();

        assert_eq!(got, vec![("a", 0.9, 0.4), ("b", 0.5, 0.0), ("c", 0.0, 0.8)]);
    }

    #[test]
    fn test_merge_keys_on_id_and_name() {
        let content = vec![rec("a", 0.9)];
        let mut renamed = rec("a", 0.4);
        renamed.name = "Other".into();

        let rows = merge_outer(&content, &[renamed]);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_fuse_scores_pure_content() {
        let rows = vec![
            MergedRow {
                game_id: "a".into(),
                name: "A".into(),
                cbf_score: 0.2,
                cf_score: 1.0,
            },
            MergedRow {
                game_id: "b".into(),
                name: "B".into(),
                cbf_score: 0.9,
                cf_score: 0.0,
            },
        ];

        let fused = fuse_scores(rows, &FusionConfig::new(1.0, 0.0, 10));

        assert_eq!(fused[0].game_id, "b");
        assert!((fused[0].hybrid_score - 0.9).abs() < 0.001);
    }

    #[test]
    fn test_fuse_scores_weighted_and_truncated() {
        let rows = vec![
            MergedRow {
                game_id: "a".into(),
                name: "A".into(),
                cbf_score: 0.8,
                cf_score: 0.4,
            },
            MergedRow {
                game_id: "b".into(),
                name: "B".into(),
                cbf_score: 0.0,
                cf_score: 0.0,
            },
        ];

        let fused = fuse_scores(rows, &FusionConfig::new(0.5, 0.5, 1));

        // 0.5 * 0.8 + 0.5 * 0.4 = 0.6
        assert_eq!(fused.len(), 1);
        assert!((fused[0].hybrid_score - 0.6).abs() < 0.001);
    }

    #[test]
    fn test_fuse_ties_keep_merge_order() {
        let rows: Vec<MergedRow> = ["x", "y", "z"]
            .iter()
            .map(|id| MergedRow {
                game_id: id.to_string(),
                name: id.to_string(),
                cbf_score: 0.5,
                cf_score: 0.5,
            })
            .collect();

        let fused = fuse_scores(rows, &FusionConfig::default());
        let ids: Vec<&str> = fused.iter().map(|r| r.game_id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_validate_weights() {
        assert!(FusionConfig::default().validate().is_ok());
        assert_eq!(
            FusionConfig::new(-0.1, 0.3, 10).validate(),
            Err(InvalidWeight {
                field: "cbf_weight",
                value: -0.1
            })
        );
        assert!(FusionConfig::new(0.7, f32::NAN, 10).validate().is_err());
    }
}
