//! Gradient-boosted regression trees with squared-error loss.
//!
//! Each boosting round fits a depth-limited tree to the current residuals on
//! a random subset of rows and columns, then adds it to the ensemble scaled
//! by the learning rate. Sampling is driven by a seeded RNG, so identical
//! params and data always produce the identical model.

use crate::features::{FeatureVector, N_FEATURES};
use crate::regressor::Regressor;
use rand::{rngs::StdRng, seq::index, SeedableRng};
use serde::{Deserialize, Serialize};
use wcf_core::{ForecastError, Result};

/// Smallest error reduction that counts as a useful split.
const MIN_GAIN: f64 = 1e-12;

/// Hyper-parameters for [`GradientBoostedTrees`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientBoostingParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    /// Fraction of rows sampled (without replacement) for each tree.
    pub subsample: f64,
    /// Fraction of feature columns considered by each tree.
    pub colsample: f64,
    pub min_samples_leaf: usize,
    pub seed: u64,
}

impl Default for GradientBoostingParams {
    fn default() -> Self {
        GradientBoostingParams {
            n_estimators: 300,
            learning_rate: 0.05,
            max_depth: 6,
            subsample: 0.8,
            colsample: 0.8,
            min_samples_leaf: 1,
            seed: 42,
        }
    }
}

impl GradientBoostingParams {
    pub fn validate(&self) -> Result<()> {
        let fraction_ok = |f: f64| f > 0.0 && f <= 1.0;
        if self.n_estimators == 0 {
            return Err(ForecastError::ModelFit("n_estimators must be positive".to_string()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(ForecastError::ModelFit(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !fraction_ok(self.subsample) || !fraction_ok(self.colsample) {
            return Err(ForecastError::ModelFit(format!(
                "subsample and colsample must be in (0, 1], got {} and {}",
                self.subsample, self.colsample
            )));
        }
        if self.min_samples_leaf == 0 {
            return Err(ForecastError::ModelFit("min_samples_leaf must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn predict(&self, x: &FeatureVector) -> f64 {
        match self {
            Node::Leaf(value) => *value,
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if x[*feature] <= *threshold {
                    left.predict(x)
                } else {
                    right.predict(x)
                }
            }
        }
    }
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// Grows one regression tree over a fixed sample of rows and columns.
struct TreeBuilder<'a> {
    features: &'a [FeatureVector],
    residuals: &'a [f64],
    columns: &'a [usize],
    max_depth: usize,
    min_samples_leaf: usize,
}

impl TreeBuilder<'_> {
    fn build(&self, rows: &mut [usize], depth: usize) -> Node {
        let sum: f64 = rows.iter().map(|&r| self.residuals[r]).sum();
        let leaf_value = sum / rows.len() as f64;
        if depth >= self.max_depth || rows.len() < 2 * self.min_samples_leaf {
            return Node::Leaf(leaf_value);
        }
        let Some(best) = self.best_split(rows, sum) else {
            return Node::Leaf(leaf_value);
        };

        rows.sort_by(|&a, &b| {
            self.features[a][best.feature].total_cmp(&self.features[b][best.feature])
        });
        let mid = rows.partition_point(|&r| self.features[r][best.feature] <= best.threshold);
        if mid == 0 || mid == rows.len() {
            return Node::Leaf(leaf_value);
        }
        let (left_rows, right_rows) = rows.split_at_mut(mid);
        Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: Box::new(self.build(left_rows, depth + 1)),
            right: Box::new(self.build(right_rows, depth + 1)),
        }
    }

    fn best_split(&self, rows: &[usize], total: f64) -> Option<SplitCandidate> {
        let n = rows.len();
        let parent_score = total * total / n as f64;
        let mut best: Option<SplitCandidate> = None;
        let mut sorted = rows.to_vec();

        for &feature in self.columns {
            sorted.sort_by(|&a, &b| self.features[a][feature].total_cmp(&self.features[b][feature]));
            let mut left_sum = 0.0;
            for k in 1..n {
                left_sum += self.residuals[sorted[k - 1]];
                let lo = self.features[sorted[k - 1]][feature];
                let hi = self.features[sorted[k]][feature];
                if k < self.min_samples_leaf || n - k < self.min_samples_leaf || lo >= hi {
                    continue;
                }
                let right_sum = total - left_sum;
                let score = left_sum * left_sum / k as f64 + right_sum * right_sum / (n - k) as f64;
                let gain = score - parent_score;
                if gain > MIN_GAIN && best.as_ref().map_or(true, |b| gain > b.gain) {
                    // For adjacent floats the midpoint rounds up to `hi`.
                    let mid = lo + (hi - lo) / 2.0;
                    best = Some(SplitCandidate {
                        feature,
                        threshold: if mid < hi { mid } else { lo },
                        gain,
                    });
                }
            }
        }
        best
    }
}

#[derive(Debug, Clone)]
struct Ensemble {
    base_score: f64,
    trees: Vec<Node>,
}

/// Squared-error gradient boosting over regression trees.
#[derive(Debug, Clone)]
pub struct GradientBoostedTrees {
    params: GradientBoostingParams,
    ensemble: Option<Ensemble>,
}

impl Default for GradientBoostedTrees {
    fn default() -> Self {
        Self::new(GradientBoostingParams::default())
    }
}

impl GradientBoostedTrees {
    pub fn new(params: GradientBoostingParams) -> Self {
        GradientBoostedTrees {
            params,
            ensemble: None,
        }
    }

    pub fn params(&self) -> &GradientBoostingParams {
        &self.params
    }

    /// Number of fitted trees, zero before `fit`.
    pub fn n_trees(&self) -> usize {
        self.ensemble.as_ref().map_or(0, |e| e.trees.len())
    }
}

impl Regressor for GradientBoostedTrees {
    fn fit(&mut self, features: &[FeatureVector], targets: &[f64]) -> Result<()> {
        self.params.validate()?;
        if features.is_empty() {
            return Err(ForecastError::ModelFit("no training rows".to_string()));
        }
        if features.len() != targets.len() {
            return Err(ForecastError::ModelFit(format!(
                "{} feature rows but {} targets",
                features.len(),
                targets.len()
            )));
        }
        if targets.iter().any(|y| !y.is_finite())
            || features.iter().flatten().any(|x| !x.is_finite())
        {
            return Err(ForecastError::ModelFit("training data contains non-finite values".to_string()));
        }

        let n = features.len();
        let base_score = targets.iter().sum::<f64>() / n as f64;
        let mut predictions = vec![base_score; n];
        let mut residuals = vec![0.0; n];
        let n_rows = ((n as f64 * self.params.subsample).round() as usize).clamp(1, n);
        let n_cols = ((N_FEATURES as f64 * self.params.colsample).round() as usize).clamp(1, N_FEATURES);
        let mut rng = StdRng::seed_from_u64(self.params.seed);
        let mut trees = Vec::with_capacity(self.params.n_estimators);

        for _ in 0..self.params.n_estimators {
            for (r, (y, p)) in residuals.iter_mut().zip(targets.iter().zip(&predictions)) {
                *r = y - p;
            }
            let mut rows = index::sample(&mut rng, n, n_rows).into_vec();
            let mut columns = index::sample(&mut rng, N_FEATURES, n_cols).into_vec();
            columns.sort_unstable();

            let builder = TreeBuilder {
                features,
                residuals: &residuals,
                columns: &columns,
                max_depth: self.params.max_depth,
                min_samples_leaf: self.params.min_samples_leaf,
            };
            let tree = builder.build(&mut rows, 0);
            for (p, x) in predictions.iter_mut().zip(features) {
                *p += self.params.learning_rate * tree.predict(x);
            }
            trees.push(tree);
        }

        if predictions.iter().any(|p| !p.is_finite()) {
            return Err(ForecastError::ModelFit("boosting diverged to non-finite predictions".to_string()));
        }
        self.ensemble = Some(Ensemble { base_score, trees });
        Ok(())
    }

    fn predict(&self, features: &[FeatureVector]) -> Result<Vec<f64>> {
        let ensemble = self
            .ensemble
            .as_ref()
            .ok_or_else(|| ForecastError::ModelFit("model has not been fitted".to_string()))?;
        let lr = self.params.learning_rate;
        Ok(features
            .iter()
            .map(|x| {
                ensemble.base_score + ensemble.trees.iter().map(|t| lr * t.predict(x)).sum::<f64>()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(a: f64, b: f64) -> FeatureVector {
        [2023.0, 1.0, a, b, a, b, (a + b) / 2.0]
    }

    fn step_data() -> (Vec<FeatureVector>, Vec<f64>) {
        let features: Vec<FeatureVector> = (0..40).map(|i| row(i as f64, (i % 7) as f64)).collect();
        let targets = (0..40).map(|i| if i < 20 { 5.0 } else { 15.0 }).collect();
        (features, targets)
    }

    #[test]
    fn test_constant_target_predicts_constant() {
        let features: Vec<FeatureVector> = (0..30).map(|i| row(i as f64, 1.0)).collect();
        let targets = vec![10.0; 30];
        let mut model = GradientBoostedTrees::default();
        model.fit(&features, &targets).unwrap();
        let predictions = model.predict(&features).unwrap();
        for p in predictions {
            assert!((p - 10.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_learns_step_function() {
        let (features, targets) = step_data();
        let mut model = GradientBoostedTrees::default();
        model.fit(&features, &targets).unwrap();
        assert_eq!(model.n_trees(), 300);
        let low = model.predict_one(&row(3.0, 3.0)).unwrap();
        let high = model.predict_one(&row(35.0, 0.0)).unwrap();
        assert!((low - 5.0).abs() < 1.0, "low side predicted {}", low);
        assert!((high - 15.0).abs() < 1.0, "high side predicted {}", high);
    }

    #[test]
    fn test_adjacent_float_split_keeps_both_sides() {
        let lo = f64::from_bits(1.0f64.to_bits() + 1);
        let hi = f64::from_bits(1.0f64.to_bits() + 2);
        let features: Vec<FeatureVector> = (0..20)
            .map(|i| {
                let v = if i < 10 { lo } else { hi };
                [2023.0, 1.0, 1.0, 0.0, 1.0, 1.0, v]
            })
            .collect();
        let targets: Vec<f64> = (0..20).map(|i| if i < 10 { 5.0 } else { 15.0 }).collect();
        let mut model = GradientBoostedTrees::default();
        model.fit(&features, &targets).unwrap();

        let at = |v: f64| model.predict_one(&[2023.0, 1.0, 1.0, 0.0, 1.0, 1.0, v]).unwrap();
        let (p_lo, p_hi, p_above) = (at(lo), at(hi), at(1.5));
        assert!(p_lo.is_finite() && p_hi.is_finite() && p_above.is_finite());
        assert!(p_lo < 7.0, "low side predicted {}", p_lo);
        assert!(p_hi > 13.0, "high side predicted {}", p_hi);
        assert!((p_above - p_hi).abs() < 1e-9);
    }

    #[test]
    fn test_single_valued_column_never_splits() {
        let lo = f64::from_bits(1.0f64.to_bits() + 1);
        let features = vec![[2023.0, 1.0, 1.0, 0.0, 1.0, 1.0, lo]; 12];
        let targets: Vec<f64> = (0..12).map(|i| i as f64).collect();
        let mut model = GradientBoostedTrees::new(GradientBoostingParams {
            subsample: 1.0,
            ..GradientBoostingParams::default()
        });
        model.fit(&features, &targets).unwrap();
        let p = model.predict_one(&[2024.0, 12.0, 31.0, 6.0, 9.0, 9.0, 2.0]).unwrap();
        assert!((p - 5.5).abs() < 1e-9, "predicted {}", p);
    }

    #[test]
    fn test_seeded_fits_are_identical() {
        let (features, targets) = step_data();
        let mut first = GradientBoostedTrees::default();
        let mut second = GradientBoostedTrees::default();
        first.fit(&features, &targets).unwrap();
        second.fit(&features, &targets).unwrap();
        assert_eq!(
            first.predict(&features).unwrap(),
            second.predict(&features).unwrap()
        );
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let model = GradientBoostedTrees::default();
        assert!(matches!(
            model.predict(&[row(1.0, 1.0)]),
            Err(ForecastError::ModelFit(_))
        ));
    }

    #[test]
    fn test_fit_rejects_non_finite_targets() {
        let features = vec![row(1.0, 1.0), row(2.0, 2.0)];
        let mut model = GradientBoostedTrees::default();
        assert!(matches!(
            model.fit(&features, &[1.0, f64::NAN]),
            Err(ForecastError::ModelFit(_))
        ));
    }

    #[test]
    fn test_fit_rejects_empty_and_mismatched() {
        let mut model = GradientBoostedTrees::default();
        assert!(model.fit(&[], &[]).is_err());
        assert!(model.fit(&[row(1.0, 1.0)], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_invalid_params_rejected() {
        let params = GradientBoostingParams {
            subsample: 0.0,
            ..GradientBoostingParams::default()
        };
        let mut model = GradientBoostedTrees::new(params);
        assert!(matches!(
            model.fit(&[row(1.0, 1.0)], &[1.0]),
            Err(ForecastError::ModelFit(_))
        ));
    }

    #[test]
    fn test_params_deserialize_with_defaults() {
        let params: GradientBoostingParams =
            serde_json::from_str(r#"{"n_estimators": 50, "max_depth": 3}"#).unwrap();
        assert_eq!(params.n_estimators, 50);
        assert_eq!(params.max_depth, 3);
        assert_eq!(params.learning_rate, 0.05);
        assert_eq!(params.seed, 42);
    }
}
