use crate::features::FeatureVector;
use wcf_core::Result;

/// A regression model the forecaster can train and query.
///
/// Any implementation works: the forecaster only relies on the feature
/// layout of [`FeatureVector`] and on calling `predict` after `fit`.
/// Failures are reported as `ForecastError::ModelFit`.
pub trait Regressor {
    /// Fit the model to training data
    fn fit(&mut self, features: &[FeatureVector], targets: &[f64]) -> Result<()>;

    /// Predict one value per feature row
    fn predict(&self, features: &[FeatureVector]) -> Result<Vec<f64>>;

    /// Predict a single sample
    fn predict_one(&self, features: &FeatureVector) -> Result<f64> {
        self.predict(std::slice::from_ref(features))?
            .into_iter()
            .next()
            .ok_or_else(|| wcf_core::ForecastError::ModelFit("model returned no prediction".to_string()))
    }
}

impl<R: Regressor + ?Sized> Regressor for Box<R> {
    fn fit(&mut self, features: &[FeatureVector], targets: &[f64]) -> Result<()> {
        (**self).fit(features, targets)
    }

    fn predict(&self, features: &[FeatureVector]) -> Result<Vec<f64>> {
        (**self).predict(features)
    }
}
