//! Weather-derived feature vectors
//!
//! Only temperature and humidity are measured. The soil features and rainfall
//! are fixed placeholders, so recommendations from this path are
//! lower-confidence than ones from a full manual entry.

use croprec_core::{FeatureVector, Recommendation};
use tracing::{info, warn};

use crate::client::{WeatherObservation, WeatherSource};
use crate::errors::{Result, WeatherError};

pub const PLACEHOLDER_NITROGEN: f64 = 50.0;
pub const PLACEHOLDER_PHOSPHORUS: f64 = 50.0;
pub const PLACEHOLDER_POTASSIUM: f64 = 50.0;
pub const PLACEHOLDER_PH: f64 = 6.5;
pub const PLACEHOLDER_RAINFALL: f64 = 100.0;

/// Feature vector from an observation plus the fixed placeholders
pub fn features_from_observation(observation: &WeatherObservation) -> FeatureVector {
    FeatureVector::new(
        PLACEHOLDER_NITROGEN,
        PLACEHOLDER_PHOSPHORUS,
        PLACEHOLDER_POTASSIUM,
        observation.temperature,
        observation.humidity,
        PLACEHOLDER_PH,
        PLACEHOLDER_RAINFALL,
    )
}

/// Result of the weather path: a recommendation or exactly one warning
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherOutcome {
    Recommended {
        observation: WeatherObservation,
        features: FeatureVector,
        recommendation: Recommendation,
    },
    Warning(String),
}

pub struct WeatherAdapter<S> {
    source: S,
}

impl<S: WeatherSource> WeatherAdapter<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Look up `city` and build its feature vector
    pub async fn features_for(&self, city: &str) -> Result<(WeatherObservation, FeatureVector)> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::EmptyCity);
        }
        let observation = self.source.current(city).await?;
        Ok((observation, features_from_observation(&observation)))
    }

    /// Look up `city` and hand the feature vector to `predict`
    ///
    /// `predict` is only called when the lookup succeeded. Every failure,
    /// including a rejected prediction, becomes a single warning.
    pub async fn recommend_with<F>(&self, city: &str, predict: F) -> WeatherOutcome
    where
        F: FnOnce(&FeatureVector) -> croprec_core::Result<Recommendation>,
    {
        let (observation, features) = match self.features_for(city).await {
            Ok(found) => found,
            Err(err) => {
                warn!("Weather lookup for {:?} failed: {}", city, err);
                return WeatherOutcome::Warning(err.user_message().to_string());
            }
        };

        info!(
            "Weather for {}: {:.1}°C, {:.0}% humidity",
            city.trim(),
            observation.temperature,
            observation.humidity
        );

        match predict(&features) {
            Ok(recommendation) => WeatherOutcome::Recommended {
                observation,
                features,
                recommendation,
            },
            Err(err) => {
                warn!("Prediction from weather data failed: {}", err);
                WeatherOutcome::Warning(format!("Could not recommend a crop: {err}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{EMPTY_CITY_WARNING, WEATHER_WARNING};
    use async_trait::async_trait;
    use croprec_core::{CoreError, CropInfo};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubSource {
        reply: fn() -> Result<WeatherObservation>,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn new(reply: fn() -> Result<WeatherObservation>) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl WeatherSource for StubSource {
        async fn current(&self, _city: &str) -> Result<WeatherObservation> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.reply)()
        }
    }

    fn humid() -> Result<WeatherObservation> {
        Ok(WeatherObservation {
            temperature: 26.0,
            humidity: 81.0,
        })
    }

    fn not_found() -> Result<WeatherObservation> {
        Err(WeatherError::CityNotFound("Atlantis".into()))
    }

    fn rice(_: &FeatureVector) -> croprec_core::Result<Recommendation> {
        Ok(Recommendation {
            crop: "rice".into(),
            code: 0,
            info: CropInfo::lookup("rice"),
        })
    }

    #[test]
    fn test_placeholders() {
        let features = features_from_observation(&WeatherObservation {
            temperature: 30.5,
            humidity: 40.0,
        });
        assert_eq!(features.as_slice(), &[50.0, 50.0, 50.0, 30.5, 40.0, 6.5, 100.0]);
    }

    #[tokio::test]
    async fn test_successful_lookup_recommends() {
        let adapter = WeatherAdapter::new(StubSource::new(humid));

        let mut seen = None;
        let outcome = adapter
            .recommend_with("  Lucknow ", |features| {
                seen = Some(*features);
                rice(features)
            })
            .await;

        match outcome {
            WeatherOutcome::Recommended {
                observation,
                recommendation,
                ..
            } => {
                assert_eq!(observation.humidity, 81.0);
                assert_eq!(recommendation.crop, "rice");
            }
            other => panic!("expected recommendation, got {other:?}"),
        }
        let features = seen.expect("predict called");
        assert_eq!(features.temperature(), 26.0);
        assert_eq!(features.nitrogen(), PLACEHOLDER_NITROGEN);
    }

    #[tokio::test]
    async fn test_failed_lookup_never_reaches_predictor() {
        let adapter = WeatherAdapter::new(StubSource::new(not_found));

        let mut called = false;
        let outcome = adapter
            .recommend_with("Atlantis", |features| {
                called = true;
                rice(features)
            })
            .await;

        assert_eq!(outcome, WeatherOutcome::Warning(WEATHER_WARNING.to_string()));
        assert!(!called);
    }

    #[tokio::test]
    async fn test_empty_city_skips_network() {
        let adapter = WeatherAdapter::new(StubSource::new(humid));

        let outcome = adapter.recommend_with("   ", rice).await;

        assert_eq!(outcome, WeatherOutcome::Warning(EMPTY_CITY_WARNING.to_string()));
        assert_eq!(adapter.source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rejected_prediction_is_one_warning() {
        let adapter = WeatherAdapter::new(StubSource::new(humid));

        let outcome = adapter
            .recommend_with("Lucknow", |_| Err(CoreError::InvalidInput("bad".into())))
            .await;

        assert!(matches!(outcome, WeatherOutcome::Warning(_)));
        assert_eq!(adapter.source.calls.load(Ordering::SeqCst), 1);
    }
}
