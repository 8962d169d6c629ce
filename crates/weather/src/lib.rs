//! Weather-derived input for crop recommendation
//!
//! Fetches the current temperature and humidity for a city and completes the
//! feature vector with fixed soil placeholders. Any failure along the way
//! becomes one user-facing warning.

pub mod adapter;
pub mod client;
pub mod errors;

pub use adapter::{features_from_observation, WeatherAdapter, WeatherOutcome};
pub use client::{OpenWeatherClient, WeatherConfig, WeatherObservation, WeatherSource};
pub use errors::{Result, WeatherError, EMPTY_CITY_WARNING, WEATHER_WARNING};
