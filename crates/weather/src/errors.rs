use thiserror::Error;

/// Text shown to the user for any failed weather lookup
pub const WEATHER_WARNING: &str = "Error fetching weather data. Please check city name or API key.";

/// Text shown when no city was entered
pub const EMPTY_CITY_WARNING: &str = "Please enter a city name.";

/// Weather lookup errors
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("no city name given")]
    EmptyCity,

    #[error("weather API key is not configured")]
    MissingApiKey,

    #[error("network error: {0}")]
    Network(String),

    #[error("city not found: {0}")]
    CityNotFound(String),

    #[error("weather service rejected the API key")]
    Unauthorized,

    #[error("weather service returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("malformed weather response: {0}")]
    MalformedResponse(String),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl WeatherError {
    /// The single warning shown to the user for this failure
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::EmptyCity => EMPTY_CITY_WARNING,
            _ => WEATHER_WARNING,
        }
    }
}

pub type Result<T> = std::result::Result<T, WeatherError>;
