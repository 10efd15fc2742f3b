use crate::model::WeatherApiError;

pub const EMPTY_QUERY_MESSAGE: &str = "Enter a city name to search.";
pub const NOTHING_FOUND_MESSAGE: &str = "Nothing found.";
pub const SEARCH_FAILED_MESSAGE: &str = "Could not find locations. Please try again.";
pub const WEATHER_FAILED_MESSAGE: &str = "Could not load the weather. Please try again.";
pub const MISSING_CURRENT_MESSAGE: &str = "Current weather data is missing for this location.";
pub const FAVORITE_NOT_FOUND_MESSAGE: &str =
    "This city could not be found again. Remove it and add it once more.";
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred while loading the weather.";

/// Failures of a weather lookup or of the favorites slot.
///
/// `Display` is the message shown to the user; the technical detail is logged
/// where the error is raised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WeatherError {
    /// Rejected locally, never sent to the network.
    #[error("{0}")]
    Validation(String),

    /// Transport failure or non-success HTTP status.
    #[error("{0}")]
    Network(String),

    /// The response was well formed but lacked the expected block.
    #[error("{0}")]
    MissingData(String),

    /// Malformed JSON. Carries the same message as the matching network failure.
    #[error("{0}")]
    Parse(String),

    #[error("{0}")]
    Storage(String),
}

impl WeatherError {
    pub fn empty_query() -> Self {
        Self::Validation(EMPTY_QUERY_MESSAGE.to_string())
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation(m)
            | Self::Network(m)
            | Self::MissingData(m)
            | Self::Parse(m)
            | Self::Storage(m) => m,
        }
    }
}

impl From<&WeatherError> for WeatherApiError {
    fn from(err: &WeatherError) -> Self {
        WeatherApiError::new(err.message())
    }
}

impl From<WeatherError> for WeatherApiError {
    fn from(err: WeatherError) -> Self {
        WeatherApiError::from(&err)
    }
}

/// Convert any failure into the uniform user-facing shape.
pub fn normalize_error(err: &anyhow::Error) -> WeatherApiError {
    for cause in err.chain() {
        if let Some(weather) = cause.downcast_ref::<WeatherError>() {
            return weather.into();
        }
        if cause.downcast_ref::<reqwest::Error>().is_some() {
            return WeatherApiError::new(WEATHER_FAILED_MESSAGE);
        }
    }

    WeatherApiError::new(UNKNOWN_ERROR_MESSAGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn weather_error_normalizes_to_its_message() {
        let err = anyhow::Error::new(WeatherError::MissingData(MISSING_CURRENT_MESSAGE.into()));
        assert_eq!(normalize_error(&err).message, MISSING_CURRENT_MESSAGE);
    }

    #[test]
    fn wrapped_weather_error_is_found_in_chain() {
        let res: Result<(), WeatherError> = Err(WeatherError::empty_query());
        let err = res.context("while running search").unwrap_err();

        assert_eq!(normalize_error(&err).message, EMPTY_QUERY_MESSAGE);
    }

    #[test]
    fn unrecognized_error_maps_to_fallback() {
        let err = anyhow::anyhow!("disk on fire");
        assert_eq!(normalize_error(&err).message, UNKNOWN_ERROR_MESSAGE);
    }

    #[test]
    fn display_is_user_message() {
        let err = WeatherError::Network(SEARCH_FAILED_MESSAGE.into());
        assert_eq!(err.to_string(), SEARCH_FAILED_MESSAGE);
        assert_eq!(WeatherApiError::from(err).message, SEARCH_FAILED_MESSAGE);
    }
}
