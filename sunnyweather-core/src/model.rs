use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Format of the local timestamps Open-Meteo reports, e.g. `2024-05-01T14:00`.
const OBSERVATION_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// A geocoded place returned by a location search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub id: String,
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: String,
}

/// One current-conditions reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// Degrees Celsius.
    pub temperature: f64,
    pub windspeed: f64,
    /// Degrees.
    pub winddirection: f64,
    /// WMO weather code.
    pub weathercode: i32,
    /// Provider-local ISO-8601 timestamp.
    pub time: String,
}

impl CurrentWeather {
    /// Parse `time`, accepting both minute and second precision.
    pub fn observed_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.time, OBSERVATION_TIME_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(&self.time, "%Y-%m-%dT%H:%M:%S"))
            .ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: GeoLocation,
    pub current: CurrentWeather,
}

/// A bookmarked city as persisted in the favorites slot.
///
/// Coordinates and timezone are optional so entries saved in the reduced
/// `{id, name, country}` shape still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteLocation {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl FavoriteLocation {
    /// Rebuild the full location, if the coordinates were stored.
    pub fn to_geo_location(&self) -> Option<GeoLocation> {
        let (latitude, longitude) = (self.latitude?, self.longitude?);

        Some(GeoLocation {
            id: self.id.clone(),
            name: self.name.clone(),
            country: self.country.clone(),
            latitude,
            longitude,
            timezone: self.timezone.clone().unwrap_or_default(),
        })
    }

    pub fn label(&self) -> String {
        if self.country.is_empty() {
            return self.name.clone();
        }
        format!("{}, {}", self.name, self.country)
    }
}

impl From<&GeoLocation> for FavoriteLocation {
    fn from(location: &GeoLocation) -> Self {
        FavoriteLocation {
            id: location.id.clone(),
            name: location.name.clone(),
            country: location.country.clone(),
            latitude: Some(location.latitude),
            longitude: Some(location.longitude),
            timezone: (!location.timezone.is_empty()).then(|| location.timezone.clone()),
        }
    }
}

/// User-facing error shape shown next to the control that triggered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherApiError {
    pub message: String,
}

impl WeatherApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl std::fmt::Display for WeatherApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(time: &str) -> CurrentWeather {
        CurrentWeather {
            temperature: 20.3,
            windspeed: 7.2,
            winddirection: 180.0,
            weathercode: 0,
            time: time.to_string(),
        }
    }

    #[test]
    fn observed_at_parses_minute_precision() {
        let parsed = reading("2024-05-01T14:00").observed_at().expect("must parse");
        assert_eq!(parsed.format("%H:%M").to_string(), "14:00");
    }

    #[test]
    fn observed_at_returns_none_for_garbage() {
        assert!(reading("yesterday").observed_at().is_none());
    }

    #[test]
    fn legacy_favorite_without_coordinates_deserializes() {
        let fav: FavoriteLocation =
            serde_json::from_str(r#"{"id":"1","name":"Kyiv","country":"Ukraine"}"#)
                .expect("legacy shape must load");

        assert_eq!(fav.latitude, None);
        assert!(fav.to_geo_location().is_none());
    }

    #[test]
    fn favorite_without_country_deserializes() {
        let fav: FavoriteLocation =
            serde_json::from_str(r#"{"id":"2","name":"Point Nemo"}"#).expect("country is optional");
        assert_eq!(fav.country, "");
        assert_eq!(fav.label(), "Point Nemo");
    }

    #[test]
    fn favorite_with_coordinates_rebuilds_location() {
        let fav = FavoriteLocation {
            id: "1".into(),
            name: "Kyiv".into(),
            country: "Ukraine".into(),
            latitude: Some(50.45),
            longitude: Some(30.52),
            timezone: None,
        };

        let loc = fav.to_geo_location().expect("coordinates present");
        assert_eq!(loc.latitude, 50.45);
        assert_eq!(loc.timezone, "");
        assert_eq!(fav.label(), "Kyiv, Ukraine");
    }
}
