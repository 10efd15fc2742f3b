//! WMO weather code labels.
//!
//! See: https://open-meteo.com/en/docs#weathervariables

use crate::model::WeatherSnapshot;

pub const UNKNOWN_CONDITIONS: &str = "Unknown conditions";

/// Short label for a WMO weather code.
pub fn describe_code(code: i32) -> &'static str {
    match code {
        0 => "Clear",
        1 | 2 => "Mostly clear",
        3 => "Cloudy",
        45 | 48 => "Fog",
        51 | 53 | 55 => "Drizzle",
        61 | 63 | 65 => "Rain",
        71 | 73 | 75 => "Snow",
        80..=82 => "Showers",
        95 => "Thunderstorm",
        96 | 99 => "Thunderstorm with hail",
        _ => UNKNOWN_CONDITIONS,
    }
}

/// e.g. `Clear, 20.3°C`
pub fn describe_snapshot(snapshot: &WeatherSnapshot) -> String {
    format!(
        "{}, {:.1}°C",
        describe_code(snapshot.current.weathercode),
        snapshot.current.temperature
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CurrentWeather, GeoLocation};

    const MAPPED: &[(i32, &str)] = &[
        (0, "Clear"),
        (1, "Mostly clear"),
        (2, "Mostly clear"),
        (3, "Cloudy"),
        (45, "Fog"),
        (48, "Fog"),
        (51, "Drizzle"),
        (53, "Drizzle"),
        (55, "Drizzle"),
        (61, "Rain"),
        (63, "Rain"),
        (65, "Rain"),
        (71, "Snow"),
        (73, "Snow"),
        (75, "Snow"),
        (80, "Showers"),
        (81, "Showers"),
        (82, "Showers"),
        (95, "Thunderstorm"),
        (96, "Thunderstorm with hail"),
        (99, "Thunderstorm with hail"),
    ];

    #[test]
    fn every_mapped_code_has_its_label() {
        for (code, label) in MAPPED {
            assert_eq!(describe_code(*code), *label, "code {code}");
        }
    }

    #[test]
    fn unmapped_codes_are_unknown() {
        for code in (-5..=120).filter(|c| !MAPPED.iter().any(|(m, _)| m == c)) {
            assert_eq!(describe_code(code), UNKNOWN_CONDITIONS, "code {code}");
        }
        assert_eq!(describe_code(i32::MAX), UNKNOWN_CONDITIONS);
    }

    #[test]
    fn snapshot_description_rounds_to_one_decimal() {
        let snapshot = WeatherSnapshot {
            location: GeoLocation {
                id: "1".into(),
                name: "Kyiv".into(),
                country: "Ukraine".into(),
                latitude: 50.45,
                longitude: 30.52,
                timezone: "Europe/Kyiv".into(),
            },
            current: CurrentWeather {
                temperature: 20.3,
                windspeed: 5.0,
                winddirection: 90.0,
                weathercode: 0,
                time: "2024-05-01T14:00".into(),
            },
        };

        assert_eq!(describe_snapshot(&snapshot), "Clear, 20.3°C");
    }
}
