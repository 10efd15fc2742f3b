//! Human-readable rendering of search results, readings and favorites.

use chrono::NaiveDateTime;
use std::fmt;

use sunnyweather_core::{
    FavoriteLocation, GeoLocation, WeatherApiError, WeatherSnapshot, describe_snapshot,
};

/// A search result as shown in the picker and in listings.
#[derive(Debug, Clone)]
pub struct LocationChoice(pub GeoLocation);

impl fmt::Display for LocationChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loc = &self.0;
        write!(f, "{}", loc.name)?;
        if !loc.country.is_empty() {
            write!(f, ", {}", loc.country)?;
        }
        write!(f, " ({:.2}, {:.2}) [{}]", loc.latitude, loc.longitude, loc.id)
    }
}

pub fn location_lines(locations: &[GeoLocation]) -> Vec<String> {
    locations
        .iter()
        .enumerate()
        .map(|(i, loc)| format!("{:>2}. {}", i + 1, LocationChoice(loc.clone())))
        .collect()
}

pub fn snapshot_lines(snapshot: &WeatherSnapshot) -> Vec<String> {
    let current = &snapshot.current;

    vec![
        format!("{}, {}", snapshot.location.name, snapshot.location.country),
        format!("  {}", describe_snapshot(snapshot)),
        format!("  Wind {:.1} km/h from {:.0}°", current.windspeed, current.winddirection),
        format!("  Observed {}", observed_label(current.observed_at(), &current.time)),
    ]
}

fn observed_label(parsed: Option<NaiveDateTime>, raw: &str) -> String {
    match parsed {
        Some(t) => t.format("%Y-%m-%d %H:%M").to_string(),
        None => raw.to_string(),
    }
}

pub fn favorite_line(favorite: &FavoriteLocation) -> String {
    format!("{:>10}  {}", favorite.id, favorite.label())
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

pub fn print_error(err: &WeatherApiError) {
    eprintln!("error: {err}");
}
