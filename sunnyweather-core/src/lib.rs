//! Core library for the `sunnyweather` CLI.
//!
//! This crate defines:
//! - Shared domain models (locations, readings, favorites)
//! - The Open-Meteo gateway behind the `WeatherGateway` trait
//! - The search/select state machine
//! - Favorites persistence and configuration handling
//!
//! It is used by `sunnyweather-cli`, but can also back other front ends.

pub mod conditions;
pub mod config;
pub mod error;
pub mod favorites;
pub mod model;
pub mod provider;
pub mod search;

pub use conditions::{describe_code, describe_snapshot};
pub use config::Config;
pub use error::{WeatherError, normalize_error};
pub use favorites::{AddOutcome, FavoritesStore, FileStore, KeyValueStore, MemoryStore, to_favorite};
pub use model::{CurrentWeather, FavoriteLocation, GeoLocation, WeatherApiError, WeatherSnapshot};
pub use provider::{OpenMeteoProvider, WeatherGateway, fetch_favorite};
pub use search::{SearchState, WeatherSearch, WeatherState};
