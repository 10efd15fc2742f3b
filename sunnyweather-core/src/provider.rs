use crate::{
    error::{FAVORITE_NOT_FOUND_MESSAGE, WeatherError},
    model::{FavoriteLocation, GeoLocation, WeatherSnapshot},
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod open_meteo;

pub use open_meteo::OpenMeteoProvider;

/// Remote place search and current-conditions lookup.
#[async_trait]
pub trait WeatherGateway: Send + Sync + Debug {
    /// Places matching `query`. A blank query yields no results without a request.
    async fn search(&self, query: &str) -> Result<Vec<GeoLocation>, WeatherError>;

    async fn fetch_current(&self, location: &GeoLocation) -> Result<WeatherSnapshot, WeatherError>;
}

/// Current weather for a stored favorite.
///
/// Entries saved without coordinates are re-resolved by a name search and
/// matched on id.
pub async fn fetch_favorite(
    gateway: &dyn WeatherGateway,
    favorite: &FavoriteLocation,
) -> Result<WeatherSnapshot, WeatherError> {
    let location = match favorite.to_geo_location() {
        Some(location) => location,
        None => {
            tracing::debug!(id = %favorite.id, "favorite has no coordinates, searching by name");
            gateway
                .search(&favorite.name)
                .await?
                .into_iter()
                .find(|loc| loc.id == favorite.id)
                .ok_or_else(|| WeatherError::MissingData(FAVORITE_NOT_FOUND_MESSAGE.to_string()))?
        }
    };

    gateway.fetch_current(&location).await
}
