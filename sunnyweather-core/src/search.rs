//! Search-then-select state machine driving the lookup flow.
//!
//! Every request gets a ticket carrying a generation number. A result is only
//! applied when its ticket is still the latest of its kind, so a slow response
//! can never overwrite a newer one.

use crate::{
    conditions::describe_snapshot,
    error::{NOTHING_FOUND_MESSAGE, WeatherError},
    model::{GeoLocation, WeatherApiError, WeatherSnapshot},
    provider::WeatherGateway,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SearchState {
    #[default]
    Idle,
    Searching,
    /// `notice` is set when the search succeeded but matched nothing.
    ResultsReady {
        locations: Vec<GeoLocation>,
        notice: Option<String>,
    },
    SearchFailed(WeatherApiError),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum WeatherState {
    #[default]
    Idle,
    Loading {
        location: GeoLocation,
    },
    Ready(WeatherSnapshot),
    Failed {
        location: GeoLocation,
        error: WeatherApiError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    generation: u64,
    query: String,
}

impl SearchTicket {
    /// The trimmed query to send to the gateway.
    pub fn query(&self) -> &str {
        &self.query
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherTicket {
    generation: u64,
    location: GeoLocation,
}

impl WeatherTicket {
    pub fn location(&self) -> &GeoLocation {
        &self.location
    }
}

#[derive(Debug, Default)]
pub struct WeatherSearch {
    query: String,
    search: SearchState,
    weather: WeatherState,
    search_generation: u64,
    weather_generation: u64,
}

impl WeatherSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn search_state(&self) -> &SearchState {
        &self.search
    }

    pub fn weather_state(&self) -> &WeatherState {
        &self.weather
    }

    /// Start a search for the current query.
    ///
    /// A blank query fails validation and returns `None`; nothing should be sent.
    pub fn begin_search(&mut self) -> Option<SearchTicket> {
        let query = self.query.trim();

        if query.is_empty() {
            self.search = SearchState::SearchFailed(WeatherError::empty_query().into());
            // The validation message replaces any older weather error.
            if matches!(self.weather, WeatherState::Failed { .. }) {
                self.weather = WeatherState::Idle;
            }
            return None;
        }

        let query = query.to_string();
        self.search_generation += 1;
        // A new search drops the selection, so any weather still in flight is stale.
        self.weather_generation += 1;
        self.search = SearchState::Searching;
        self.weather = WeatherState::Idle;

        Some(SearchTicket { generation: self.search_generation, query })
    }

    /// Apply a search result. Returns `false` if the ticket was superseded.
    pub fn finish_search(
        &mut self,
        ticket: SearchTicket,
        result: Result<Vec<GeoLocation>, WeatherError>,
    ) -> bool {
        if ticket.generation != self.search_generation {
            tracing::debug!(query = %ticket.query, "dropping stale search result");
            return false;
        }

        self.search = match result {
            Ok(locations) if locations.is_empty() => SearchState::ResultsReady {
                locations,
                notice: Some(NOTHING_FOUND_MESSAGE.to_string()),
            },
            Ok(locations) => SearchState::ResultsReady { locations, notice: None },
            Err(e) => SearchState::SearchFailed(e.into()),
        };

        true
    }

    pub fn begin_select(&mut self, location: GeoLocation) -> WeatherTicket {
        self.weather_generation += 1;
        self.weather = WeatherState::Loading { location: location.clone() };

        WeatherTicket { generation: self.weather_generation, location }
    }

    /// Apply a weather result. Returns `false` if the ticket was superseded.
    pub fn finish_select(
        &mut self,
        ticket: WeatherTicket,
        result: Result<WeatherSnapshot, WeatherError>,
    ) -> bool {
        if ticket.generation != self.weather_generation {
            tracing::debug!(location = %ticket.location.id, "dropping stale weather result");
            return false;
        }

        self.weather = match result {
            Ok(snapshot) => WeatherState::Ready(snapshot),
            Err(e) => WeatherState::Failed { location: ticket.location, error: e.into() },
        };

        true
    }

    pub async fn run_search(&mut self, gateway: &dyn WeatherGateway) {
        let Some(ticket) = self.begin_search() else {
            return;
        };

        let result = gateway.search(ticket.query()).await;
        self.finish_search(ticket, result);
    }

    pub async fn select(&mut self, gateway: &dyn WeatherGateway, location: GeoLocation) {
        let ticket = self.begin_select(location);
        let result = gateway.fetch_current(ticket.location()).await;
        self.finish_select(ticket, result);
    }

    pub fn is_searching(&self) -> bool {
        matches!(self.search, SearchState::Searching)
    }

    pub fn is_loading_weather(&self) -> bool {
        matches!(self.weather, WeatherState::Loading { .. })
    }

    pub fn locations(&self) -> &[GeoLocation] {
        match &self.search {
            SearchState::ResultsReady { locations, .. } => locations,
            _ => &[],
        }
    }

    pub fn notice(&self) -> Option<&str> {
        match &self.search {
            SearchState::ResultsReady { notice, .. } => notice.as_deref(),
            _ => None,
        }
    }

    pub fn selected(&self) -> Option<&GeoLocation> {
        match &self.weather {
            WeatherState::Idle => None,
            WeatherState::Loading { location } | WeatherState::Failed { location, .. } => {
                Some(location)
            }
            WeatherState::Ready(snapshot) => Some(&snapshot.location),
        }
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        match &self.weather {
            WeatherState::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    /// The error of whichever phase failed last.
    pub fn error(&self) -> Option<&WeatherApiError> {
        match (&self.weather, &self.search) {
            (WeatherState::Failed { error, .. }, _) => Some(error),
            (_, SearchState::SearchFailed(error)) => Some(error),
            _ => None,
        }
    }

    /// e.g. `Clear, 20.3°C` once a snapshot is loaded.
    pub fn description(&self) -> Option<String> {
        self.snapshot().map(describe_snapshot)
    }
}
