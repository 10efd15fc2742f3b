use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{InquireError, Select, Text};

use sunnyweather_core::{
    Config, FavoriteLocation, FavoritesStore, FileStore, GeoLocation, OpenMeteoProvider,
    WeatherApiError, WeatherError, WeatherGateway, WeatherSearch, fetch_favorite,
    normalize_error, to_favorite,
};

use crate::output::{self, LocationChoice};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "sunnyweather", version, about = "Weather lookup with favorite cities")]
pub struct Cli {
    /// Log debug output to stderr (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List places matching a city name.
    Search {
        /// City name, e.g. "Kyiv".
        query: String,
    },

    /// Show current weather for a city.
    Show {
        query: String,

        /// 1-based index into the search results; prompts when absent.
        #[arg(long)]
        pick: Option<usize>,

        /// Also add the city to favorites.
        #[arg(long)]
        save: bool,
    },

    /// Manage favorite cities.
    Favorites {
        #[command(subcommand)]
        action: FavoritesCommand,
    },

    /// Set the search language and endpoints interactively.
    Configure,
}

#[derive(Debug, Subcommand)]
pub enum FavoritesCommand {
    List,

    /// Search for a city and store it as a favorite.
    Add {
        query: String,

        #[arg(long)]
        pick: Option<usize>,
    },

    Remove {
        /// Favorite id as shown by `favorites list`.
        id: String,
    },

    /// Fetch current weather for one favorite, or all of them.
    Refresh { id: Option<String> },
}

type Store = FavoritesStore<FileStore>;

/// The gateway and the favorites store, shared by reference across commands.
struct App {
    gateway: OpenMeteoProvider,
    store: Store,
}

impl App {
    fn open() -> anyhow::Result<Self> {
        let config = Config::load()?;
        config.validate().context("Invalid configuration")?;

        let favorites_dir = config.favorites_dir()?;
        tracing::debug!(
            geocoding_url = %config.geocoding_url,
            forecast_url = %config.forecast_url,
            favorites_dir = %favorites_dir.display(),
            "opened app context"
        );

        Ok(Self {
            gateway: OpenMeteoProvider::new(&config)?,
            store: FavoritesStore::new(FileStore::new(favorites_dir)),
        })
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Search { query } => {
                let app = App::open()?;
                search(&app.gateway, &query).await
            }
            Command::Show { query, pick, save } => {
                let app = App::open()?;
                show(&app.gateway, &app.store, &query, pick, save).await
            }
            Command::Favorites { action } => {
                let app = App::open()?;
                match action {
                    FavoritesCommand::List => list_favorites(&app.store),
                    FavoritesCommand::Add { query, pick } => {
                        add_favorite(&app.gateway, &app.store, &query, pick).await
                    }
                    FavoritesCommand::Remove { id } => remove_favorite(&app.store, &id),
                    FavoritesCommand::Refresh { id } => {
                        refresh_favorites(&app.gateway, &app.store, id.as_deref()).await
                    }
                }
            }
        }
    }
}

async fn search(gateway: &dyn WeatherGateway, query: &str) -> anyhow::Result<()> {
    let mut search = WeatherSearch::new();
    search.set_query(query);
    search.run_search(gateway).await;

    if report_search_outcome(&search) {
        output::print_lines(&output::location_lines(search.locations()));
    }

    Ok(())
}

async fn show(
    gateway: &dyn WeatherGateway,
    store: &Store,
    query: &str,
    pick: Option<usize>,
    save: bool,
) -> anyhow::Result<()> {
    let mut search = WeatherSearch::new();
    search.set_query(query);
    search.run_search(gateway).await;

    let Some(location) = choose_location(&search, pick)? else {
        return Ok(());
    };

    search.select(gateway, location).await;

    if let Some(err) = search.error() {
        output::print_error(err);
        return Ok(());
    }

    let Some(snapshot) = search.snapshot() else {
        return Ok(());
    };
    output::print_lines(&output::snapshot_lines(snapshot));

    if save {
        let outcome = store.add(to_favorite(snapshot)).inspect_err(|e| {
            tracing::warn!(id = %snapshot.location.id, "saving favorite failed: {e}")
        })?;
        println!("{}", outcome.message());
    }

    Ok(())
}

async fn add_favorite(
    gateway: &dyn WeatherGateway,
    store: &Store,
    query: &str,
    pick: Option<usize>,
) -> anyhow::Result<()> {
    let mut search = WeatherSearch::new();
    search.set_query(query);
    search.run_search(gateway).await;

    if let Some(location) = choose_location(&search, pick)? {
        let outcome = store
            .add(FavoriteLocation::from(&location))
            .inspect_err(|e| tracing::warn!(id = %location.id, "saving favorite failed: {e}"))?;
        println!("{}", outcome.message());
    }

    Ok(())
}

fn list_favorites(store: &Store) -> anyhow::Result<()> {
    let favorites = store.load();

    if favorites.is_empty() {
        println!("No favorite cities yet. Add one with `sunnyweather show <city> --save`.");
        return Ok(());
    }

    for favorite in &favorites {
        println!("{}", output::favorite_line(favorite));
    }

    Ok(())
}

fn remove_favorite(store: &Store, id: &str) -> anyhow::Result<()> {
    let removed = store
        .remove(id)
        .inspect_err(|e| tracing::warn!(id, "removing favorite failed: {e}"))?;

    if removed {
        println!("Removed favorite {id}.");
    } else {
        println!("No favorite with id '{id}'.");
    }

    Ok(())
}

async fn refresh_favorites(
    gateway: &dyn WeatherGateway,
    store: &Store,
    id: Option<&str>,
) -> anyhow::Result<()> {
    let favorites: Vec<FavoriteLocation> = match id {
        Some(id) => match store.find(id) {
            Some(favorite) => vec![favorite],
            None => {
                println!("No favorite with id '{id}'.");
                return Ok(());
            }
        },
        None => store.load(),
    };

    if favorites.is_empty() {
        println!("No favorite cities yet.");
        return Ok(());
    }

    for favorite in &favorites {
        match fetch_favorite(gateway, favorite).await {
            Ok(snapshot) => output::print_lines(&output::snapshot_lines(&snapshot)),
            Err(e) => println!("{}", refresh_failure_line(favorite, e)),
        }
    }

    Ok(())
}

/// Log the full failure and render the normalized message next to the favorite.
fn refresh_failure_line(favorite: &FavoriteLocation, err: WeatherError) -> String {
    let err = anyhow::Error::new(err).context(format!("refreshing favorite {}", favorite.id));
    tracing::warn!("{err:#}");

    format!("{}: {}", favorite.label(), normalize_error(&err))
}

/// Resolve a 1-based `--pick` index against the search results.
fn pick_location(locations: &[GeoLocation], index: usize) -> Result<GeoLocation, WeatherApiError> {
    index
        .checked_sub(1)
        .and_then(|i| locations.get(i))
        .cloned()
        .ok_or_else(|| {
            WeatherApiError::new(format!("--pick must be between 1 and {}.", locations.len()))
        })
}

/// Print the error or notice of a finished search. Returns whether results are available.
fn report_search_outcome(search: &WeatherSearch) -> bool {
    if let Some(err) = search.error() {
        output::print_error(err);
        return false;
    }

    if let Some(notice) = search.notice() {
        println!("{notice}");
        return false;
    }

    true
}

/// Pick one search result: by index, the only match, or interactively.
fn choose_location(
    search: &WeatherSearch,
    pick: Option<usize>,
) -> anyhow::Result<Option<GeoLocation>> {
    if !report_search_outcome(search) {
        return Ok(None);
    }

    let locations = search.locations();

    if let Some(index) = pick {
        return match pick_location(locations, index) {
            Ok(location) => Ok(Some(location)),
            Err(err) => {
                output::print_error(&err);
                Ok(None)
            }
        };
    }

    if let [only] = locations {
        return Ok(Some(only.clone()));
    }

    let choices: Vec<LocationChoice> = locations.iter().cloned().map(LocationChoice).collect();

    match Select::new("Choose a location:", choices).prompt() {
        Ok(choice) => Ok(Some(choice.0)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e).context("Failed to read location choice"),
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let language = Text::new("Language for place names:")
        .with_default(&config.language)
        .prompt()
        .context("Failed to read language")?;
    let geocoding_url = Text::new("Geocoding endpoint:")
        .with_default(&config.geocoding_url)
        .prompt()
        .context("Failed to read geocoding endpoint")?;
    let forecast_url = Text::new("Forecast endpoint:")
        .with_default(&config.forecast_url)
        .prompt()
        .context("Failed to read forecast endpoint")?;

    config.language = language.trim().to_string();
    config.geocoding_url = geocoding_url.trim().to_string();
    config.forecast_url = forecast_url.trim().to_string();
    config.validate()?;
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_parses_pick_and_save() {
        let cli = Cli::try_parse_from(["sunnyweather", "show", "Kyiv", "--pick", "2", "--save"])
            .expect("valid args");

        match cli.command {
            Command::Show { query, pick, save } => {
                assert_eq!(query, "Kyiv");
                assert_eq!(pick, Some(2));
                assert!(save);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["sunnyweather", "favorites", "list", "-v"])
            .expect("valid args");

        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Favorites { action: FavoritesCommand::List }));
    }

    #[test]
    fn refresh_id_is_optional() {
        let cli = Cli::try_parse_from(["sunnyweather", "favorites", "refresh"]).expect("valid");
        assert!(matches!(
            cli.command,
            Command::Favorites { action: FavoritesCommand::Refresh { id: None } }
        ));
    }

    #[test]
    fn search_requires_query() {
        assert!(Cli::try_parse_from(["sunnyweather", "search"]).is_err());
    }

    fn kyiv() -> GeoLocation {
        GeoLocation {
            id: "703448".into(),
            name: "Kyiv".into(),
            country: "Ukraine".into(),
            latitude: 50.45,
            longitude: 30.52,
            timezone: "Europe/Kyiv".into(),
        }
    }

    #[test]
    fn pick_is_one_based() {
        let lviv = GeoLocation { id: "702550".into(), name: "Lviv".into(), ..kyiv() };
        let locations = [kyiv(), lviv];

        assert_eq!(pick_location(&locations, 1).expect("in range").name, "Kyiv");
        assert_eq!(pick_location(&locations, 2).expect("in range").name, "Lviv");
    }

    #[test]
    fn out_of_range_pick_is_a_message_not_a_failure() {
        let locations = [kyiv()];

        for index in [0, 2, usize::MAX] {
            let err = pick_location(&locations, index).unwrap_err();
            assert_eq!(err.message, "--pick must be between 1 and 1.");
        }
    }

    #[test]
    fn refresh_failure_shows_normalized_message() {
        let favorite = FavoriteLocation::from(&kyiv());
        let err = WeatherError::Network(sunnyweather_core::error::WEATHER_FAILED_MESSAGE.into());

        assert_eq!(
            refresh_failure_line(&favorite, err),
            format!("{}: {}", favorite.label(), sunnyweather_core::error::WEATHER_FAILED_MESSAGE)
        );
    }

    #[test]
    fn clap_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
