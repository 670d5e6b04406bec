use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use inquire::{Confirm, CustomType, Select, Text};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};
use weatherly_core::{
    Bounds, Preferences, Query, UnitSystem, ViewState, WeatherController, WeatherProvider,
    WeatherlyProvider, cities, config::ThemePreference, load_weather,
};

use crate::{render, tui};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherly", version, about = "Weather in your terminal")]
pub struct Cli {
    /// Preferences file to use instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the API base URL for this run.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// A city name or a coordinate pair; neither means "the last city".
#[derive(Debug, Args)]
pub struct Location {
    /// City name, e.g. "London".
    #[arg(conflicts_with = "lat")]
    pub city: Option<String>,

    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current weather, theme and forecast.
    Show {
        #[command(flatten)]
        location: Location,

        /// Display units: metric or imperial.
        #[arg(long, value_parser = parse_units)]
        units: Option<UnitSystem>,
    },

    /// Show the forecast for a city.
    Forecast {
        city: String,

        #[arg(long, value_parser = parse_units)]
        units: Option<UnitSystem>,
    },

    /// Open the animated full-screen view.
    Watch {
        #[command(flatten)]
        location: Location,

        /// Seed for theme and particle randomness.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Suggest built-in cities matching a query.
    Cities {
        query: String,

        #[arg(long, default_value_t = 8)]
        limit: usize,
    },

    /// List or clear recent searches.
    Recent {
        #[arg(long)]
        clear: bool,
    },

    /// Edit preferences interactively.
    Configure,
}

fn parse_units(value: &str) -> Result<UnitSystem, String> {
    match value.to_ascii_lowercase().as_str() {
        "metric" | "c" => Ok(UnitSystem::Metric),
        "imperial" | "f" => Ok(UnitSystem::Imperial),
        other => Err(format!("unknown unit system '{other}', expected metric or imperial")),
    }
}

impl Location {
    fn into_query(self, prefs: &Preferences) -> Result<Query> {
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            return Ok(Query::Coords { lat, lon });
        }

        match self.city.or_else(|| prefs.last_city.clone()) {
            Some(city) if !city.trim().is_empty() => Ok(Query::City(city.trim().to_string())),
            _ => bail!("No city given and no previous search to fall back to"),
        }
    }
}

impl Cli {
    pub fn is_watch(&self) -> bool {
        matches!(self.command, Command::Watch { .. })
    }

    pub async fn run(self) -> Result<()> {
        let path = match self.config {
            Some(path) => path,
            None => Preferences::config_file_path()?,
        };
        let prefs = Preferences::load_from(&path)?;

        let base_url = self.api_url.as_deref().unwrap_or(&prefs.api_base_url);
        let provider = WeatherlyProvider::new(base_url)
            .with_context(|| format!("Invalid API base URL: {base_url}"))?;

        match self.command {
            Command::Show { location, units } => {
                let query = location.into_query(&prefs)?;
                show(provider, prefs, path, query, units).await?;
            }
            Command::Forecast { city, units } => {
                let forecast = provider
                    .fetch_forecast(city.trim())
                    .await
                    .with_context(|| format!("Failed to fetch forecast for {city}"))?;
                let temperature_units = units.unwrap_or(prefs.units.temperature);
                let wind_units = units.unwrap_or(prefs.units.wind);
                print!("{}", render::forecast(&forecast, temperature_units, wind_units));
            }
            Command::Watch { location, seed } => {
                let query = location.into_query(&prefs)?;
                tui::run(Arc::new(provider), prefs, path, query, seed).await?;
            }
            Command::Cities { query, limit } => {
                let matches = cities::suggest(&query, limit);
                if matches.is_empty() {
                    println!("No matching cities.");
                }
                for city in matches {
                    println!(
                        "{:<14} {:<16} {:<18} {:>8.4} {:>9.4}",
                        city.name, city.country, city.region, city.latitude, city.longitude
                    );
                }
            }
            Command::Recent { clear } => recent(prefs, &path, clear)?,
            Command::Configure => configure(prefs, &path)?,
        }

        Ok(())
    }
}

async fn show(
    provider: WeatherlyProvider,
    prefs: Preferences,
    path: PathBuf,
    query: Query,
    units: Option<UnitSystem>,
) -> Result<()> {
    let temperature_units = units.unwrap_or(prefs.units.temperature);
    let wind_units = units.unwrap_or(prefs.units.wind);

    let mut controller = WeatherController::new(Arc::new(provider), prefs, Bounds::default())
        .with_prefs_path(path);
    let ticket = match &query {
        Query::City(city) => controller.search(city),
        Query::Coords { lat, lon } => Some(controller.locate(*lat, *lon)),
    };
    let Some(ticket) = ticket else {
        bail!("No city given");
    };

    let outcome = load_weather(controller.provider().as_ref(), ticket.query()).await;
    let clock = Local::now().time();
    controller.complete(ticket, outcome, Instant::now(), clock);

    if let ViewState::Failed { message } = controller.state() {
        bail!("{message}");
    }
    print!("{}", render::report(&controller, temperature_units, wind_units, clock));

    Ok(())
}

fn recent(mut prefs: Preferences, path: &Path, clear: bool) -> Result<()> {
    if clear {
        prefs.clear_recent_searches();
        prefs.save_to(path)?;
        println!("Recent searches cleared.");
        return Ok(());
    }

    if prefs.recent_searches.is_empty() {
        println!("No recent searches yet.");
    }
    for (i, city) in prefs.recent_searches.iter().enumerate() {
        println!("{}. {city}", i + 1);
    }

    Ok(())
}

fn configure(mut prefs: Preferences, path: &Path) -> Result<()> {
    let url = Text::new("API base URL:").with_default(&prefs.api_base_url).prompt()?;
    WeatherlyProvider::new(&url).with_context(|| format!("Invalid API base URL: {url}"))?;
    prefs.api_base_url = url;

    let themes = vec![ThemePreference::Dark, ThemePreference::Light];
    let cursor = themes.iter().position(|t| *t == prefs.theme).unwrap_or(0);
    prefs.theme = Select::new("Panel theme:", themes).with_starting_cursor(cursor).prompt()?;

    prefs.units.temperature = select_units("Temperature units:", prefs.units.temperature)?;
    prefs.units.wind = select_units("Wind speed units:", prefs.units.wind)?;

    prefs.settings.animations = Confirm::new("Animate weather in the watch view?")
        .with_default(prefs.settings.animations)
        .prompt()?;
    prefs.settings.auto_refresh = Confirm::new("Refresh automatically?")
        .with_default(prefs.settings.auto_refresh)
        .prompt()?;
    if prefs.settings.auto_refresh {
        prefs.refresh_interval_secs = CustomType::<u64>::new("Refresh interval in seconds:")
            .with_default(prefs.refresh_interval_secs)
            .with_error_message("Please enter a whole number of seconds")
            .prompt()?;
    }

    prefs.save_to(path)?;
    println!("Preferences saved to {}", path.display());

    Ok(())
}

fn select_units(prompt: &str, current: UnitSystem) -> Result<UnitSystem> {
    let options = UnitSystem::all().to_vec();
    let cursor = options.iter().position(|u| *u == current).unwrap_or(0);
    Ok(Select::new(prompt, options).with_starting_cursor(cursor).prompt()?)
}
