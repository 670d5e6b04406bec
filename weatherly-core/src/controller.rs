//! Owns the loaded weather and keeps theme, animation and auto-refresh in sync
//! with it.
//!
//! The controller never spawns anything. Hosts either `await` [`WeatherController::load`]
//! or split a fetch into [`WeatherController::begin`], their own task, and
//! [`WeatherController::complete`]. Each `begin` bumps a generation, so
//! outcomes of superseded fetches are dropped.

use chrono::{NaiveTime, Timelike};
use std::{path::PathBuf, sync::Arc, time::Instant};
use tracing::{debug, info, warn};

use crate::{
    animation::{AnimationEngine, AnimationRequest, Bounds},
    config::{Preferences, ThemePreference},
    model::{Forecast, Query, WeatherSnapshot},
    provider::{LoadOutcome, WeatherProvider, load_weather},
    sun::day_progress,
    theme::{ThemeEngine, ThemeResult},
    timer::Timer,
    units::UnitSystem,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed { message: String },
}

/// Identifies one fetch started by [`WeatherController::begin`].
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    generation: u64,
    query: Query,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn query(&self) -> &Query {
        &self.query
    }
}

#[derive(Debug)]
pub struct WeatherController {
    provider: Arc<dyn WeatherProvider>,
    prefs: Preferences,
    prefs_path: Option<PathBuf>,
    snapshot: Option<WeatherSnapshot>,
    forecast: Option<Forecast>,
    state: ViewState,
    theme_engine: ThemeEngine,
    theme: Option<ThemeResult>,
    animation: AnimationEngine,
    refresh: Timer,
    last_hour: Option<u32>,
    generation: u64,
    last_query: Option<Query>,
}

impl WeatherController {
    pub fn new(provider: Arc<dyn WeatherProvider>, prefs: Preferences, bounds: Bounds) -> Self {
        let refresh = Timer::new(prefs.refresh_interval());
        Self {
            provider,
            prefs,
            prefs_path: None,
            snapshot: None,
            forecast: None,
            state: ViewState::Idle,
            theme_engine: ThemeEngine::new(),
            theme: None,
            animation: AnimationEngine::new(bounds),
            refresh,
            last_hour: None,
            generation: 0,
            last_query: None,
        }
    }

    /// Persist preference changes to `path`. Without one, changes stay in memory.
    pub fn with_prefs_path(mut self, path: PathBuf) -> Self {
        self.prefs_path = Some(path);
        self
    }

    pub fn with_theme_engine(mut self, engine: ThemeEngine) -> Self {
        self.theme_engine = engine;
        self
    }

    pub fn with_animation(mut self, engine: AnimationEngine) -> Self {
        self.animation = engine;
        self
    }

    pub fn provider(&self) -> Arc<dyn WeatherProvider> {
        Arc::clone(&self.provider)
    }

    pub fn prefs(&self) -> &Preferences {
        &self.prefs
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn forecast(&self) -> Option<&Forecast> {
        self.forecast.as_ref()
    }

    pub fn theme(&self) -> Option<&ThemeResult> {
        self.theme.as_ref()
    }

    pub fn animation(&self) -> &AnimationEngine {
        &self.animation
    }

    pub fn refresh_timer(&self) -> &Timer {
        &self.refresh
    }

    pub fn last_query(&self) -> Option<&Query> {
        self.last_query.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a fetch. The previous one, if still running, becomes stale.
    pub fn begin(&mut self, query: Query) -> FetchTicket {
        self.generation += 1;
        self.state = ViewState::Loading;
        self.refresh.stop();
        self.last_query = Some(query.clone());
        debug!(generation = self.generation, %query, "fetch started");

        FetchTicket { generation: self.generation, query }
    }

    /// Apply a fetch outcome. Returns `false` when the ticket is stale.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        outcome: LoadOutcome,
        now: Instant,
        clock: NaiveTime,
    ) -> bool {
        if ticket.generation != self.generation {
            debug!(
                stale = ticket.generation,
                current = self.generation,
                "dropping outcome of superseded fetch"
            );
            return false;
        }

        match outcome {
            Ok((snapshot, forecast)) => {
                info!(
                    city = %snapshot.city,
                    condition = %snapshot.weather.main,
                    temp = snapshot.temperature.current,
                    "weather updated"
                );

                self.prefs.last_city = Some(snapshot.city.clone());
                self.prefs.last_latitude = Some(snapshot.coordinates.latitude);
                self.snapshot = Some(snapshot);
                self.forecast = forecast;
                self.persist();

                self.apply_theme(clock);
                self.restart_animation();
                if self.prefs.settings.auto_refresh {
                    self.refresh.start(now);
                }
                self.state = ViewState::Ready;
            }
            Err(err) => {
                warn!(query = %ticket.query, error = %err, "weather fetch failed");
                self.state = ViewState::Failed { message: err.user_message() };
                // Once weather has been shown, keep polling through failures.
                if self.prefs.settings.auto_refresh && self.snapshot.is_some() {
                    self.refresh.start(now);
                }
            }
        }

        true
    }

    /// Fetch and apply `query` in one go.
    pub async fn load(&mut self, query: Query, now: Instant, clock: NaiveTime) -> bool {
        let ticket = self.begin(query);
        let provider = Arc::clone(&self.provider);
        let outcome = load_weather(provider.as_ref(), ticket.query()).await;
        self.complete(ticket, outcome, now, clock)
    }

    /// Record `city` as a recent search and start fetching it.
    pub fn search(&mut self, city: &str) -> Option<FetchTicket> {
        let city = city.trim();
        if city.is_empty() {
            return None;
        }

        self.prefs.add_recent_search(city);
        self.persist();
        Some(self.begin(Query::City(city.to_string())))
    }

    pub fn locate(&mut self, lat: f64, lon: f64) -> FetchTicket {
        self.begin(Query::Coords { lat, lon })
    }

    /// Re-fetch the last query, falling back to the persisted city.
    pub fn refresh(&mut self) -> Option<FetchTicket> {
        let query = self
            .last_query
            .clone()
            .or_else(|| self.prefs.last_city.clone().map(Query::City))?;
        Some(self.begin(query))
    }

    pub fn retry(&mut self) -> Option<FetchTicket> {
        self.refresh()
    }

    /// A ticket when the auto-refresh timer fires.
    pub fn poll_refresh(&mut self, now: Instant) -> Option<FetchTicket> {
        if !self.refresh.poll(now) {
            return None;
        }
        debug!("auto-refresh due");
        self.refresh()
    }

    /// Re-theme when the wall-clock hour changes. Returns `true` if it did.
    pub fn tick_clock(&mut self, clock: NaiveTime) -> bool {
        if self.snapshot.is_none() || self.last_hour == Some(clock.hour()) {
            return false;
        }
        self.apply_theme(clock);
        true
    }

    pub fn toggle_theme(&mut self) -> ThemePreference {
        self.prefs.theme = self.prefs.theme.toggled();
        self.persist();
        self.prefs.theme
    }

    pub fn set_temperature_unit(&mut self, units: UnitSystem) {
        self.prefs.units.temperature = units;
        self.persist();
    }

    pub fn set_wind_unit(&mut self, units: UnitSystem) {
        self.prefs.units.wind = units;
        self.persist();
    }

    pub fn set_animations(&mut self, enabled: bool) {
        self.prefs.settings.animations = enabled;
        self.persist();
        self.restart_animation();
    }

    /// Turning auto-refresh on arms the timer only when weather is loaded.
    pub fn set_auto_refresh(&mut self, enabled: bool, now: Instant) {
        self.prefs.settings.auto_refresh = enabled;
        self.persist();
        if enabled && self.snapshot.is_some() {
            self.refresh.start(now);
        } else {
            self.refresh.stop();
        }
    }

    /// Advance the animation by `dt` seconds.
    pub fn frame(&mut self, dt: f64) -> bool {
        self.animation.frame(dt)
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.animation.resize(width, height);
    }

    /// Percent of daylight elapsed at `clock` for the loaded location.
    pub fn sun_progress(&self, clock: NaiveTime) -> Option<f64> {
        self.snapshot.as_ref().map(|s| day_progress(s.sun.sunrise, s.sun.sunset, clock))
    }

    fn apply_theme(&mut self, clock: NaiveTime) {
        let Some(snapshot) = &self.snapshot else {
            return;
        };
        let theme = self.theme_engine.apply(
            &snapshot.weather.main,
            &snapshot.weather.description,
            clock,
            Some(snapshot.coordinates.latitude),
        );
        self.theme = Some(theme);
        self.last_hour = Some(clock.hour());
    }

    fn restart_animation(&mut self) {
        match &self.snapshot {
            Some(snapshot) if self.prefs.settings.animations => {
                self.animation.start(&AnimationRequest::from_snapshot(snapshot));
            }
            _ => self.animation.clear(),
        }
    }

    fn persist(&self) {
        let Some(path) = &self.prefs_path else {
            return;
        };
        if let Err(err) = self.prefs.save_to(path) {
            warn!(path = %path.display(), error = %err, "failed to save preferences");
        }
    }
}
