//! Core library for the `weatherly` client.
//!
//! This crate defines:
//! - The Weatherly API client and its wire models
//! - The theme engine mapping conditions and time of day to palettes
//! - The particle animation engine
//! - The controller tying fetches, theme, animation and auto-refresh together
//! - Persisted preferences
//!
//! It is used by `weatherly-cli`, but nothing here touches a terminal.

pub mod animation;
pub mod cities;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod provider;
pub mod sun;
pub mod theme;
pub mod timer;
pub mod units;

pub use animation::{AnimationEngine, AnimationRequest, Bounds};
pub use config::Preferences;
pub use controller::{FetchTicket, ViewState, WeatherController};
pub use error::FetchError;
pub use model::{Forecast, Query, WeatherSnapshot};
pub use provider::{LoadOutcome, WeatherProvider, WeatherlyProvider, load_weather};
pub use theme::{ThemeEngine, ThemeResult, WeatherCategory};
pub use units::UnitSystem;
