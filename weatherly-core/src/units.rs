use serde::{Deserialize, Serialize};

/// Display unit system. The API always serves metric values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn toggled(self) -> Self {
        match self {
            UnitSystem::Metric => UnitSystem::Imperial,
            UnitSystem::Imperial => UnitSystem::Metric,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub const fn all() -> &'static [UnitSystem] {
        &[UnitSystem::Metric, UnitSystem::Imperial]
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Converts a Celsius reading into the requested system.
pub fn convert_temperature(celsius: f64, units: UnitSystem) -> f64 {
    match units {
        UnitSystem::Metric => celsius,
        UnitSystem::Imperial => celsius * 9.0 / 5.0 + 32.0,
    }
}

pub fn temperature_symbol(units: UnitSystem) -> &'static str {
    match units {
        UnitSystem::Metric => "°C",
        UnitSystem::Imperial => "°F",
    }
}

/// Converts metres per second into km/h or mph.
pub fn convert_wind_speed(mps: f64, units: UnitSystem) -> f64 {
    match units {
        UnitSystem::Metric => mps * 3.6,
        UnitSystem::Imperial => mps * 2.237,
    }
}

pub fn wind_speed_symbol(units: UnitSystem) -> &'static str {
    match units {
        UnitSystem::Metric => "km/h",
        UnitSystem::Imperial => "mph",
    }
}

/// 8-point compass label, e.g. `SW (225°)`.
pub fn wind_direction(degrees: f64) -> String {
    const DIRECTIONS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let index = ((degrees.rem_euclid(360.0) / 45.0).round() as usize) % DIRECTIONS.len();
    format!("{} ({}°)", DIRECTIONS[index], degrees.round())
}

/// Rough dew point from temperature and relative humidity.
pub fn dew_point(celsius: f64, humidity_pct: u8) -> f64 {
    celsius - (100.0 - f64::from(humidity_pct)) / 5.0
}
