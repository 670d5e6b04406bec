use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// What the user asked for: a city name or a coordinate pair.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    City(String),
    Coords { lat: f64, lon: f64 },
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Query::City(city) => f.write_str(city),
            Query::Coords { lat, lon } => write!(f, "{lat:.2}, {lon:.2}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub current: f64,
    pub feels_like: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Details {
    pub humidity: u8,
    pub pressure: f64,
    /// Kilometres.
    pub visibility: f64,
    /// Metres per second.
    pub wind_speed: f64,
    #[serde(default)]
    pub wind_direction: f64,
    /// Cloud coverage, percent.
    #[serde(default)]
    pub clouds: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SunTimes {
    #[serde(with = "hhmm")]
    pub sunrise: NaiveTime,
    #[serde(with = "hhmm")]
    pub sunset: NaiveTime,
}

/// Current conditions for one place. Replaced wholesale on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city: String,
    pub country: String,
    pub coordinates: Coordinates,
    pub temperature: Temperature,
    pub weather: Condition,
    pub details: Details,
    pub sun: SunTimes,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
    #[serde(default)]
    pub average: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastDetails {
    pub humidity: u8,
    pub wind_speed: f64,
    #[serde(default)]
    pub clouds: u8,
    #[serde(default)]
    pub rain: f64,
    #[serde(default)]
    pub snow: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub date: NaiveDate,
    pub day: String,
    pub weather: Condition,
    pub temperature: TemperatureRange,
    pub details: ForecastDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(rename = "forecast")]
    pub entries: Vec<ForecastEntry>,
}

/// Response wrapper used by every endpoint of the weather API.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub message: Option<String>,
    pub code: Option<u16>,
}

/// `"HH:MM"` wall-clock strings as served by the API.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(raw.trim(), FORMAT).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONDON: &str = r#"{
        "city": "London",
        "country": "GB",
        "coordinates": { "latitude": 51.51, "longitude": -0.13 },
        "temperature": { "current": 18, "feels_like": 17, "min": 15, "max": 20 },
        "weather": { "main": "Clear", "description": "Clear Sky", "icon": "01d" },
        "details": {
            "humidity": 60, "pressure": 1015, "visibility": 10,
            "wind_speed": 3.6, "wind_direction": 220, "clouds": 0
        },
        "sun": { "sunrise": "06:00", "sunset": "18:00" },
        "timezone": 0,
        "updated_at": "2025-06-01T12:00:00"
    }"#;

    #[test]
    fn snapshot_parses_sun_times_and_ignores_extra_fields() {
        let snap: WeatherSnapshot = serde_json::from_str(LONDON).expect("valid snapshot");

        assert_eq!(snap.city, "London");
        assert_eq!(snap.sun.sunrise, NaiveTime::from_hms_opt(6, 0, 0).unwrap());
        assert_eq!(snap.sun.sunset, NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        assert_eq!(snap.weather.icon, "01d");
    }

    #[test]
    fn malformed_sun_time_is_rejected() {
        let broken = LONDON.replace("\"06:00\"", "\"six\"");
        assert!(serde_json::from_str::<WeatherSnapshot>(&broken).is_err());
    }

    #[test]
    fn forecast_entries_come_from_forecast_key() {
        let body = r#"{
            "city": "London", "country": "GB",
            "forecast": [{
                "date": "2025-06-02", "day": "Monday",
                "temperature": { "min": 12, "max": 19, "average": 16 },
                "weather": { "main": "Rain", "description": "Light Rain", "icon": "10d" },
                "details": { "humidity": 80, "wind_speed": 4.1, "clouds": 75, "rain": 1.2 }
            }]
        }"#;

        let forecast: Forecast = serde_json::from_str(body).expect("valid forecast");
        assert_eq!(forecast.entries.len(), 1);
        assert_eq!(forecast.entries[0].date, NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
        assert_eq!(forecast.entries[0].details.snow, 0.0);
    }

    #[test]
    fn query_display() {
        assert_eq!(Query::City("Paris".into()).to_string(), "Paris");
        assert_eq!(Query::Coords { lat: 51.5074, lon: -0.1278 }.to_string(), "51.51, -0.13");
    }
}
