use crate::{
    error::FetchError,
    model::{Forecast, Query, WeatherSnapshot},
};
use async_trait::async_trait;
use std::fmt::Debug;
use tracing::{debug, warn};

pub mod weatherly;

pub use weatherly::{WeatherlyProvider, decode_envelope};

/// Remote source of current conditions and forecasts.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_weather(&self, city: &str) -> Result<WeatherSnapshot, FetchError>;

    async fn fetch_weather_by_coords(&self, lat: f64, lon: f64)
    -> Result<WeatherSnapshot, FetchError>;

    async fn fetch_forecast(&self, city: &str) -> Result<Forecast, FetchError>;
}

/// Result of one full load: the snapshot, plus the forecast when it could be fetched.
pub type LoadOutcome = Result<(WeatherSnapshot, Option<Forecast>), FetchError>;

/// Fetch current weather, then the forecast for the resolved city.
///
/// Forecast failures never fail the load; they are logged and dropped.
pub async fn load_weather(provider: &dyn WeatherProvider, query: &Query) -> LoadOutcome {
    let snapshot = match query {
        Query::City(city) => provider.fetch_weather(city).await?,
        Query::Coords { lat, lon } => provider.fetch_weather_by_coords(*lat, *lon).await?,
    };
    debug!(city = %snapshot.city, condition = %snapshot.weather.main, "weather loaded");

    let forecast = match provider.fetch_forecast(&snapshot.city).await {
        Ok(forecast) => Some(forecast),
        Err(err) => {
            warn!(city = %snapshot.city, error = %err, "failed to fetch forecast");
            None
        }
    };

    Ok((snapshot, forecast))
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use crate::model::{Condition, Coordinates, Details, SunTimes, Temperature};
    use chrono::NaiveTime;
    use reqwest::StatusCode;
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    /// In-memory provider serving canned conditions.
    #[derive(Debug, Default)]
    pub struct FakeProvider {
        pub main: Mutex<String>,
        pub description: Mutex<String>,
        pub fail_weather: Mutex<Option<String>>,
        pub fail_forecast: bool,
        pub weather_calls: AtomicUsize,
        pub forecast_calls: AtomicUsize,
    }

    impl FakeProvider {
        pub fn with_condition(main: &str, description: &str) -> Self {
            let fake = Self::default();
            fake.set_condition(main, description);
            fake
        }

        pub fn set_condition(&self, main: &str, description: &str) {
            *self.main.lock().unwrap() = main.to_string();
            *self.description.lock().unwrap() = description.to_string();
        }

        fn snapshot(&self, city: &str, latitude: f64) -> WeatherSnapshot {
            WeatherSnapshot {
                city: city.to_string(),
                country: "GB".into(),
                coordinates: Coordinates { latitude, longitude: -0.13 },
                temperature: Temperature { current: 18.0, feels_like: 17.0, min: 15.0, max: 20.0 },
                weather: Condition {
                    main: self.main.lock().unwrap().clone(),
                    description: self.description.lock().unwrap().clone(),
                    icon: "01d".into(),
                },
                details: Details {
                    humidity: 60,
                    pressure: 1015.0,
                    visibility: 10.0,
                    wind_speed: 3.6,
                    wind_direction: 220.0,
                    clouds: 40,
                },
                sun: SunTimes {
                    sunrise: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
                    sunset: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
                },
            }
        }
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn fetch_weather(&self, city: &str) -> Result<WeatherSnapshot, FetchError> {
            self.weather_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = self.fail_weather.lock().unwrap().clone() {
                return Err(FetchError::Api { status: StatusCode::NOT_FOUND, message });
            }
            Ok(self.snapshot(city, 51.51))
        }

        async fn fetch_weather_by_coords(
            &self,
            lat: f64,
            _lon: f64,
        ) -> Result<WeatherSnapshot, FetchError> {
            self.weather_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.snapshot("Tromsø", lat))
        }

        async fn fetch_forecast(&self, city: &str) -> Result<Forecast, FetchError> {
            self.forecast_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_forecast {
                return Err(FetchError::Status {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: "boom".into(),
                });
            }
            Ok(Forecast { city: city.to_string(), country: "GB".into(), entries: Vec::new() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeProvider;
    use super::*;
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn forecast_follows_successful_weather_fetch() {
        let provider = FakeProvider::with_condition("Clear", "clear sky");
        let (snapshot, forecast) =
            load_weather(&provider, &Query::City("London".into())).await.expect("load succeeds");

        assert_eq!(snapshot.city, "London");
        assert_eq!(forecast.map(|f| f.city), Some("London".to_string()));
        assert_eq!(provider.forecast_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn forecast_failure_does_not_block_current_weather() {
        let provider = FakeProvider { fail_forecast: true, ..Default::default() };
        provider.set_condition("Rain", "light rain");

        let (snapshot, forecast) =
            load_weather(&provider, &Query::City("Leeds".into())).await.expect("load succeeds");

        assert_eq!(snapshot.weather.main, "Rain");
        assert!(forecast.is_none());
    }

    #[tokio::test]
    async fn weather_failure_skips_forecast() {
        let provider = FakeProvider::default();
        *provider.fail_weather.lock().unwrap() = Some("city not found".into());

        let err = load_weather(&provider, &Query::City("Nowhere".into())).await.unwrap_err();

        assert_eq!(err.user_message(), "city not found");
        assert_eq!(provider.forecast_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn coordinate_queries_resolve_city_for_forecast() {
        let provider = FakeProvider::with_condition("Clear", "clear sky");
        let (snapshot, forecast) =
            load_weather(&provider, &Query::Coords { lat: 69.6, lon: 18.9 }).await.unwrap();

        assert_eq!(snapshot.city, "Tromsø");
        assert_eq!(snapshot.coordinates.latitude, 69.6);
        assert_eq!(forecast.unwrap().city, "Tromsø");
    }
}
