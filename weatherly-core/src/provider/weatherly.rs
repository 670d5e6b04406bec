use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    error::{FetchError, GENERIC_FETCH_MESSAGE},
    model::{Envelope, Forecast, WeatherSnapshot},
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://weatherly-app-bp4c.onrender.com";

/// Client for the weatherly JSON API.
#[derive(Debug, Clone)]
pub struct WeatherlyProvider {
    base: Url,
    http: Client,
}

impl WeatherlyProvider {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let base = Url::parse(base_url).map_err(|e| FetchError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self { base, http: Client::new() })
    }

    /// `{base}/api/v1/{segments...}`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(["api", "v1"])
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        debug!(%url, "requesting weather API");

        let res = self.http.get(url).query(query).send().await?;
        let status = res.status();
        let body = res.text().await?;

        decode_envelope(status, &body)
    }
}

#[async_trait]
impl WeatherProvider for WeatherlyProvider {
    async fn fetch_weather(&self, city: &str) -> Result<WeatherSnapshot, FetchError> {
        let url = self.endpoint(&["weather", city.trim()])?;
        self.get(url, &[]).await
    }

    async fn fetch_weather_by_coords(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<WeatherSnapshot, FetchError> {
        let url = self.endpoint(&["weather", "coordinates"])?;
        self.get(url, &[("lat", lat.to_string()), ("lon", lon.to_string())]).await
    }

    async fn fetch_forecast(&self, city: &str) -> Result<Forecast, FetchError> {
        let url = self.endpoint(&["forecast", city.trim()])?;
        self.get(url, &[]).await
    }
}

/// Interpret a response body from any endpoint.
///
/// An envelope with `success: false` (or without data) becomes [`FetchError::Api`]
/// carrying the server's message. A body that is not an envelope is reported by
/// status when the status is an error, and as a decode error otherwise.
pub fn decode_envelope<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, FetchError> {
    let envelope: Envelope<T> = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(err) if !status.is_success() => {
            debug!(error = %err, "non-envelope error body");
            return Err(FetchError::Status { status, body: truncate_body(body) });
        }
        Err(err) => return Err(FetchError::Decode(err)),
    };

    match envelope {
        Envelope { success: true, data: Some(data), .. } if status.is_success() => Ok(data),
        Envelope { error, .. } => {
            let message = error
                .and_then(|e| e.message)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| GENERIC_FETCH_MESSAGE.to_string());
            Err(FetchError::Api { status, message })
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OK_BODY: &str = r#"{
        "success": true,
        "data": {
            "city": "London", "country": "GB",
            "coordinates": { "latitude": 51.51, "longitude": -0.13 },
            "temperature": { "current": 18, "feels_like": 17, "min": 15, "max": 20 },
            "weather": { "main": "Clear", "description": "Clear Sky", "icon": "01d" },
            "details": { "humidity": 60, "pressure": 1015, "visibility": 10, "wind_speed": 3.6, "clouds": 0 },
            "sun": { "sunrise": "06:00", "sunset": "18:00" }
        },
        "error": null,
        "request_id": "abc"
    }"#;

    #[test]
    fn successful_envelope_yields_snapshot() {
        let snap: WeatherSnapshot = decode_envelope(StatusCode::OK, OK_BODY).expect("decodes");
        assert_eq!(snap.city, "London");
        assert_eq!(snap.weather.icon, "01d");
        assert_eq!(snap.details.wind_direction, 0.0);
    }

    #[test]
    fn unsuccessful_envelope_carries_server_message() {
        let body = r#"{"success": false, "data": null, "error": {"message": "City not found", "code": 404}}"#;
        let err = decode_envelope::<WeatherSnapshot>(StatusCode::NOT_FOUND, body).unwrap_err();

        match err {
            FetchError::Api { status, message } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(message, "City not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unsuccessful_envelope_without_message_uses_fallback() {
        let body = r#"{"success": false}"#;
        let err = decode_envelope::<WeatherSnapshot>(StatusCode::OK, body).unwrap_err();
        assert_eq!(err.user_message(), GENERIC_FETCH_MESSAGE);
    }

    #[test]
    fn html_error_page_is_reported_by_status() {
        let body = format!("<html>{}</html>", "x".repeat(500));
        let err = decode_envelope::<WeatherSnapshot>(StatusCode::BAD_GATEWAY, &body).unwrap_err();

        match err {
            FetchError::Status { status, body } => {
                assert_eq!(status, StatusCode::BAD_GATEWAY);
                assert!(body.ends_with("..."));
                assert_eq!(body.chars().count(), 203);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn garbage_with_ok_status_is_a_decode_error() {
        let err = decode_envelope::<WeatherSnapshot>(StatusCode::OK, "not json").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn endpoints_encode_city_segment() {
        let provider = WeatherlyProvider::new("https://example.com/").unwrap();
        let url = provider.endpoint(&["weather", "New York"]).unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/v1/weather/New%20York");

        let url = provider.endpoint(&["forecast", "a/b"]).unwrap();
        assert_eq!(url.as_str(), "https://example.com/api/v1/forecast/a%2Fb");
    }

    #[test]
    fn base_url_with_path_prefix_is_kept() {
        let provider = WeatherlyProvider::new("https://example.com/proxy").unwrap();
        let url = provider.endpoint(&["weather", "coordinates"]).unwrap();
        assert_eq!(url.as_str(), "https://example.com/proxy/api/v1/weather/coordinates");
    }

    #[test]
    fn rejects_non_url_base() {
        assert!(matches!(WeatherlyProvider::new("not a url"), Err(FetchError::InvalidUrl(_))));
        assert!(matches!(WeatherlyProvider::new("mailto:me@example.com"), Err(FetchError::InvalidUrl(_))));
    }
}
