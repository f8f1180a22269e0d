use serde::{Deserialize, Serialize};

use super::{Result, ServiceClient};
use crate::model::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub wind_speed_kmh: f64,
    pub weather_code: u16,
    pub condition: String,
    pub observed_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherAlert {
    pub event: String,
    pub severity: Severity,
    pub headline: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub starts: Option<String>,
    #[serde(default)]
    pub ends: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentBlock,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    time: String,
    temperature_2m: f64,
    relative_humidity_2m: f64,
    wind_speed_10m: f64,
    weather_code: u16,
}

#[derive(Debug, Deserialize)]
struct AlertsResponse {
    #[serde(default)]
    alerts: Vec<WeatherAlert>,
}

/// WMO weather interpretation codes, grouped.
pub fn describe_weather_code(code: u16) -> &'static str {
    match code {
        0 => "clear sky",
        1..=3 => "partly cloudy",
        45 | 48 => "fog",
        51..=57 => "drizzle",
        61..=67 => "rain",
        71..=77 => "snow",
        80..=82 => "rain showers",
        85 | 86 => "snow showers",
        95 => "thunderstorm",
        96 | 99 => "thunderstorm with hail",
        _ => "unknown",
    }
}

pub struct WeatherClient {
    client: ServiceClient,
    forecast_url: String,
    alerts_url: String,
}

impl WeatherClient {
    pub fn new(client: ServiceClient, forecast_url: String, alerts_url: String) -> Self {
        Self {
            client,
            forecast_url,
            alerts_url,
        }
    }

    pub async fn current(&self, at: Coordinates) -> Result<WeatherSnapshot> {
        let url = self.forecast_url.clone();
        let resp: ForecastResponse = self
            .client
            .send_json("weather", |http| {
                http.get(&url).query(&[
                    ("latitude", at.latitude.to_string()),
                    ("longitude", at.longitude.to_string()),
                    (
                        "current",
                        "temperature_2m,relative_humidity_2m,wind_speed_10m,weather_code"
                            .to_string(),
                    ),
                ])
            })
            .await?;
        let c = resp.current;
        Ok(WeatherSnapshot {
            temperature_c: c.temperature_2m,
            humidity_pct: c.relative_humidity_2m,
            wind_speed_kmh: c.wind_speed_10m,
            weather_code: c.weather_code,
            condition: describe_weather_code(c.weather_code).to_string(),
            observed_at: c.time,
        })
    }

    pub async fn alerts(&self, at: Coordinates) -> Result<Vec<WeatherAlert>> {
        let url = self.alerts_url.clone();
        let resp: AlertsResponse = self
            .client
            .send_json("weather-alerts", |http| {
                http.get(&url).query(&[
                    ("lat", at.latitude.to_string()),
                    ("lon", at.longitude.to_string()),
                ])
            })
            .await?;
        Ok(resp.alerts)
    }
}
