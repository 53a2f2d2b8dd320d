//! Weather lookups for the weather agent
//!
//! A few cities have canned data so the demo works offline; everything else
//! goes to wttr.in.

use agentry_rag::agent::FunctionTool;
use agentry_rag::RagError;
use anyhow::Context;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Public wttr.in endpoint
pub const WTTR_BASE_URL: &str = "https://wttr.in";

/// Weather report returned by the `get_weather` tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WeatherResponse {
    /// Temperature in Fahrenheit
    pub temperature: f64,
    /// Short description, e.g. "Light rain"
    pub conditions: String,
    /// City the report is for
    pub location: String,
    /// Clothing or activity advice
    pub recommendation: Option<String>,
}

impl WeatherResponse {
    /// Report with a recommendation derived from the conditions
    pub fn new(location: impl Into<String>, temperature: f64, conditions: impl Into<String>) -> Self {
        let conditions = conditions.into();
        Self {
            recommendation: Some(weather_recommendation(temperature, &conditions).to_string()),
            temperature,
            conditions,
            location: location.into(),
        }
    }

    fn unavailable(location: &str) -> Self {
        Self {
            temperature: 0.0,
            conditions: "Error fetching weather data".to_string(),
            location: location.to_string(),
            recommendation: Some("Please try again later".to_string()),
        }
    }
}

/// Canned `(temperature, conditions)` for the demo cities
pub fn simulated_weather(city: &str) -> Option<(f64, &'static str)> {
    match city {
        "San Francisco" => Some((65.0, "Partly cloudy with fog")),
        "New York" => Some((75.0, "Mostly sunny")),
        "London" => Some((60.0, "Light rain")),
        _ => None,
    }
}

/// Advice for the given temperature and conditions
pub fn weather_recommendation(temperature: f64, conditions: &str) -> &'static str {
    let conditions = conditions.to_lowercase();

    if conditions.contains("rain") || conditions.contains("shower") {
        "Bring an umbrella and waterproof clothing!"
    } else if conditions.contains("snow") {
        "Dress warmly and wear snow boots!"
    } else if conditions.contains("clear") && temperature > 80.0 {
        "Hot and sunny - bring sunscreen and stay hydrated!"
    } else if conditions.contains("clear") && temperature < 50.0 {
        "Chilly but clear - bring a warm jacket!"
    } else {
        "Typical weather - dress comfortably for the temperature!"
    }
}

#[derive(Deserialize)]
struct WttrPayload {
    current_condition: Vec<WttrCondition>,
}

#[derive(Deserialize)]
struct WttrCondition {
    #[serde(rename = "temp_F")]
    temp_f: String,
    #[serde(rename = "weatherDesc")]
    weather_desc: Vec<WttrText>,
}

#[derive(Deserialize)]
struct WttrText {
    value: String,
}

/// Weather source: canned data first, wttr.in otherwise
#[derive(Debug, Clone)]
pub struct WeatherService {
    http: reqwest::Client,
    base_url: String,
}

impl Default for WeatherService {
    fn default() -> Self {
        Self::new()
    }
}

impl WeatherService {
    /// Service backed by the public wttr.in
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: WTTR_BASE_URL.to_string(),
        }
    }

    /// Point at another wttr.in-compatible server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Weather for `city`; never fails, errors become an "unavailable" report
    pub async fn get_weather(&self, city: &str) -> WeatherResponse {
        info!(city = %city, "Getting weather information");

        if let Some((temperature, conditions)) = simulated_weather(city) {
            return WeatherResponse::new(city, temperature, conditions);
        }

        match self.fetch(city).await {
            Ok(report) => report,
            Err(e) => {
                warn!(city = %city, error = %e, "Weather lookup failed");
                WeatherResponse::unavailable(city)
            }
        }
    }

    async fn fetch(&self, city: &str) -> anyhow::Result<WeatherResponse> {
        info!(city = %city, "Fetching weather from wttr.in");

        let payload: WttrPayload = self
            .http
            .get(format!("{}/{}", self.base_url, city))
            .query(&[("format", "j1")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let current = payload
            .current_condition
            .into_iter()
            .next()
            .context("no current_condition in response")?;
        let temperature: f64 = current
            .temp_f
            .parse()
            .with_context(|| format!("bad temp_F '{}'", current.temp_f))?;
        let conditions = current
            .weather_desc
            .into_iter()
            .next()
            .map(|d| d.value)
            .unwrap_or_default();

        Ok(WeatherResponse::new(city, temperature, conditions))
    }
}

#[derive(Deserialize, JsonSchema)]
struct CityArgs {
    /// The name of the city to get weather for
    city: String,
}

/// The `get_weather` tool
pub fn weather_tool<C: Send + Sync + 'static>(service: Arc<WeatherService>) -> FunctionTool<C> {
    FunctionTool::typed(
        "get_weather",
        "Get the current weather for a city. Returns temperature, conditions and a recommendation.",
        move |_ctx, args: CityArgs| {
            let service = Arc::clone(&service);
            async move {
                let report = service.get_weather(&args.city).await;
                serde_json::to_string(&report).map_err(|e| RagError::tool("get_weather", e.to_string()))
            }
        },
    )
}
