//! REST implementation of [`RemoteGateway`].

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{BroadcastNotification, GatewayError, GatewayResult, RemoteGateway};
use crate::config::ClientConfig;
use crate::models::{
    Branch, CalendarEvent, CreateMoveoutListRequest, CreatedList, DashboardStats, MoveoutList,
    MoveoutListId, Profile, WeatherData,
};
use crate::util::{compact_text, is_http_url, normalize_text_option};

const DEFAULT_WEATHER_LOCATION: &str = "Stockholm";

/// HTTP client for the Stock Nexus backend API.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    base_url: String,
    access_token: Option<String>,
    user_id: Option<String>,
    weather_location: String,
    client: Client,
}

impl HttpGateway {
    /// Builds a client for an explicit API base URL.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> GatewayResult<Self> {
        let base_url = normalize_base_url(&base_url.into())?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url,
            access_token: None,
            user_id: None,
            weather_location: DEFAULT_WEATHER_LOCATION.to_string(),
            client,
        })
    }

    /// Builds a client from resolved client configuration.
    pub fn from_config(config: &ClientConfig) -> GatewayResult<Self> {
        let base_url = config.api_base_url.clone().ok_or_else(|| {
            GatewayError::InvalidConfiguration("api_base_url is not configured".to_string())
        })?;
        let mut gateway = Self::new(base_url, config.request_timeout())?;
        gateway.access_token = normalize_text_option(config.access_token.clone());
        gateway.user_id = normalize_text_option(config.user_id.clone());
        if let Some(location) = normalize_text_option(config.weather_location.clone()) {
            gateway.weather_location = location;
        }
        Ok(gateway)
    }

    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = normalize_text_option(Some(token.into()));
        self
    }

    #[must_use]
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = normalize_text_option(Some(user_id.into()));
        self
    }

    /// Returns the normalized API base URL used by this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> GatewayResult<RequestBuilder> {
        let token = self
            .access_token
            .as_deref()
            .ok_or(GatewayError::NotAuthenticated)?;
        Ok(request
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json"))
    }

    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        let request = self.authorized(self.client.get(self.url(path)))?;
        let envelope = send_json::<Envelope<T>>(request).await?;
        Ok(envelope.data)
    }

    /// Fetch a wrapped array, skipping elements that fail to decode.
    ///
    /// Only for display-only collections. Lists that drive partitioning must
    /// go through [`Self::get_data`] so a bad element fails the whole fetch.
    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<Vec<T>> {
        let raw = self.get_data::<Vec<serde_json::Value>>(path).await?;
        Ok(keep_decodable(raw, path))
    }
}

impl RemoteGateway for HttpGateway {
    async fn get_user_profile(&self) -> GatewayResult<Profile> {
        let user_id = self.user_id.as_deref().ok_or_else(|| {
            GatewayError::InvalidConfiguration("user_id is required to load the profile".to_string())
        })?;
        self.get_data(&format!("/profile/{}", urlencoding::encode(user_id)))
            .await
    }

    async fn get_dashboard_stats(&self) -> GatewayResult<DashboardStats> {
        self.get_data("/dashboard/stats").await
    }

    async fn get_weather(&self) -> GatewayResult<WeatherData> {
        let location = urlencoding::encode(&self.weather_location);
        self.get_data(&format!("/weather/current?location={location}"))
            .await
    }

    async fn get_branches(&self) -> GatewayResult<Vec<Branch>> {
        self.get_data("/branches").await
    }

    async fn get_calendar_events(&self) -> GatewayResult<Vec<CalendarEvent>> {
        self.get_list("/calendar-events").await
    }

    async fn get_moveout_lists(&self) -> GatewayResult<Vec<MoveoutList>> {
        self.get_data("/moveout-lists").await
    }

    async fn process_moveout_item(
        &self,
        list_id: &MoveoutListId,
        item_id: &str,
        quantity: u32,
        actor_name: &str,
    ) -> GatewayResult<()> {
        let payload = serde_json::json!({
            "itemId": item_id,
            "quantity": quantity,
            "userName": actor_name,
        });
        let path = format!(
            "/moveout-lists/{}/process-item",
            urlencoding::encode(list_id.as_str())
        );
        let request = self.authorized(self.client.post(self.url(&path)).json(&payload))?;
        send_empty(request).await
    }

    async fn create_moveout_list(
        &self,
        request: &CreateMoveoutListRequest,
    ) -> GatewayResult<CreatedList> {
        let request =
            self.authorized(self.client.post(self.url("/moveout-lists")).json(request))?;
        let envelope = send_json::<Envelope<CreatedList>>(request).await?;
        Ok(envelope.data)
    }

    async fn broadcast_notification(
        &self,
        notification: &BroadcastNotification,
    ) -> GatewayResult<()> {
        let payload = serde_json::json!({
            "type": notification.kind,
            "title": notification.title,
            "message": broadcast_body(notification, chrono::Local::now()),
            "broadcast": true,
        });
        let request = self.authorized(
            self.client
                .post(self.url("/notifications/broadcast"))
                .json(&payload),
        )?;
        send_empty(request).await
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> GatewayResult<T> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(api_error(status, &body));
    }
    decode_body(&body)
}

fn decode_body<T: DeserializeOwned>(body: &str) -> GatewayResult<T> {
    serde_json::from_str(body)
        .map_err(|error| GatewayError::InvalidPayload(format!("{error}: {}", compact_text(body))))
}

fn keep_decodable<T: DeserializeOwned>(raw: Vec<serde_json::Value>, path: &str) -> Vec<T> {
    let total = raw.len();
    let decoded = raw
        .into_iter()
        .filter_map(|element| match serde_json::from_value::<T>(element) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!("Skipping undecodable element from {}: {}", path, error);
                None
            }
        })
        .collect::<Vec<_>>();
    tracing::debug!("Fetched {} of {} elements from {}", decoded.len(), total, path);
    decoded
}

async fn send_empty(request: RequestBuilder) -> GatewayResult<()> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(api_error(status, &body))
}

fn api_error(status: StatusCode, body: &str) -> GatewayError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|payload| payload.message.or(payload.error))
        .map_or_else(
            || {
                let trimmed = compact_text(body);
                if trimmed.is_empty() {
                    format!("HTTP {}", status.as_u16())
                } else {
                    trimmed
                }
            },
            |message| message.trim().to_string(),
        );
    GatewayError::Api {
        status: status.as_u16(),
        message,
    }
}

fn broadcast_body<Tz>(notification: &BroadcastNotification, now: chrono::DateTime<Tz>) -> String
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}\nCreated by: {}\nDate: {}",
        notification.message,
        notification.creator_name,
        now.format("%b %d, %Y at %H:%M")
    )
}

fn normalize_base_url(raw: &str) -> GatewayResult<String> {
    let base_url = normalize_text_option(Some(raw.to_string())).ok_or_else(|| {
        GatewayError::InvalidConfiguration("API base URL must not be empty".to_string())
    })?;
    if !is_http_url(&base_url) {
        return Err(GatewayError::InvalidConfiguration(
            "API base URL must include http:// or https://".to_string(),
        ));
    }
    Ok(base_url.trim_end_matches('/').to_string())
}
