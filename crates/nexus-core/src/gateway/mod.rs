//! Remote gateway seam.
//!
//! Everything that talks to the backend goes through [`RemoteGateway`]. The
//! production implementation is [`HttpGateway`]; tests use a scripted fake.

use std::future::Future;

use serde::Serialize;
use thiserror::Error;

use crate::models::{
    Branch, CalendarEvent, CreateMoveoutListRequest, CreatedList, DashboardStats, MoveoutList,
    MoveoutListId, Profile, WeatherData,
};

mod http;

#[cfg(test)]
pub(crate) mod testing;

pub use http::HttpGateway;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("No access token is configured")]
    NotAuthenticated,
    #[error("Invalid gateway configuration: {0}")]
    InvalidConfiguration(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {message} ({status})")]
    Api { status: u16, message: String },
    #[error("Invalid response payload: {0}")]
    InvalidPayload(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Staff-wide push notification sent after a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BroadcastNotification {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub message: String,
    #[serde(skip)]
    pub creator_name: String,
}

/// Network calls consumed by the sync engine.
///
/// Implementations must be cheap to share; the engine holds them in an `Arc`
/// and issues calls concurrently.
pub trait RemoteGateway: Send + Sync + 'static {
    fn get_user_profile(&self) -> impl Future<Output = GatewayResult<Profile>> + Send;

    fn get_dashboard_stats(&self) -> impl Future<Output = GatewayResult<DashboardStats>> + Send;

    fn get_weather(&self) -> impl Future<Output = GatewayResult<WeatherData>> + Send;

    fn get_branches(&self) -> impl Future<Output = GatewayResult<Vec<Branch>>> + Send;

    /// Raw calendar events; filtering to upcoming events is the caller's job.
    fn get_calendar_events(&self)
        -> impl Future<Output = GatewayResult<Vec<CalendarEvent>>> + Send;

    fn get_moveout_lists(&self) -> impl Future<Output = GatewayResult<Vec<MoveoutList>>> + Send;

    fn process_moveout_item(
        &self,
        list_id: &MoveoutListId,
        item_id: &str,
        quantity: u32,
        actor_name: &str,
    ) -> impl Future<Output = GatewayResult<()>> + Send;

    fn create_moveout_list(
        &self,
        request: &CreateMoveoutListRequest,
    ) -> impl Future<Output = GatewayResult<CreatedList>> + Send;

    fn broadcast_notification(
        &self,
        notification: &BroadcastNotification,
    ) -> impl Future<Output = GatewayResult<()>> + Send;
}
