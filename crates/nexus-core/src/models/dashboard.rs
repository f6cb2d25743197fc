//! Dashboard resource models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Maximum number of upcoming calendar events shown on the dashboard.
pub const UPCOMING_EVENTS_LIMIT: usize = 5;

/// Aggregate stock statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_items: u32,
    pub low_stock_items: u32,
    pub critical_stock_items: u32,
    #[serde(default)]
    pub threshold_stock_items: u32,
    #[serde(default)]
    pub total_staff: u32,
}

/// Current weather at the user's location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherData {
    pub temperature: f64,
    pub condition: String,
    pub location: String,
    #[serde(default)]
    pub humidity: u32,
    #[serde(default)]
    pub wind_speed: f64,
}

/// A branch in the organization directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub district_id: Option<String>,
}

/// A scheduled stock event (reorder, delivery, expiry, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Event date, `YYYY-MM-DD` (a time suffix is tolerated)
    pub event_date: String,
    #[serde(default = "default_event_type")]
    pub event_type: String,
}

fn default_event_type() -> String {
    "reorder".to_string()
}

impl CalendarEvent {
    /// Parsed event date, or `None` when the server sent something unreadable.
    pub fn date(&self) -> Option<NaiveDate> {
        let day = self.event_date.get(..10).unwrap_or(&self.event_date);
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }
}

/// Events on or after `today`, soonest first, capped to
/// [`UPCOMING_EVENTS_LIMIT`]. Events with unreadable dates are dropped.
pub fn upcoming_events(events: Vec<CalendarEvent>, today: NaiveDate) -> Vec<CalendarEvent> {
    let mut dated = events
        .into_iter()
        .filter_map(|event| event.date().map(|date| (date, event)))
        .filter(|(date, _)| *date >= today)
        .collect::<Vec<_>>();
    dated.sort_by_key(|(date, _)| *date);
    dated
        .into_iter()
        .take(UPCOMING_EVENTS_LIMIT)
        .map(|(_, event)| event)
        .collect()
}
