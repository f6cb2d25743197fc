use nexus_core::config::ClientConfig;
use nexus_core::dashboard::{DashboardView, LoadOutcome};
use nexus_core::models::{Branch, CalendarEvent, DashboardStats, Profile, WeatherData};
use serde::Serialize;

use crate::commands::common::{build_controller, format_list_line, print_notices};
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct DashboardSummary<'a> {
    pub profile: Option<&'a Profile>,
    pub pending_access: bool,
    pub stats: Option<&'a DashboardStats>,
    pub weather: Option<&'a WeatherData>,
    pub upcoming_events: &'a [CalendarEvent],
    pub branches: &'a [Branch],
    pub pending_lists: usize,
}

pub async fn run_dashboard(config: &ClientConfig, refresh: bool, json: bool) -> Result<(), CliError> {
    let (controller, mut notices) = build_controller(config)?;
    let outcome = controller.load(refresh).await;
    print_notices(&mut notices);

    let view = controller.snapshot();
    if outcome == LoadOutcome::Blocked {
        let message = view
            .error_message
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(CliError::DashboardUnavailable(message));
    }

    let moveouts = controller.moveout_snapshot();
    if json {
        let summary = summarize(&view, moveouts.pending.len());
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    for line in format_dashboard(&view) {
        println!("{line}");
    }
    println!("Pending moveout lists: {}", moveouts.pending.len());
    for list in &moveouts.pending {
        println!("  {}", format_list_line(list));
    }
    Ok(())
}

pub fn summarize(view: &DashboardView, pending_lists: usize) -> DashboardSummary<'_> {
    DashboardSummary {
        profile: view.profile.as_ref(),
        pending_access: view.pending_access,
        stats: view.stats.as_ref(),
        weather: view.weather.as_ref(),
        upcoming_events: &view.calendar_events,
        branches: &view.branches,
        pending_lists,
    }
}

pub fn format_dashboard(view: &DashboardView) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(profile) = &view.profile {
        lines.push(format!("{} ({})", profile.name, profile.role));
    }
    if view.pending_access {
        lines.push("Access pending: ask an admin to assign you a branch.".to_string());
        return lines;
    }
    if let Some(stats) = &view.stats {
        lines.push(format!(
            "Items: {}  Low stock: {}  Critical: {}",
            stats.total_items, stats.low_stock_items, stats.critical_stock_items
        ));
    }
    if let Some(weather) = &view.weather {
        lines.push(format!(
            "Weather in {}: {:.1}°C, {}",
            weather.location, weather.temperature, weather.condition
        ));
    }
    if !view.calendar_events.is_empty() {
        lines.push("Upcoming:".to_string());
        for event in &view.calendar_events {
            lines.push(format!("  {}  {}", event.event_date, event.title));
        }
    }
    if !view.branches.is_empty() {
        lines.push(format!("Branches: {}", view.branches.len()));
    }
    lines
}
