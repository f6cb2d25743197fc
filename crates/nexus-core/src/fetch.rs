//! Concurrent fan-out of independent fetches.
//!
//! [`FetchOrchestrator::run`] drives every task to completion on the calling
//! task. A failure only fills that resource's error slot; siblings are never
//! cancelled. The orchestrator assumes nothing about completion order, so
//! dependent fetches must be split into separate phases by the caller.

use std::fmt;
use std::future::Future;

use futures::future::{join_all, BoxFuture, FutureExt};

use crate::gateway::{GatewayError, GatewayResult, RemoteGateway};
use crate::models::{Branch, CalendarEvent, DashboardStats, Profile, WeatherData};
use crate::plan::PlannedFetch;

/// Remote resources the dashboard knows how to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Profile,
    Stats,
    Weather,
    CalendarEvents,
    Branches,
}

impl Resource {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Profile => "profile",
            Self::Stats => "stats",
            Self::Weather => "weather",
            Self::CalendarEvents => "calendar_events",
            Self::Branches => "branches",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a failed fetch should reach the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Failure is a user-visible error for the whole load.
    Required,
    /// Failure is logged and the dependent section is omitted.
    Optional,
}

/// Tagged result of one fetch task.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    Profile(Profile),
    Stats(DashboardStats),
    Weather(WeatherData),
    CalendarEvents(Vec<CalendarEvent>),
    Branches(Vec<Branch>),
}

/// One independent fetch.
pub struct FetchTask<'a> {
    resource: Resource,
    requirement: Requirement,
    future: BoxFuture<'a, GatewayResult<Fetched>>,
}

impl<'a> FetchTask<'a> {
    pub fn new(
        resource: Resource,
        requirement: Requirement,
        future: impl Future<Output = GatewayResult<Fetched>> + Send + 'a,
    ) -> Self {
        Self {
            resource,
            requirement,
            future: future.boxed(),
        }
    }

    /// Build the gateway call for a planned fetch.
    pub fn for_planned<G: RemoteGateway>(gateway: &'a G, planned: PlannedFetch) -> Self {
        let PlannedFetch {
            resource,
            requirement,
        } = planned;
        match resource {
            Resource::Profile => Self::new(
                resource,
                requirement,
                gateway.get_user_profile().map(|r| r.map(Fetched::Profile)),
            ),
            Resource::Stats => Self::new(
                resource,
                requirement,
                gateway.get_dashboard_stats().map(|r| r.map(Fetched::Stats)),
            ),
            Resource::Weather => Self::new(
                resource,
                requirement,
                gateway.get_weather().map(|r| r.map(Fetched::Weather)),
            ),
            Resource::CalendarEvents => Self::new(
                resource,
                requirement,
                gateway
                    .get_calendar_events()
                    .map(|r| r.map(Fetched::CalendarEvents)),
            ),
            Resource::Branches => Self::new(
                resource,
                requirement,
                gateway.get_branches().map(|r| r.map(Fetched::Branches)),
            ),
        }
    }
}

impl fmt::Debug for FetchTask<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("FetchTask")
            .field("resource", &self.resource)
            .field("requirement", &self.requirement)
            .finish_non_exhaustive()
    }
}

/// Settled outcome of one task.
#[derive(Debug)]
pub struct TaskOutcome {
    pub resource: Resource,
    pub requirement: Requirement,
    pub result: GatewayResult<Fetched>,
}

impl TaskOutcome {
    pub const fn is_failure(&self) -> bool {
        self.result.is_err()
    }
}

/// Partial results plus per-resource error state of one fan-out.
#[derive(Debug, Default)]
pub struct FetchReport {
    outcomes: Vec<TaskOutcome>,
}

impl FetchReport {
    pub fn outcomes(&self) -> &[TaskOutcome] {
        &self.outcomes
    }

    pub fn into_outcomes(self) -> Vec<TaskOutcome> {
        self.outcomes
    }

    /// Error recorded for `resource`, if its task failed.
    pub fn error(&self, resource: Resource) -> Option<&GatewayError> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.resource == resource)
            .and_then(|outcome| outcome.result.as_ref().err())
    }

    /// Successful value for `resource`, if its task succeeded.
    pub fn value(&self, resource: Resource) -> Option<&Fetched> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.resource == resource)
            .and_then(|outcome| outcome.result.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &TaskOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.is_failure())
    }

    pub fn has_required_failure(&self) -> bool {
        self.failures()
            .any(|outcome| outcome.requirement == Requirement::Required)
    }
}

/// Runs fetch tasks concurrently without short-circuiting.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOrchestrator;

impl FetchOrchestrator {
    pub async fn run(tasks: Vec<FetchTask<'_>>) -> FetchReport {
        let labels = tasks
            .iter()
            .map(|task| (task.resource, task.requirement))
            .collect::<Vec<_>>();
        let results = join_all(tasks.into_iter().map(|task| task.future)).await;

        let outcomes = labels
            .into_iter()
            .zip(results)
            .map(|((resource, requirement), result)| {
                if let Err(error) = &result {
                    match requirement {
                        Requirement::Required => {
                            tracing::warn!("Required fetch '{}' failed: {}", resource, error);
                        }
                        Requirement::Optional => {
                            tracing::debug!("Optional fetch '{}' failed: {}", resource, error);
                        }
                    }
                }
                TaskOutcome {
                    resource,
                    requirement,
                    result,
                }
            })
            .collect();

        FetchReport { outcomes }
    }
}
