//! Dashboard state holder.
//!
//! [`DashboardController`] owns the TTL cache of dashboard resources and the
//! observable [`DashboardView`]. A load runs in two phases: phase one fetches
//! profile, stats and weather together; phase two fetches whatever the
//! resolved role allows. Moveout lists are refreshed at the end of every
//! load.
//!
//! A forced refresh does not cancel a load already in flight. Whichever
//! finishes last writes the cache and the view.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;

use crate::cache::{ttl_millis, CacheEntry};
use crate::clock::{Clock, SystemClock};
use crate::config::ClientConfig;
use crate::error::{surface_for, Surface};
use crate::fetch::{FetchOrchestrator, FetchTask, Fetched, Requirement, Resource};
use crate::gateway::RemoteGateway;
use crate::models::{
    upcoming_events, Branch, CalendarEvent, CreatedList, DashboardStats, DraftLine,
    MoveoutListId, Profile, Role, WeatherData,
};
use crate::moveout::{MoveoutSync, MoveoutView, ProcessOutcome, SyncError};
use crate::notice::Notifier;
use crate::plan::{FetchPlan, RoleFetchPlanner};
use crate::state::{LoadState, RefreshMode};

/// Cached dashboard resources.
///
/// Every entry written by one load carries that load's start time.
#[derive(Debug, Clone, Default)]
pub struct DashboardCache {
    pub profile: CacheEntry<Profile>,
    pub stats: CacheEntry<DashboardStats>,
    pub weather: CacheEntry<WeatherData>,
    pub calendar_events: CacheEntry<Vec<CalendarEvent>>,
    pub branches: CacheEntry<Vec<Branch>>,
}

impl DashboardCache {
    fn has_value(&self, resource: Resource) -> bool {
        match resource {
            Resource::Profile => self.profile.is_populated(),
            Resource::Stats => self.stats.is_populated(),
            Resource::Weather => self.weather.is_populated(),
            Resource::CalendarEvents => self.calendar_events.is_populated(),
            Resource::Branches => self.branches.is_populated(),
        }
    }

    fn role(&self) -> Option<Role> {
        self.profile.value().map(|profile| profile.role.clone())
    }

    /// Age of the cached dashboard if it is still fresh.
    ///
    /// Staff never see stats, so their cache is fresh on the profile alone.
    fn fresh_age(&self, ttl_millis: i64, now_millis: i64) -> Option<i64> {
        if !self.profile.is_fresh(ttl_millis, now_millis) {
            return None;
        }
        let staff = self.role().is_some_and(|role| role.is_staff());
        if !staff && !self.stats.is_fresh(ttl_millis, now_millis) {
            return None;
        }
        self.profile.age_millis(now_millis)
    }
}

/// Observable dashboard state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardView {
    pub is_loading: bool,
    pub is_refreshing: bool,
    /// Blocking error, only set when a required resource has nothing to show.
    pub error_message: Option<String>,
    pub profile: Option<Profile>,
    pub stats: Option<DashboardStats>,
    pub weather: Option<WeatherData>,
    pub calendar_events: Vec<CalendarEvent>,
    pub branches: Vec<Branch>,
    /// Staff user with no branch yet.
    pub pending_access: bool,
}

impl DashboardView {
    pub const fn load_state(&self) -> LoadState {
        LoadState::from_flags(
            self.is_loading,
            self.is_refreshing,
            self.error_message.is_some(),
        )
    }
}

/// What a call to [`DashboardController::load`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Cache was fresh; nothing was fetched.
    Cached,
    /// Fetched; any failures were toasts or silent.
    Fetched,
    /// A required resource failed with nothing cached to fall back on.
    Blocked,
}

pub struct DashboardController<G, C = SystemClock> {
    gateway: Arc<G>,
    clock: C,
    ttl: Duration,
    cache: Mutex<DashboardCache>,
    state: watch::Sender<DashboardView>,
    moveouts: MoveoutSync<G>,
    notifier: Notifier,
    open_pending_requested: AtomicBool,
}

impl<G, C> std::fmt::Debug for DashboardController<G, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardController")
            .field("ttl", &self.ttl)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

impl<G: RemoteGateway> DashboardController<G, SystemClock> {
    pub fn from_config(gateway: Arc<G>, config: &ClientConfig, notifier: Notifier) -> Self {
        Self::new(gateway, SystemClock, config.dashboard_ttl(), notifier)
    }
}

impl<G: RemoteGateway, C: Clock> DashboardController<G, C> {
    pub fn new(gateway: Arc<G>, clock: C, ttl: Duration, notifier: Notifier) -> Self {
        let (state, _) = watch::channel(DashboardView::default());
        let moveouts = MoveoutSync::new(Arc::clone(&gateway), notifier.clone());
        Self {
            gateway,
            clock,
            ttl,
            cache: Mutex::new(DashboardCache::default()),
            state,
            moveouts,
            notifier,
            open_pending_requested: AtomicBool::new(false),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardView> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> DashboardView {
        self.state.borrow().clone()
    }

    pub const fn moveouts(&self) -> &MoveoutSync<G> {
        &self.moveouts
    }

    pub fn moveout_snapshot(&self) -> MoveoutView {
        self.moveouts.snapshot()
    }

    pub const fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Load the dashboard, reusing cached data while it is fresh.
    pub async fn load(&self, force: bool) -> LoadOutcome {
        let now = self.clock.now_millis();
        let ttl = ttl_millis(self.ttl);

        if !force {
            let age = self.lock_cache().fresh_age(ttl, now);
            if let Some(age) = age {
                tracing::debug!("Using cached dashboard data ({}s old)", age / 1000);
                self.state.send_if_modified(|view| {
                    std::mem::replace(&mut view.is_loading, false)
                });
                return LoadOutcome::Cached;
            }
        }

        self.state.send_modify(|view| {
            if force {
                view.is_refreshing = true;
            } else {
                view.is_loading = true;
            }
        });

        let blocking_error = self.run_phase_one(now).await;
        let role = self.lock_cache().role();
        match role {
            Some(role) => self.run_phase_two(&role, now).await,
            None => tracing::debug!("No profile available, skipping role-gated fetches"),
        }

        if let Err(error) = self.moveouts.refresh_all(RefreshMode::Visible).await {
            tracing::warn!("Failed to load moveout lists: {}", error);
        }
        if self.open_pending_requested.load(Ordering::SeqCst) && self.moveouts.open_first_pending()
        {
            self.open_pending_requested.store(false, Ordering::SeqCst);
        }

        let outcome = if blocking_error.is_some() {
            LoadOutcome::Blocked
        } else {
            LoadOutcome::Fetched
        };
        self.publish(blocking_error);
        outcome
    }

    /// Re-fetch everything regardless of freshness.
    pub async fn force_refresh(&self) -> LoadOutcome {
        self.load(true).await
    }

    pub async fn toggle_history(&self) -> Result<bool, SyncError> {
        self.moveouts.toggle_history().await
    }

    pub async fn process_item(
        &self,
        list_id: &MoveoutListId,
        item_id: &str,
        quantity: u32,
    ) -> Result<ProcessOutcome, SyncError> {
        let actor = self.actor_name();
        self.moveouts
            .process_item(list_id, item_id, quantity, &actor)
            .await
    }

    pub async fn create_list(&self, lines: &[DraftLine]) -> Result<CreatedList, SyncError> {
        let creator = self.actor_name();
        self.moveouts.create_list(lines, &creator).await
    }

    /// Open the first pending list now, or as soon as lists are loaded.
    pub fn open_from_notification(&self) {
        if !self.moveouts.open_first_pending() {
            self.open_pending_requested.store(true, Ordering::SeqCst);
        }
    }

    pub fn cache(&self) -> DashboardCache {
        self.lock_cache().clone()
    }

    /// Runs phase one and returns the blocking error message, if any.
    async fn run_phase_one(&self, now: i64) -> Option<String> {
        let plan = RoleFetchPlanner::phase_one();
        let report = FetchOrchestrator::run(self.tasks(&plan)).await;

        let mut cache = self.lock_cache();
        let mut failures = Vec::new();
        for outcome in report.into_outcomes() {
            match outcome.result {
                Ok(fetched) => store(&mut cache, fetched, now),
                Err(error) => failures.push((outcome.resource, error)),
            }
        }

        // Requirements depend on the role, which is only known now.
        let resolved = RoleFetchPlanner::phase_one_for(cache.role().as_ref());
        let mut blocking = None;
        for (resource, error) in failures {
            let requirement = resolved
                .requirement(resource)
                .unwrap_or(Requirement::Optional);
            match surface_for(requirement, cache.has_value(resource)) {
                Surface::Blocking => {
                    blocking.get_or_insert_with(|| error.to_string());
                }
                Surface::Toast => {
                    self.notifier
                        .error(format!("Could not refresh {resource}: {error}"));
                }
                Surface::Silent => {
                    tracing::debug!("Omitting {} after failed fetch", resource);
                }
            }
        }
        blocking
    }

    async fn run_phase_two(&self, role: &Role, now: i64) {
        let plan = RoleFetchPlanner::plan(role);
        if plan.is_empty() {
            return;
        }
        let report = FetchOrchestrator::run(self.tasks(&plan)).await;

        let today = self.clock.today();
        let mut cache = self.lock_cache();
        for outcome in report.into_outcomes() {
            match outcome.result {
                Ok(Fetched::CalendarEvents(events)) => {
                    cache
                        .calendar_events
                        .restamp(upcoming_events(events, today), now);
                }
                Ok(fetched) => store(&mut cache, fetched, now),
                Err(_) => {}
            }
        }
    }

    fn tasks(&self, plan: &FetchPlan) -> Vec<FetchTask<'_>> {
        plan.tasks()
            .iter()
            .map(|planned| FetchTask::for_planned(self.gateway.as_ref(), *planned))
            .collect()
    }

    fn publish(&self, blocking_error: Option<String>) {
        let cache = self.lock_cache().clone();
        let role = cache.role();
        let staff = role.as_ref().is_some_and(Role::is_staff);
        let admin = role.as_ref().is_some_and(Role::is_admin);

        self.state.send_modify(|view| {
            view.is_loading = false;
            view.is_refreshing = false;
            view.error_message = blocking_error;
            view.pending_access = cache
                .profile
                .value()
                .is_some_and(Profile::is_pending_access);
            view.profile = cache.profile.value().cloned();
            view.stats = cache.stats.value().cloned();
            view.weather = cache.weather.value().cloned();
            view.calendar_events = if staff {
                Vec::new()
            } else {
                cache.calendar_events.value().cloned().unwrap_or_default()
            };
            view.branches = if admin {
                cache.branches.value().cloned().unwrap_or_default()
            } else {
                Vec::new()
            };
        });
    }

    fn actor_name(&self) -> String {
        self.lock_cache()
            .profile
            .value()
            .map_or_else(|| "Unknown".to_string(), |profile| profile.name.clone())
    }

    fn lock_cache(&self) -> MutexGuard<'_, DashboardCache> {
        self.cache
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

fn store(cache: &mut DashboardCache, fetched: Fetched, now: i64) {
    match fetched {
        Fetched::Profile(profile) => cache.profile.restamp(profile, now),
        Fetched::Stats(stats) => cache.stats.restamp(stats, now),
        Fetched::Weather(weather) => cache.weather.restamp(weather, now),
        Fetched::CalendarEvents(events) => cache.calendar_events.restamp(events, now),
        Fetched::Branches(branches) => cache.branches.restamp(branches, now),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::clock::ManualClock;
    use crate::gateway::testing::{self, list, Call, ScriptedGateway};
    use crate::notice::{drain, Notice};

    const TTL: Duration = Duration::from_secs(300);

    fn start_millis() -> i64 {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .and_then(|date| date.and_hms_opt(9, 0, 0))
            .map(|time| time.and_utc().timestamp_millis())
            .unwrap()
    }

    fn controller(
        gateway: ScriptedGateway,
    ) -> (
        Arc<ScriptedGateway>,
        ManualClock,
        DashboardController<ScriptedGateway, ManualClock>,
    ) {
        let gateway = Arc::new(gateway);
        let clock = ManualClock::new(start_millis());
        let controller =
            DashboardController::new(Arc::clone(&gateway), clock.clone(), TTL, Notifier::new());
        (gateway, clock, controller)
    }

    fn event(id: &str, date: &str) -> CalendarEvent {
        CalendarEvent {
            id: id.to_string(),
            title: id.to_string(),
            description: None,
            event_date: date.to_string(),
            event_type: "reorder".to_string(),
        }
    }

    fn phase_one_calls(gateway: &ScriptedGateway) -> usize {
        gateway.count(|call| matches!(call, Call::Profile | Call::Stats | Call::Weather))
    }

    #[tokio::test]
    async fn fresh_cache_skips_network() {
        let (gateway, clock, controller) = controller(ScriptedGateway::new());

        assert_eq!(controller.load(false).await, LoadOutcome::Fetched);
        let calls = gateway.calls().len();

        clock.advance(ttl_millis(TTL));
        assert_eq!(controller.load(false).await, LoadOutcome::Cached);
        assert_eq!(gateway.calls().len(), calls);

        clock.advance(1);
        assert_eq!(controller.load(false).await, LoadOutcome::Fetched);
        assert_eq!(phase_one_calls(&gateway), 6);
    }

    #[tokio::test]
    async fn force_refresh_bypasses_fresh_cache_and_restamps() {
        let (gateway, clock, controller) = controller(ScriptedGateway::new());
        controller.load(false).await;

        clock.advance(1_000);
        assert_eq!(controller.force_refresh().await, LoadOutcome::Fetched);

        assert_eq!(phase_one_calls(&gateway), 6);
        assert_eq!(
            controller.cache().stats.fetched_at_millis(),
            Some(start_millis() + 1_000)
        );
        let view = controller.snapshot();
        assert!(!view.is_refreshing);
        assert!(!view.is_loading);
    }

    #[tokio::test]
    async fn admin_loads_calendar_and_branches() {
        let gateway = ScriptedGateway::new().with_role("admin");
        gateway.script(|script| {
            script.calendar.set(vec![
                event("past", "2024-03-01"),
                event("later", "2024-04-01"),
                event("today", "2024-03-10"),
            ]);
            script.branches.set(vec![Branch {
                id: "b1".to_string(),
                name: "Central".to_string(),
                location: None,
                district_id: None,
            }]);
        });
        let (_, _, controller) = controller(gateway);

        controller.load(false).await;

        let view = controller.snapshot();
        let ids = view
            .calendar_events
            .iter()
            .map(|event| event.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["today", "later"]);
        assert_eq!(view.branches.len(), 1);
        assert_eq!(view.error_message, None);
    }

    #[tokio::test]
    async fn other_roles_skip_branches() {
        let (gateway, _, controller) = controller(ScriptedGateway::new().with_role("manager"));
        controller.load(false).await;

        assert_eq!(gateway.count(|call| *call == Call::Calendar), 1);
        assert_eq!(gateway.count(|call| *call == Call::Branches), 0);
    }

    #[tokio::test]
    async fn staff_stats_failure_is_silent() {
        let gateway = ScriptedGateway::new().with_role("staff");
        gateway.script(|script| script.stats.fail("forbidden"));
        let (gateway, _, controller) = controller(gateway);
        let mut notices = controller.notifier().subscribe();

        assert_eq!(controller.load(false).await, LoadOutcome::Fetched);

        let view = controller.snapshot();
        assert_eq!(view.stats, None);
        assert_eq!(view.error_message, None);
        assert!(view.profile.is_some());
        assert_eq!(
            gateway.count(|call| matches!(call, Call::Calendar | Call::Branches)),
            0
        );
        assert!(drain(&mut notices).is_empty());
    }

    #[tokio::test]
    async fn required_failure_without_prior_data_blocks() {
        let gateway = ScriptedGateway::new().with_role("manager");
        gateway.script(|script| script.stats.fail("database offline"));
        let (_, _, controller) = controller(gateway);

        assert_eq!(controller.load(false).await, LoadOutcome::Blocked);

        let view = controller.snapshot();
        assert!(view
            .error_message
            .as_deref()
            .is_some_and(|message| message.contains("database offline")));
        assert_eq!(view.load_state(), LoadState::Failed);
        assert!(!view.is_loading);
    }

    #[tokio::test]
    async fn required_failure_with_prior_data_toasts() {
        let (gateway, _, controller) = controller(ScriptedGateway::new().with_role("manager"));
        controller.load(false).await;
        gateway.script(|script| script.stats.fail("database offline"));
        let mut notices = controller.notifier().subscribe();

        assert_eq!(controller.force_refresh().await, LoadOutcome::Fetched);

        let view = controller.snapshot();
        assert_eq!(view.error_message, None);
        assert_eq!(view.stats, Some(testing::stats()));
        let notices = drain(&mut notices);
        assert_eq!(notices.len(), 1);
        assert!(notices[0].text.starts_with("Could not refresh stats"));
    }

    #[tokio::test]
    async fn optional_failures_never_block() {
        let gateway = ScriptedGateway::new().with_role("admin");
        gateway.script(|script| {
            script.weather.fail("no weather");
            script.calendar.fail("no calendar");
            script.branches.fail("no branches");
        });
        let (_, _, controller) = controller(gateway);

        assert_eq!(controller.load(false).await, LoadOutcome::Fetched);
        let view = controller.snapshot();
        assert_eq!(view.error_message, None);
        assert_eq!(view.weather, None);
        assert!(view.calendar_events.is_empty());
        assert!(view.branches.is_empty());
    }

    #[tokio::test]
    async fn failed_profile_falls_back_to_cached_role() {
        let (gateway, _, controller) = controller(ScriptedGateway::new().with_role("admin"));
        controller.load(false).await;
        gateway.script(|script| script.profile.fail("timeout"));

        assert_eq!(controller.force_refresh().await, LoadOutcome::Fetched);
        assert_eq!(gateway.count(|call| *call == Call::Branches), 2);
    }

    #[tokio::test]
    async fn profile_failure_without_cache_skips_phase_two() {
        let gateway = ScriptedGateway::new();
        gateway.script(|script| script.profile.fail("unauthorized"));
        let (gateway, _, controller) = controller(gateway);

        assert_eq!(controller.load(false).await, LoadOutcome::Blocked);
        assert_eq!(
            gateway.count(|call| matches!(call, Call::Calendar | Call::Branches)),
            0
        );
    }

    #[tokio::test]
    async fn pending_access_for_staff_without_branch() {
        let gateway = ScriptedGateway::new();
        gateway.script(|script| {
            let mut profile = testing::profile("staff");
            profile.branch_id = None;
            script.profile.set(profile);
        });
        let (_, _, controller) = controller(gateway);

        controller.load(false).await;
        assert!(controller.snapshot().pending_access);
    }

    #[tokio::test]
    async fn notification_open_waits_for_lists() {
        let gateway = ScriptedGateway::new().with_lists(vec![
            list("c1", "completed", Vec::new()),
            list("p1", "active", Vec::new()),
        ]);
        let (_, _, controller) = controller(gateway);

        controller.open_from_notification();
        assert_eq!(controller.moveout_snapshot().open_list, None);

        controller.load(false).await;
        assert_eq!(
            controller
                .moveout_snapshot()
                .open_list
                .map(|list| list.id),
            Some(MoveoutListId::new("p1"))
        );
    }

    #[tokio::test]
    async fn process_item_uses_profile_name() {
        let (gateway, _, controller) = controller(
            ScriptedGateway::new().with_lists(vec![list("L1", "active", Vec::new())]),
        );
        controller.load(false).await;
        let mut notices = controller.notifier().subscribe();

        controller
            .process_item(&MoveoutListId::new("L1"), "i1", 3)
            .await
            .unwrap();

        assert!(gateway.calls().contains(&Call::Process {
            list_id: "L1".to_string(),
            item_id: "i1".to_string(),
            quantity: 3,
            actor: "Ana".to_string(),
        }));
        assert_eq!(
            drain(&mut notices),
            vec![Notice::info("Item processed successfully")]
        );
    }
}
