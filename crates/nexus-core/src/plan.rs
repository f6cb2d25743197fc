//! Role-conditional fetch planning.
//!
//! Loading the dashboard is two-phase. Phase one (profile, stats, weather)
//! always runs; phase two depends on the role returned by phase one:
//!
//! | role        | calendar events | branches |
//! |-------------|-----------------|----------|
//! | staff       | -               | -        |
//! | admin       | optional        | optional |
//! | other roles | optional        | -        |
//!
//! Stats are required for every role except staff, who never see the stats
//! cards.

use crate::fetch::{Requirement, Resource};
use crate::models::Role;

/// One named fetch in a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedFetch {
    pub resource: Resource,
    pub requirement: Requirement,
}

impl PlannedFetch {
    const fn required(resource: Resource) -> Self {
        Self {
            resource,
            requirement: Requirement::Required,
        }
    }

    const fn optional(resource: Resource) -> Self {
        Self {
            resource,
            requirement: Requirement::Optional,
        }
    }
}

/// Immutable set of fetches decided for one load cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FetchPlan {
    tasks: Vec<PlannedFetch>,
}

impl FetchPlan {
    pub fn tasks(&self) -> &[PlannedFetch] {
        &self.tasks
    }

    pub fn contains(&self, resource: Resource) -> bool {
        self.requirement(resource).is_some()
    }

    pub fn requirement(&self, resource: Resource) -> Option<Requirement> {
        self.tasks
            .iter()
            .find(|task| task.resource == resource)
            .map(|task| task.requirement)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Decides fetch plans from the current user's role.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleFetchPlanner;

impl RoleFetchPlanner {
    /// Phase one, before the role is known.
    pub fn phase_one() -> FetchPlan {
        Self::phase_one_for(None)
    }

    /// Phase one with requirements resolved against `role`.
    ///
    /// Used after phase one settles to classify its failures.
    pub fn phase_one_for(role: Option<&Role>) -> FetchPlan {
        let stats = if role.is_some_and(Role::is_staff) {
            PlannedFetch::optional(Resource::Stats)
        } else {
            PlannedFetch::required(Resource::Stats)
        };
        FetchPlan {
            tasks: vec![
                PlannedFetch::required(Resource::Profile),
                stats,
                PlannedFetch::optional(Resource::Weather),
            ],
        }
    }

    /// Phase two, gated on the role obtained in phase one.
    pub fn plan(role: &Role) -> FetchPlan {
        let mut tasks = Vec::new();
        if !role.is_staff() {
            tasks.push(PlannedFetch::optional(Resource::CalendarEvents));
        }
        if role.is_admin() {
            tasks.push(PlannedFetch::optional(Resource::Branches));
        }
        FetchPlan { tasks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(name: &str) -> Role {
        Role::from(name.to_string())
    }

    #[test]
    fn staff_gets_no_phase_two() {
        assert!(RoleFetchPlanner::plan(&role("staff")).is_empty());
    }

    #[test]
    fn admin_gets_calendar_and_branches() {
        let plan = RoleFetchPlanner::plan(&role("admin"));
        assert_eq!(
            plan.requirement(Resource::CalendarEvents),
            Some(Requirement::Optional)
        );
        assert_eq!(
            plan.requirement(Resource::Branches),
            Some(Requirement::Optional)
        );
    }

    #[test]
    fn other_roles_get_calendar_only() {
        for name in ["manager", "district_manager", "regional_manager"] {
            let plan = RoleFetchPlanner::plan(&role(name));
            assert!(plan.contains(Resource::CalendarEvents), "{name}");
            assert!(!plan.contains(Resource::Branches), "{name}");
        }
    }

    #[test]
    fn phase_one_always_fetches_profile_stats_weather() {
        for resolved in [None, Some(role("staff")), Some(role("admin"))] {
            let plan = RoleFetchPlanner::phase_one_for(resolved.as_ref());
            assert_eq!(
                plan.requirement(Resource::Profile),
                Some(Requirement::Required)
            );
            assert!(plan.contains(Resource::Stats));
            assert_eq!(
                plan.requirement(Resource::Weather),
                Some(Requirement::Optional)
            );
        }
    }

    #[test]
    fn stats_are_optional_only_for_staff() {
        assert_eq!(
            RoleFetchPlanner::phase_one_for(Some(&role("staff"))).requirement(Resource::Stats),
            Some(Requirement::Optional)
        );
        assert_eq!(
            RoleFetchPlanner::phase_one_for(Some(&role("manager"))).requirement(Resource::Stats),
            Some(Requirement::Required)
        );
        assert_eq!(
            RoleFetchPlanner::phase_one().requirement(Resource::Stats),
            Some(Requirement::Required)
        );
    }
}
