//! Scripted in-memory gateway for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use super::{BroadcastNotification, GatewayError, GatewayResult, RemoteGateway};
use crate::models::{
    Branch, CalendarEvent, CreateMoveoutListRequest, CreatedList, DashboardStats, ListStatus,
    MoveoutItem, MoveoutList, MoveoutListId, Profile, Role, WeatherData,
};

/// A recorded gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Profile,
    Stats,
    Weather,
    Branches,
    Calendar,
    Lists,
    Process {
        list_id: String,
        item_id: String,
        quantity: u32,
        actor: String,
    },
    Create {
        lines: usize,
    },
    Broadcast {
        title: String,
        message: String,
    },
}

/// Replies for one operation: queued replies first, then the fallback forever.
#[derive(Debug)]
pub struct Replies<T> {
    queue: VecDeque<Result<T, String>>,
    fallback: Result<T, String>,
}

impl<T: Clone> Replies<T> {
    fn new(fallback: Result<T, String>) -> Self {
        Self {
            queue: VecDeque::new(),
            fallback,
        }
    }

    fn next(&mut self) -> GatewayResult<T> {
        self.queue
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
            .map_err(|message| GatewayError::Api {
                status: 500,
                message,
            })
    }
}

#[derive(Debug)]
pub struct Script {
    pub profile: Replies<Profile>,
    pub stats: Replies<DashboardStats>,
    pub weather: Replies<WeatherData>,
    pub branches: Replies<Vec<Branch>>,
    pub calendar: Replies<Vec<CalendarEvent>>,
    pub lists: Replies<Vec<MoveoutList>>,
    pub process: Replies<()>,
    pub create: Replies<CreatedList>,
    pub broadcast: Replies<()>,
    pub delay: Option<Duration>,
    pub calls: Vec<Call>,
}

/// Gateway fake whose replies are scripted per operation.
#[derive(Debug)]
pub struct ScriptedGateway {
    script: Mutex<Script>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(Script {
                profile: Replies::new(Ok(profile("admin"))),
                stats: Replies::new(Ok(stats())),
                weather: Replies::new(Ok(weather())),
                branches: Replies::new(Ok(Vec::new())),
                calendar: Replies::new(Ok(Vec::new())),
                lists: Replies::new(Ok(Vec::new())),
                process: Replies::new(Ok(())),
                create: Replies::new(Ok(CreatedList {
                    id: MoveoutListId::new("created"),
                })),
                broadcast: Replies::new(Ok(())),
                delay: None,
                calls: Vec::new(),
            }),
        }
    }

    /// Edit the script in place.
    pub fn script<R>(&self, edit: impl FnOnce(&mut Script) -> R) -> R {
        let mut script = self.script.lock().unwrap_or_else(|poison| poison.into_inner());
        edit(&mut script)
    }

    pub fn with_role(self, role: &str) -> Self {
        self.script(|script| script.profile.fallback = Ok(profile(role)));
        self
    }

    pub fn with_lists(self, lists: Vec<MoveoutList>) -> Self {
        self.script(|script| script.lists.fallback = Ok(lists));
        self
    }

    pub fn queue_lists(&self, lists: Vec<MoveoutList>) {
        self.script(|script| script.lists.queue.push_back(Ok(lists)));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script(|script| script.calls.clone())
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| predicate(call)).count()
    }

    async fn reply<T: Clone>(
        &self,
        call: Call,
        pick: impl FnOnce(&mut Script) -> &mut Replies<T>,
    ) -> GatewayResult<T> {
        let (delay, reply) = self.script(|script| {
            script.calls.push(call);
            (script.delay, pick(script).next())
        });
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        reply
    }
}

impl<T> Replies<T> {
    pub fn fail(&mut self, message: &str) {
        self.queue.clear();
        self.fallback = Err(message.to_string());
    }

    pub fn push(&mut self, reply: Result<T, String>) {
        self.queue.push_back(reply);
    }

    pub fn set(&mut self, value: T) {
        self.queue.clear();
        self.fallback = Ok(value);
    }
}

impl RemoteGateway for ScriptedGateway {
    async fn get_user_profile(&self) -> GatewayResult<Profile> {
        self.reply(Call::Profile, |script| &mut script.profile).await
    }

    async fn get_dashboard_stats(&self) -> GatewayResult<DashboardStats> {
        self.reply(Call::Stats, |script| &mut script.stats).await
    }

    async fn get_weather(&self) -> GatewayResult<WeatherData> {
        self.reply(Call::Weather, |script| &mut script.weather).await
    }

    async fn get_branches(&self) -> GatewayResult<Vec<Branch>> {
        self.reply(Call::Branches, |script| &mut script.branches)
            .await
    }

    async fn get_calendar_events(&self) -> GatewayResult<Vec<CalendarEvent>> {
        self.reply(Call::Calendar, |script| &mut script.calendar)
            .await
    }

    async fn get_moveout_lists(&self) -> GatewayResult<Vec<MoveoutList>> {
        self.reply(Call::Lists, |script| &mut script.lists).await
    }

    async fn process_moveout_item(
        &self,
        list_id: &MoveoutListId,
        item_id: &str,
        quantity: u32,
        actor_name: &str,
    ) -> GatewayResult<()> {
        let call = Call::Process {
            list_id: list_id.to_string(),
            item_id: item_id.to_string(),
            quantity,
            actor: actor_name.to_string(),
        };
        self.reply(call, |script| &mut script.process).await
    }

    async fn create_moveout_list(
        &self,
        request: &CreateMoveoutListRequest,
    ) -> GatewayResult<CreatedList> {
        let call = Call::Create {
            lines: request.items.len(),
        };
        self.reply(call, |script| &mut script.create).await
    }

    async fn broadcast_notification(
        &self,
        notification: &BroadcastNotification,
    ) -> GatewayResult<()> {
        let call = Call::Broadcast {
            title: notification.title.clone(),
            message: notification.message.clone(),
        };
        self.reply(call, |script| &mut script.broadcast).await
    }
}

pub fn profile(role: &str) -> Profile {
    Profile {
        id: "u1".to_string(),
        name: "Ana".to_string(),
        email: Some("ana@example.com".to_string()),
        role: Role::from(role.to_string()),
        branch_id: Some("b1".to_string()),
        branch_name: None,
        branch_location: None,
    }
}

pub fn stats() -> DashboardStats {
    DashboardStats {
        total_items: 120,
        low_stock_items: 4,
        critical_stock_items: 1,
        threshold_stock_items: 2,
        total_staff: 9,
    }
}

pub fn weather() -> WeatherData {
    WeatherData {
        temperature: 4.5,
        condition: "Cloudy".to_string(),
        location: "Stockholm".to_string(),
        humidity: 80,
        wind_speed: 3.2,
    }
}

pub fn item(item_id: &str, done: bool) -> MoveoutItem {
    MoveoutItem {
        item_id: item_id.to_string(),
        item_name: format!("Item {item_id}"),
        request_amount: 2,
        available_amount: Some(10),
        completed: done,
        status: Some(if done { "completed" } else { "pending" }.to_string()),
        processed_by: done.then(|| "Ana".to_string()),
        processed_at: None,
    }
}

pub fn list(id: &str, status: &str, items: Vec<MoveoutItem>) -> MoveoutList {
    MoveoutList {
        id: MoveoutListId::new(id),
        title: Some(format!("List {id}")),
        description: None,
        created_at: Some("2024-03-01T08:00:00Z".to_string()),
        status: ListStatus::from(status.to_string()),
        items,
    }
}
