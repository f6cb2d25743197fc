//! Data models for Stock Nexus

mod dashboard;
mod message;
mod moveout;
mod profile;

pub use dashboard::{upcoming_events, Branch, CalendarEvent, DashboardStats, WeatherData};
pub use message::ChatMessage;
pub use moveout::{
    CreateMoveoutListRequest, CreatedList, DraftLine, ListStatus, MoveoutItem,
    MoveoutItemRequest, MoveoutList, MoveoutListId,
};
pub use profile::{Profile, Role};
