//! nexus-core - Core library for Stock Nexus
//!
//! This crate contains the client-side data-freshness and synchronization
//! engine behind the warehouse dashboard and the moveout list workflow, plus
//! the chat typing/auto-scroll state machines. Screens are thin consumers of
//! the state holders exposed here.

pub mod cache;
pub mod chat;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetch;
pub mod gateway;
pub mod models;
pub mod moveout;
pub mod notice;
pub mod plan;
pub mod state;
pub mod util;

pub use error::{Error, Result};
pub use gateway::{GatewayError, GatewayResult, HttpGateway, RemoteGateway};
pub use models::{MoveoutList, MoveoutListId, Profile, Role};
