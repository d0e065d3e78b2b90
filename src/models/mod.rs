//! Data models for the CRM client.
//!
//! Field names follow the CRM API's JSON documents (`_id`, camelCase).

mod dashboard;
mod lead;
mod team;
mod theme;
mod user;

pub use dashboard::*;
pub use lead::*;
pub use team::*;
pub use theme::*;
pub use user::*;
