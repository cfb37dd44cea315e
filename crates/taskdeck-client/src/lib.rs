//! Client-side mirror of the taskdeck server: a typed HTTP client and a
//! session store that holds server-confirmed todos/statuses and derives the
//! filtered, sorted, and board views.

pub mod api;
pub mod store;

pub use api::{ApiClient, ClientError, TodoApi};
pub use store::{BoardGroup, ClientStore, FilterMode, Preferences, SortMode, Theme, ViewMode};
