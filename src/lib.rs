//! Website uptime monitor.
//!
//! A background poller re-checks every known site on a fixed interval while
//! an HTTP API serves the current UP/DOWN table and accepts new sites to
//! watch. Both sides share one [`state::StatusTable`].

pub mod api;
pub mod checker;
pub mod config;
pub mod models;
pub mod poller;
pub mod state;
