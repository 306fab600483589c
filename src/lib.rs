//! Library exports for shelfclient, shared between the binary and tests.

pub mod api;
pub mod client;
pub mod config;
pub mod models;
pub mod router;
pub mod startup;
pub mod state;
pub mod store;
pub mod toast;
pub mod utils;
