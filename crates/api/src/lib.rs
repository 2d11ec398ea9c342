//! Jobbit marketplace HTTP API.
//!
//! Library half of the `jobbit-api` crate: everything except the process
//! entry points lives here so integration tests can build the exact router
//! that `main.rs` serves.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod messaging;
pub mod middleware;
pub mod oauth;
pub mod payments;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
pub mod storage;
