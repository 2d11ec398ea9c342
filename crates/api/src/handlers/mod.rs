//! Request handlers.
//!
//! Each submodule provides the async handler functions for one resource.
//! Handlers delegate persistence to the repositories in `jobbit_db` and map
//! failures through [`AppError`](crate::error::AppError).

pub mod category;
pub mod chat;
pub mod client;
pub mod executor;
pub mod executor_details;
pub mod geo;
pub mod notification;
pub mod oauth;
pub mod order;
pub mod profile;
pub mod storage;
pub mod token;
pub mod transactions;
pub mod users;
