//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod category;
pub mod chat;
pub mod executor;
pub mod feedback;
pub mod geo;
pub mod notification;
pub mod order;
pub mod profile;
pub mod session;
pub mod transaction;
pub mod user;
pub mod verification;
