//! User-to-user messaging backend: users, messages fanned out to recipients,
//! and per-recipient read tracking over SQLite.

pub mod config;
pub mod db;
pub mod errors;
pub mod fanout;
pub mod identity;
pub mod models;
pub mod projector;
pub mod read_state;
pub mod routes;
