//! HTTP/JSON API server for contact list management.
//!
//! Exposes folder and list maintenance, contact association, deduplication,
//! export, and lock administration over a REST API. Every list mutation is
//! guarded by the per-list [`concurrency::LockManager`]; all business logic
//! flows through [`manager::ListManager`].

pub mod concurrency;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod index;
pub mod manager;
pub mod messages;
pub mod middleware;
pub mod router;
pub mod schema;
pub mod state;
