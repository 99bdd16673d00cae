//! Job board service
//!
//! Browse, search and apply for jobs stored in a hosted Supabase project.
//! The crate owns the listing filter state, query composition, pagination
//! and fetch logic, and exposes the board's views over HTTP.

pub mod app_state;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
