pub mod account;
pub mod apply;
pub mod backend;
pub mod detail;
pub mod home;
pub mod listing;
pub mod pagination;
pub mod postgrest;
pub mod query;
pub mod session;
