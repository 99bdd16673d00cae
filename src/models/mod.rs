pub mod application;
pub mod filters;
pub mod job;
pub mod profile;
