pub mod auth;
pub mod calendar;
pub mod comments;
pub mod config;
pub mod development;
pub mod garden;
pub mod maintenance;
pub mod social_events;
pub mod tasks;
