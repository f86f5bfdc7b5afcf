pub mod calendar_event;
pub mod comment;
pub mod development;
pub mod garden;
pub mod maintenance;
pub mod profile;
pub mod social_event;
pub mod task;
