pub mod accumulate;
pub mod config;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod pipeline;
pub mod process;
pub mod schema;
pub mod store;

/// Olympedia athlete identifier, also the last path segment of the athlete page URL.
pub type AthleteId = u32;
