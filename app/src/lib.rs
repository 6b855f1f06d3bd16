pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod notifier;
pub mod persistence;
pub mod scheduler;
pub mod state;
pub mod store;
pub mod utils;
