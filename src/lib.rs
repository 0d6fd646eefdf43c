pub mod bookmarks;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod interactive;
pub mod render;
pub mod session;

pub use event_tracker_common as common;
