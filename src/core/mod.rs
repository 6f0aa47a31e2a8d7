pub mod client;
pub mod config;
pub mod download;
pub mod dropbox;
pub mod listing;
pub mod path;
pub mod plan;
pub mod progress;
