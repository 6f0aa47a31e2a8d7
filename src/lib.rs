//! dbxcli library
//!
//! Core functionality behind the `dbxcli` command line client.

pub mod commands;
pub mod core;
pub mod error;
pub mod utils;
