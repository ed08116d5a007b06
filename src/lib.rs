#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod providers;
pub mod resolve;
pub mod session;
pub mod utils;
pub mod version;
