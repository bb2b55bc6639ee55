pub mod config;
pub mod error;
pub mod roster;
pub mod utils;

#[cfg(feature = "web-interface")]
pub mod web;
