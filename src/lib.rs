//! Townsquare client library crate.

pub mod app;
pub mod asset;
pub mod avatar;
pub mod camera;
pub mod client;
pub mod config;
pub mod constants;
pub mod direction;
pub mod error;
pub mod events;
pub mod formatter;
pub mod input;
pub mod logging;
pub mod movement;
pub mod net;
pub mod render;
pub mod store;
