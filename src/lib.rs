// Ballpark - Library root
//
// Service API key lifecycle, the HTTP gate in front of the player and league
// data API, the scheduled player sync, and the administrative CLI.

pub mod api_keys;
pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod jobs;
pub mod leagues;
pub mod players;
pub mod secret;
pub mod store;

pub use error::{ApiError, BallparkError};
