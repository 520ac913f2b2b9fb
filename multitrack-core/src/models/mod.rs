pub mod config;
pub mod error;
pub mod handles;
pub mod snapshot;
pub mod state;
pub mod track;
