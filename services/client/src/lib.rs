pub mod adapters;
pub mod config;
pub mod error;
pub mod state;
pub mod sync;
