pub mod api;
pub mod cache;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod media;
pub mod models;
pub mod pipeline;
pub mod submission;
pub mod transform;
pub mod validation;

#[cfg(test)]
mod testing;

pub use error::{DashboardError, Result};
