//! campaign-service: campaign invoice tracking with profit dashboards and
//! spreadsheet import/export.

pub mod config;
pub mod dashboard;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

pub use startup::{AppState, Application};
