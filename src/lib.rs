pub mod cli;
pub mod client;
pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod models;
pub mod planning;
pub mod services;

pub use client::{HttpPlanningClient, PlanningApi};
pub use config::ApiConfig;
pub use error::AppError;
