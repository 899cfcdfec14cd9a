pub mod config;
pub mod extraction;
pub mod models;
pub mod pipeline;
pub mod service;
pub mod tasks;
pub mod telemetry;
pub mod workflow;

pub use config::ServiceConfig;
pub use service::{AppState, build_router, create_app};
pub use workflow::build_diagnosis_pipeline;
pub use models::*;
