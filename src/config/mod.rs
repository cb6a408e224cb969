//! Declarative analysis configuration

mod loader;
mod schema;
mod validate;

pub use loader::load_config;
pub use schema::AnalysisConfig;
pub use validate::{validate_config, ValidationError};
