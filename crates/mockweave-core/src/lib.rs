pub mod classify;
pub mod config;
pub mod detect;
pub mod error;
pub mod generate;
pub mod graph;
pub mod output;
pub mod schema;

// Re-export key types for convenience
pub use error::{MockWeaveError, Result};
pub use schema::types::{Field, Model, ModelMap};
