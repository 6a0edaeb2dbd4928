//! Core domain for the knowledge-base question answering engine.
//!
//! Holds the topic taxonomy, the page-scoped Knowledge Store, the intent
//! classifier and search planner, and the capability traits the retrieval
//! strategies and model backends plug into.

pub mod builtin;
pub mod config;
pub mod error;
pub mod intent;
pub mod knowledge;
pub mod loader;
pub mod planner;
pub mod ranking;
pub mod taxonomy;
pub mod text;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
