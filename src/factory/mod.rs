//! Bundles of a view model type, its context, and context-bound hooks.

mod create_model;

pub use create_model::{create_model, ModelKit};
