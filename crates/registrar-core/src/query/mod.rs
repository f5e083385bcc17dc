//! Query side of the pipeline: templates, the safety gate, caching and execution.

pub mod cache;
pub mod engine;
pub mod executor;
pub mod safety;
pub mod template;
