//! Natural-language side of the pipeline: slot extraction and intent resolution.

pub mod extractor;
pub mod resolver;
