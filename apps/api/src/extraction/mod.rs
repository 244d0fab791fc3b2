pub mod handlers;
pub mod pipeline;

pub use pipeline::{DocumentExtractor, ExtractionReport};
