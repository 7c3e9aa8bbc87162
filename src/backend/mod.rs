pub mod client;
pub mod traits;

pub use client::HttpBackend;
pub use traits::{AnalysisBackend, ForwardRequest};
