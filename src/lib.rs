// Kagami image URL canonicalizer library

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod options;
pub mod pipeline;
pub mod proxy;
pub mod rewrite;
pub mod signature;
pub mod store;
pub mod uri;
