pub mod client;

pub use client::{HttpSearchService, SearchBackend, ServiceError};
