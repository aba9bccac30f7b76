mod backend;
mod error;
pub mod protocol;
mod registry;
mod rest;

pub use backend::SearchBackend;
pub use error::ClientError;
pub use protocol::{ScrollPage, SearchHit, SearchRequest};
pub use registry::BackendRegistry;
pub use rest::{HttpBackend, HttpBackendConfig};

#[cfg(feature = "memory")]
mod memory;

#[cfg(feature = "memory")]
pub use memory::MemoryBackend;
