pub mod api;
pub mod config;
pub mod constants;
pub mod core;
pub mod infrastructure;

pub use crate::core::errors::RentSplitError;
pub use crate::core::services::RentSplitService;
pub use infrastructure::logging::in_memory::InMemoryActivityLog;
pub use infrastructure::storage::in_memory::InMemoryStorage;

#[cfg(test)]
mod tests; // Include integration tests
