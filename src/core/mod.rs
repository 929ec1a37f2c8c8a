pub mod errors;
pub mod models;
pub mod scheduler;
pub mod services;
pub mod wallet;
