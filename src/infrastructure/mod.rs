pub mod chain;
pub mod content;
pub mod logging;
pub mod notifier;
pub mod payments;
pub mod storage;
