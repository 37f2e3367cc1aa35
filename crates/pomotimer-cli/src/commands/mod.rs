pub mod config;
pub mod format;
pub mod history;
pub mod timer;
