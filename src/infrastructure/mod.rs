pub mod caspio;
pub mod config;
pub mod sheets;
