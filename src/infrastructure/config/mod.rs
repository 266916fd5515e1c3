pub mod app_config;
pub mod caspio_config;
pub mod sheets_config;
pub mod transfer_config;
