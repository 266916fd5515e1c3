pub mod auth;
pub mod http_client;
pub mod spreadsheet_manager;
pub mod status_writer;
pub mod value_range_factory;
pub mod worklist_source;
