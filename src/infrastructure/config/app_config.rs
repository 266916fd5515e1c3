//! Configuration is read from an optional `Config.toml` file, overridden by
//! environment variables with a `__` section separator, e.g.
//! `SHEETS__SHEET_URL`, `SHEETS__WORKSHEET`, `CASPIO__ACCOUNT_ID`,
//! `CASPIO__CLIENT_ID`, `CASPIO__CLIENT_SECRET`, `CASPIO__TABLE_NAME`,
//! `TRANSFER__STATUS_COLUMN`.

use std::sync::LazyLock;

use config::Config;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub sheets: super::sheets_config::SpreadsheetConfig,
    pub caspio: super::caspio_config::CaspioConfig,
    #[serde(default)]
    pub transfer: super::transfer_config::TransferConfig,
}

pub static CONFIG: LazyLock<AppConfig> = LazyLock::new(|| {
    match Config::builder()
        .add_source(config::File::with_name("Config").required(false))
        .add_source(config::Environment::default().separator("__"))
        .build()
    {
        Ok(config) => config,
        Err(e) => match e {
            config::ConfigError::NotFound(property) => {
                panic!("Missing config property: {:?}", property);
            }
            _ => {
                panic!("Error reading config file: {:?}", e);
            }
        },
    }
    .try_deserialize()
    .expect("Should deserialize built config into struct")
});
