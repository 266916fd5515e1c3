#[derive(serde::Deserialize, Debug, Clone)]
pub struct CaspioConfig {
    /// Caspio account id; a full `https://{account}.caspio.com` URL is
    /// accepted and normalized.
    pub account_id: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_table_name")]
    pub table_name: String,
}

fn default_table_name() -> String {
    "dataQC".to_string()
}
