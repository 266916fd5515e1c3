#[derive(serde::Deserialize, Debug, Clone)]
pub struct SpreadsheetConfig {
    /// Path to the Google service-account key JSON.
    #[serde(default = "default_priv_key")]
    pub priv_key: String,
    /// Full `docs.google.com` URL or a bare spreadsheet key.
    pub sheet_url: String,
    /// Worksheet to read and mark. Absent or not found falls back to the
    /// first worksheet.
    #[serde(default = "default_worksheet")]
    pub worksheet: Option<String>,
}

fn default_priv_key() -> String {
    "google-credentials.json".to_string()
}

fn default_worksheet() -> Option<String> {
    Some("Update".to_string())
}
