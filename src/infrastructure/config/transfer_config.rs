#[derive(serde::Deserialize, Debug, Clone)]
pub struct TransferConfig {
    /// 0-based index of the status column in the worksheet.
    #[serde(default = "default_status_column")]
    pub status_column: usize,
    /// Header label expected at `status_column`; checked once per run before
    /// any record is sent.
    #[serde(default = "default_status_header")]
    pub status_header: String,
}

impl Default for TransferConfig {
    fn default() -> Self {
        TransferConfig {
            status_column: default_status_column(),
            status_header: default_status_header(),
        }
    }
}

fn default_status_column() -> usize {
    19
}

fn default_status_header() -> String {
    "TT Updata".to_string()
}
