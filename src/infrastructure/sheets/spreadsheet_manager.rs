use std::sync::LazyLock;

use error_stack::{report, ResultExt};
use google_sheets4::{api::ValueRange, Sheets};
use regex::Regex;
use serde_json::Value;
use tracing::instrument;

use crate::domain::sheets::{a1_notation::ToA1Notation, cell_position::CellPosition};
use crate::domain::transfer::TransferError;
use crate::infrastructure::config::sheets_config::SpreadsheetConfig;

use super::value_range_factory::ValueRangeFactory;
use super::{auth, http_client};

static SHEET_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/spreadsheets/d/([A-Za-z0-9_-]+)").unwrap());

/// Extracts the spreadsheet id from a full docs.google.com URL; anything
/// else is treated as a bare key.
pub fn spreadsheet_id_from(reference: &str) -> String {
    if reference.contains("docs.google.com") {
        if let Some(captures) = SHEET_URL_RE.captures(reference) {
            return captures[1].to_owned();
        }
    }
    reference.to_owned()
}

fn json_cell_to_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Thin wrapper over the Sheets hub, scoped to one spreadsheet. The reader
/// and the status writer each hold their own instance; no handle is shared
/// across pipeline phases.
pub struct SpreadsheetManager {
    pub config: SpreadsheetConfig,
    hub: Sheets<
        google_sheets4::hyper_rustls::HttpsConnector<google_sheets4::hyper::client::HttpConnector>,
    >,
    spreadsheet_id: String,
}

impl SpreadsheetManager {
    pub async fn new(config: SpreadsheetConfig) -> error_stack::Result<Self, TransferError> {
        let client = http_client::http_client();
        let auth = auth::auth(&config, client.clone()).await?;
        let hub = Sheets::new(client.clone(), auth);
        let spreadsheet_id = spreadsheet_id_from(&config.sheet_url);

        Ok(SpreadsheetManager {
            config,
            hub,
            spreadsheet_id,
        })
    }

    async fn worksheet_titles(&self) -> error_stack::Result<Vec<String>, TransferError> {
        let response = self
            .hub
            .spreadsheets()
            .get(&self.spreadsheet_id)
            .doit()
            .await
            .change_context(TransferError::Transport)
            .attach_printable_lazy(|| format!("spreadsheet: {}", self.spreadsheet_id))?;

        let sheets = response
            .1
            .sheets
            .ok_or_else(|| report!(TransferError::MalformedResponse))
            .attach_printable("spreadsheet metadata carries no worksheets")?;

        Ok(sheets
            .into_iter()
            .filter_map(|sheet| sheet.properties.and_then(|props| props.title))
            .collect())
    }

    /// Resolves the configured worksheet name, falling back to the first
    /// worksheet when the name is absent or unknown.
    #[instrument(skip(self))]
    pub async fn resolve_worksheet(
        &self,
        name: Option<&str>,
    ) -> error_stack::Result<String, TransferError> {
        let titles = self.worksheet_titles().await?;
        let first = titles
            .first()
            .cloned()
            .ok_or_else(|| report!(TransferError::MalformedResponse))
            .attach_printable("spreadsheet has no worksheets")?;

        match name {
            Some(name) if !name.is_empty() => {
                if titles.iter().any(|title| title == name) {
                    Ok(name.to_owned())
                } else {
                    tracing::warn!(
                        worksheet = name,
                        fallback = %first,
                        "❌ Worksheet not found, using first worksheet"
                    );
                    Ok(first)
                }
            }
            _ => {
                tracing::info!(worksheet = %first, "Using first worksheet");
                Ok(first)
            }
        }
    }

    /// Reads the whole worksheet as raw string cells, rows in sheet order.
    #[instrument(skip(self))]
    pub async fn read_all_values(
        &self,
        worksheet: &str,
    ) -> error_stack::Result<Vec<Vec<String>>, TransferError> {
        let response = self
            .hub
            .spreadsheets()
            .values_get(&self.spreadsheet_id, &format!("'{}'", worksheet))
            .doit()
            .await
            .change_context(TransferError::Transport)
            .attach_printable_lazy(|| format!("worksheet: {}", worksheet))?;

        let values = response.1.values.unwrap_or_default();
        Ok(values
            .into_iter()
            .map(|row| row.into_iter().map(json_cell_to_string).collect())
            .collect())
    }

    #[instrument(skip(self, value))]
    pub async fn write_cell(
        &self,
        worksheet: &str,
        position: CellPosition,
        value: &str,
    ) -> error_stack::Result<(), TransferError> {
        let range = position.to_a1_notation(Some(worksheet));
        self.hub
            .spreadsheets()
            .values_update(
                ValueRange::from_single_cell(value),
                &self.spreadsheet_id,
                range.as_ref(),
            )
            .value_input_option("USER_ENTERED")
            .doit()
            .await
            .map(|_| ())
            .change_context(TransferError::Transport)
            .attach_printable_lazy(|| format!("cell: {}", range))
    }
}
