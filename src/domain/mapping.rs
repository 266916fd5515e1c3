use std::collections::HashMap;

use thiserror::Error;

/// One source-column → target-field pair of the transfer mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    pub source_column: usize,
    pub target_field: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("mapped column {source_column} ({target_field}) is outside the header width {header_width}")]
    ColumnOutOfRange {
        source_column: usize,
        target_field: String,
        header_width: usize,
    },
}

/// Ordered list of column mappings from the worksheet layout to the Caspio
/// table fields. Validated against the observed header once per run, before
/// any record is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    entries: Vec<ColumnMapping>,
}

impl FieldMapping {
    pub fn new(entries: Vec<ColumnMapping>) -> Self {
        FieldMapping { entries }
    }

    /// The compiled-in mapping for the advertising-report worklist layout.
    pub fn standard() -> Self {
        const FIELDS: [&str; 19] = [
            "Advertiser_ID",
            "Advertiser_Name",
            "Campaign_ID",
            "Ad_Group_ID",
            "Ad_ID",
            "Campaign_Name",
            "Ad_Group_Name",
            "Ad_Name",
            "Total_Cost_Spend",
            "Day",
            "Reach",
            "Impressions",
            "Frequency",
            "CPM",
            "Button_Click",
            "CPC",
            "CTR_All",
            "Creative_Page_ID",
            "ChiNhanh",
        ];

        FieldMapping::new(
            FIELDS
                .iter()
                .enumerate()
                .map(|(source_column, target_field)| ColumnMapping {
                    source_column,
                    target_field: target_field.to_string(),
                })
                .collect(),
        )
    }

    /// Startup check that every mapped source column exists in the observed
    /// header, so a layout drift fails the run instead of silently dropping
    /// fields from every record.
    pub fn validate_against_header(&self, header: &[String]) -> Result<(), MappingError> {
        for entry in &self.entries {
            if entry.source_column >= header.len() {
                return Err(MappingError::ColumnOutOfRange {
                    source_column: entry.source_column,
                    target_field: entry.target_field.clone(),
                    header_width: header.len(),
                });
            }
        }
        Ok(())
    }

    /// Builds the named-field record for one row. Values are trimmed; mapped
    /// columns beyond the row's cell count are omitted, not errors.
    pub fn map_row(&self, cells: &[String]) -> HashMap<String, String> {
        let mut record = HashMap::with_capacity(self.entries.len());
        for entry in &self.entries {
            if let Some(value) = cells.get(entry.source_column) {
                record.insert(entry.target_field.clone(), value.trim().to_string());
            }
        }
        record
    }
}
