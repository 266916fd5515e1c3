use tracing::instrument;

use crate::domain::transfer::{TransferError, WorklistSource};
use crate::domain::worklist::{Worklist, WorklistRow};

use super::spreadsheet_manager::SpreadsheetManager;

/// Source Reader: reads the configured worksheet and keeps only the rows
/// whose status cell is blank.
pub struct SheetWorklistSource {
    manager: SpreadsheetManager,
    status_column: usize,
}

impl SheetWorklistSource {
    pub fn new(manager: SpreadsheetManager, status_column: usize) -> Self {
        SheetWorklistSource {
            manager,
            status_column,
        }
    }

    /// Splits raw worksheet values into header and eligible rows. Row
    /// numbers are 1-based worksheet positions, so data rows start at 2.
    pub fn worklist_from_values(values: Vec<Vec<String>>, status_column: usize) -> Worklist {
        let mut rows_iter = values.into_iter();
        let Some(header) = rows_iter.next() else {
            return Worklist::empty(status_column);
        };

        let rows = rows_iter
            .enumerate()
            .map(|(offset, cells)| {
                WorklistRow::new(offset as u32 + 2, cells, header.len(), status_column)
            })
            .filter(WorklistRow::is_eligible)
            .collect();

        Worklist {
            header,
            rows,
            status_column,
        }
    }
}

#[async_trait::async_trait]
impl WorklistSource for SheetWorklistSource {
    #[instrument(skip(self))]
    async fn fetch_eligible(&self) -> error_stack::Result<Worklist, TransferError> {
        let worksheet = self
            .manager
            .resolve_worksheet(self.manager.config.worksheet.as_deref())
            .await?;

        tracing::info!(worksheet = %worksheet, "📋 Reading worklist");
        let values = self.manager.read_all_values(&worksheet).await?;
        let worklist = Self::worklist_from_values(values, self.status_column);

        tracing::info!(eligible = worklist.rows.len(), "Worklist read");
        Ok(worklist)
    }
}
