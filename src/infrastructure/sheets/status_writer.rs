use std::time::Duration;

use error_stack::report;
use tracing::instrument;

use crate::domain::sheets::{cell_position::CellPosition, column::Column};
use crate::domain::transfer::{StatusWriter, TransferError, TransferReceipt, STATUS_MARKER};

use super::spreadsheet_manager::SpreadsheetManager;

const STATUS_WRITE_DELAY: Duration = Duration::from_millis(500);

/// Status Writer: marks transferred rows in the source worksheet. Owns its
/// own `SpreadsheetManager`; the reader's handle is never reused here.
pub struct SheetStatusWriter {
    manager: SpreadsheetManager,
    status_column: usize,
}

impl SheetStatusWriter {
    pub fn new(manager: SpreadsheetManager, status_column: usize) -> Self {
        SheetStatusWriter {
            manager,
            status_column,
        }
    }
}

/// Consistency guard: a receipt must carry the same status column the run
/// was configured with. Unreachable when receipts come from this run's own
/// reader, but a mismatch must never be written through.
fn check_status_column(
    receipt: &TransferReceipt,
    expected: usize,
) -> error_stack::Result<(), TransferError> {
    if receipt.status_column != expected {
        return Err(report!(TransferError::OutOfRangeWrite).attach_printable(format!(
            "row {} carries status column {}, run is configured for {}",
            receipt.row_number, receipt.status_column, expected
        )));
    }
    Ok(())
}

#[async_trait::async_trait]
impl StatusWriter for SheetStatusWriter {
    #[instrument(skip(self, receipts))]
    async fn mark_transferred(
        &self,
        receipts: &[TransferReceipt],
    ) -> error_stack::Result<usize, TransferError> {
        if receipts.is_empty() {
            tracing::info!("No successful transfers to mark in the worksheet");
            return Ok(0);
        }

        let worksheet = self
            .manager
            .resolve_worksheet(self.manager.config.worksheet.as_deref())
            .await?;

        let mut marked = 0;
        for receipt in receipts {
            if let Err(error) = check_status_column(receipt, self.status_column) {
                tracing::error!(row = receipt.row_number, "❌ Skipping status write: {error:?}");
                continue;
            }

            // 0-based index to the sheet's 1-based column numbering.
            let position = CellPosition {
                col: Column::from(receipt.status_column as u32 + 1),
                row: receipt.row_number,
            };

            match self
                .manager
                .write_cell(&worksheet, position, STATUS_MARKER)
                .await
            {
                Ok(()) => {
                    tracing::info!(
                        row = receipt.row_number,
                        column = %position.col,
                        "✅ Row marked as {:?}",
                        STATUS_MARKER
                    );
                    marked += 1;
                }
                Err(error) => {
                    tracing::error!(row = receipt.row_number, "❌ Status write failed: {error:?}");
                }
            }

            tokio::time::sleep(STATUS_WRITE_DELAY).await;
        }

        tracing::info!(marked, total = receipts.len(), "Status write-back finished");
        Ok(marked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn receipt(status_column: usize) -> TransferReceipt {
        TransferReceipt {
            row_number: 2,
            record: HashMap::new(),
            response: serde_json::Value::Null,
            status_column,
        }
    }

    #[test]
    fn test_guard_accepts_matching_column() {
        assert!(check_status_column(&receipt(19), 19).is_ok());
    }

    #[test]
    fn test_guard_rejects_mismatched_column() {
        let report = check_status_column(&receipt(7), 19).unwrap_err();
        assert_eq!(
            report.current_context(),
            &TransferError::OutOfRangeWrite
        );
    }
}
