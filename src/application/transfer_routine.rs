use std::sync::Arc;
use std::time::Duration;

use error_stack::report;
use tracing::instrument;

use crate::domain::mapping::FieldMapping;
use crate::domain::routine::{Routine, RoutineError};
use crate::domain::transfer::{
    RecordSink, StatusWriter, TransferReceipt, TransferSummary, WorklistSource,
};
use crate::domain::worklist::Worklist;
use crate::infrastructure::config::transfer_config::TransferConfig;

/// Courtesy pause between consecutive record posts, to avoid hammering the
/// sink API. Not a correctness requirement.
const RECORD_POST_DELAY: Duration = Duration::from_millis(100);

/// The whole pipeline: read eligible rows, map and push them one at a time,
/// then mark the successful ones back in the source.
pub struct TransferRoutine {
    source: Arc<dyn WorklistSource>,
    sink: Arc<dyn RecordSink>,
    status_writer: Arc<dyn StatusWriter>,
    mapping: FieldMapping,
    settings: TransferConfig,
}

impl TransferRoutine {
    pub fn new(
        source: Arc<dyn WorklistSource>,
        sink: Arc<dyn RecordSink>,
        status_writer: Arc<dyn StatusWriter>,
        mapping: FieldMapping,
        settings: TransferConfig,
    ) -> Self {
        TransferRoutine {
            source,
            sink,
            status_writer,
            mapping,
            settings,
        }
    }

    /// Fail-fast layout checks, run once per worklist before any record is
    /// sent: every mapped column must exist in the header, and the header
    /// label at the status column must be the configured one.
    fn validate_layout(&self, worklist: &Worklist) -> error_stack::Result<(), RoutineError> {
        self.mapping
            .validate_against_header(&worklist.header)
            .map_err(|error| report!(RoutineError::routine_failure(error.to_string())))?;

        let observed = worklist
            .header
            .get(self.settings.status_column)
            .map(|label| label.trim())
            .unwrap_or("");
        if !observed.eq_ignore_ascii_case(self.settings.status_header.trim()) {
            return Err(report!(RoutineError::routine_failure(format!(
                "status column {} header is {:?}, expected {:?}",
                self.settings.status_column, observed, self.settings.status_header
            ))));
        }
        Ok(())
    }

    async fn push_rows(&self, worklist: &Worklist) -> Vec<TransferReceipt> {
        let mut receipts = Vec::new();
        for row in &worklist.rows {
            let record = self.mapping.map_row(&row.cells);
            match self.sink.push_record(&record).await {
                Ok(response) => {
                    tracing::info!(row = row.row_number, "✅ Row transferred");
                    receipts.push(TransferReceipt {
                        row_number: row.row_number,
                        record,
                        response,
                        status_column: row.status_column,
                    });
                }
                Err(error) => {
                    tracing::error!(row = row.row_number, "❌ Transfer failed: {error:?}");
                }
            }
            tokio::time::sleep(RECORD_POST_DELAY).await;
        }
        receipts
    }
}

#[async_trait::async_trait]
impl Routine for TransferRoutine {
    type Output = TransferSummary;

    fn name(&self) -> &str {
        "Worklist Transfer"
    }

    #[instrument(skip(self), name = "TransferRoutine::run")]
    async fn run(&self) -> error_stack::Result<TransferSummary, RoutineError> {
        tracing::info!("🚀 Starting worklist transfer");

        self.sink.authenticate().await.map_err(|error| {
            tracing::error!("❌ Transfer aborted, sink authentication failed: {error:?}");
            report!(RoutineError::routine_failure("sink authentication failed"))
        })?;

        let worklist = match self.source.fetch_eligible().await {
            Ok(worklist) => worklist,
            Err(error) => {
                // Read-phase failures mean "nothing to do", not a run abort.
                tracing::error!("❌ Error reading worklist, nothing to transfer: {error:?}");
                return Ok(TransferSummary::default());
            }
        };

        if worklist.is_empty() {
            tracing::info!("ℹ️ No data to transfer (all rows already marked or sheet empty)");
            return Ok(TransferSummary::default());
        }

        self.validate_layout(&worklist)?;

        tracing::info!(rows = worklist.rows.len(), "🔄 Transferring rows to Caspio");
        let receipts = self.push_rows(&worklist).await;

        match self.status_writer.mark_transferred(&receipts).await {
            Ok(marked) => {
                if marked < receipts.len() {
                    tracing::warn!(
                        marked,
                        transferred = receipts.len(),
                        "Some transferred rows were not marked"
                    );
                }
            }
            Err(error) => {
                tracing::error!("❌ Status write-back failed: {error:?}");
            }
        }

        let summary = TransferSummary::new(worklist.rows.len(), receipts.len());
        tracing::info!("📈 Transfer summary: {summary}");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::domain::transfer::TransferError;
    use crate::infrastructure::sheets::worklist_source::SheetWorklistSource;

    const STATUS_COLUMN: usize = 19;

    struct FakeSource {
        values: Vec<Vec<String>>,
        fail: bool,
        calls: Mutex<usize>,
    }

    impl FakeSource {
        fn new(values: Vec<Vec<String>>) -> Self {
            FakeSource {
                values,
                fail: false,
                calls: Mutex::new(0),
            }
        }

        fn failing() -> Self {
            FakeSource {
                values: Vec::new(),
                fail: true,
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl WorklistSource for FakeSource {
        async fn fetch_eligible(&self) -> error_stack::Result<Worklist, TransferError> {
            *self.calls.lock().unwrap() += 1;
            if self.fail {
                return Err(report!(TransferError::Transport));
            }
            Ok(SheetWorklistSource::worklist_from_values(
                self.values.clone(),
                STATUS_COLUMN,
            ))
        }
    }

    struct FakeSink {
        fail_auth: bool,
        failing_calls: Vec<usize>,
        calls: Mutex<usize>,
        pushed: Mutex<Vec<HashMap<String, String>>>,
    }

    impl FakeSink {
        fn new() -> Self {
            FakeSink {
                fail_auth: false,
                failing_calls: Vec::new(),
                calls: Mutex::new(0),
                pushed: Mutex::new(Vec::new()),
            }
        }

        fn failing_auth() -> Self {
            FakeSink {
                fail_auth: true,
                ..FakeSink::new()
            }
        }

        fn failing_on(calls: Vec<usize>) -> Self {
            FakeSink {
                failing_calls: calls,
                ..FakeSink::new()
            }
        }
    }

    #[async_trait::async_trait]
    impl RecordSink for FakeSink {
        async fn authenticate(&self) -> error_stack::Result<(), TransferError> {
            if self.fail_auth {
                return Err(report!(TransferError::Authentication));
            }
            Ok(())
        }

        async fn push_record(
            &self,
            record: &HashMap<String, String>,
        ) -> error_stack::Result<serde_json::Value, TransferError> {
            let call = {
                let mut calls = self.calls.lock().unwrap();
                let current = *calls;
                *calls += 1;
                current
            };
            if self.failing_calls.contains(&call) {
                return Err(report!(TransferError::Transport)
                    .attach_printable("record create returned HTTP 500 Internal Server Error"));
            }
            self.pushed.lock().unwrap().push(record.clone());
            Ok(serde_json::json!({ "Result": "created" }))
        }
    }

    struct FakeStatusWriter {
        marked: Mutex<Vec<u32>>,
    }

    impl FakeStatusWriter {
        fn new() -> Self {
            FakeStatusWriter {
                marked: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl StatusWriter for FakeStatusWriter {
        async fn mark_transferred(
            &self,
            receipts: &[TransferReceipt],
        ) -> error_stack::Result<usize, TransferError> {
            let mut marked = self.marked.lock().unwrap();
            for receipt in receipts {
                marked.push(receipt.row_number);
            }
            Ok(receipts.len())
        }
    }

    fn header() -> Vec<String> {
        let mut header: Vec<String> = (0..STATUS_COLUMN).map(|i| format!("H{i}")).collect();
        header.push("TT Updata".to_string());
        header
    }

    fn data_row(id: &str, status: &str) -> Vec<String> {
        let mut cells = vec![id.to_string(), format!("  Advertiser {id}  ")];
        cells.resize(STATUS_COLUMN, String::new());
        cells.push(status.to_string());
        cells
    }

    fn routine(
        source: Arc<FakeSource>,
        sink: Arc<FakeSink>,
        status_writer: Arc<FakeStatusWriter>,
    ) -> TransferRoutine {
        TransferRoutine::new(
            source,
            sink,
            status_writer,
            FieldMapping::standard(),
            TransferConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_scenario_all_eligible_rows_transferred_and_marked() {
        let source = Arc::new(FakeSource::new(vec![
            header(),
            data_row("adv-1", ""),       // row 2: eligible
            data_row("adv-2", "Copied"), // row 3: already marked
            data_row("adv-3", ""),       // row 4: eligible
        ]));
        let sink = Arc::new(FakeSink::new());
        let status_writer = Arc::new(FakeStatusWriter::new());

        let summary = routine(source, sink.clone(), status_writer.clone())
            .run()
            .await
            .unwrap();

        assert_eq!(summary, TransferSummary::new(2, 2));
        assert!(summary.outcome());

        let pushed = sink.pushed.lock().unwrap();
        assert_eq!(pushed.len(), 2);
        assert_eq!(pushed[0].get("Advertiser_ID").map(String::as_str), Some("adv-1"));
        // Mapped values are trimmed.
        assert_eq!(
            pushed[0].get("Advertiser_Name").map(String::as_str),
            Some("Advertiser adv-1")
        );
        assert_eq!(pushed[0].len(), 19);

        assert_eq!(*status_writer.marked.lock().unwrap(), vec![2, 4]);
    }

    #[tokio::test]
    async fn test_scenario_partial_failure_marks_only_successful_rows() {
        let source = Arc::new(FakeSource::new(vec![
            header(),
            data_row("adv-1", ""),
            data_row("adv-2", ""),
        ]));
        let sink = Arc::new(FakeSink::failing_on(vec![1]));
        let status_writer = Arc::new(FakeStatusWriter::new());

        let summary = routine(source, sink, status_writer.clone())
            .run()
            .await
            .unwrap();

        assert_eq!(summary, TransferSummary::new(2, 1));
        assert!(summary.outcome());
        assert_eq!(*status_writer.marked.lock().unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn test_scenario_nothing_eligible_is_a_successful_noop() {
        let source = Arc::new(FakeSource::new(vec![
            header(),
            data_row("adv-1", "Copied"),
        ]));
        let sink = Arc::new(FakeSink::new());
        let status_writer = Arc::new(FakeStatusWriter::new());

        let summary = routine(source, sink.clone(), status_writer.clone())
            .run()
            .await
            .unwrap();

        assert_eq!(summary, TransferSummary::default());
        assert!(summary.outcome());
        assert!(sink.pushed.lock().unwrap().is_empty());
        assert!(status_writer.marked.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scenario_sink_auth_failure_aborts_before_source_read() {
        let source = Arc::new(FakeSource::new(vec![header(), data_row("adv-1", "")]));
        let sink = Arc::new(FakeSink::failing_auth());
        let status_writer = Arc::new(FakeStatusWriter::new());

        let result = routine(source.clone(), sink.clone(), status_writer)
            .run()
            .await;

        assert!(result.is_err());
        assert_eq!(*source.calls.lock().unwrap(), 0);
        assert!(sink.pushed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_source_failure_is_treated_as_nothing_to_do() {
        let source = Arc::new(FakeSource::failing());
        let sink = Arc::new(FakeSink::new());
        let status_writer = Arc::new(FakeStatusWriter::new());

        let summary = routine(source, sink.clone(), status_writer)
            .run()
            .await
            .unwrap();

        assert_eq!(summary, TransferSummary::default());
        assert!(summary.outcome());
        assert!(sink.pushed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unexpected_status_header_fails_the_run() {
        let mut bad_header = header();
        bad_header[STATUS_COLUMN] = "Notes".to_string();
        let source = Arc::new(FakeSource::new(vec![bad_header, data_row("adv-1", "")]));
        let sink = Arc::new(FakeSink::new());
        let status_writer = Arc::new(FakeStatusWriter::new());

        let result = routine(source, sink.clone(), status_writer).run().await;

        assert!(result.is_err());
        assert!(sink.pushed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_narrow_header_fails_mapping_validation() {
        // Header narrower than the mapped columns: fail fast, send nothing.
        let narrow: Vec<String> = (0..5).map(|i| format!("H{i}")).collect();
        let source = Arc::new(FakeSource::new(vec![narrow, vec!["a".to_string()]]));
        let sink = Arc::new(FakeSink::new());
        let status_writer = Arc::new(FakeStatusWriter::new());

        let result = routine(source, sink.clone(), status_writer).run().await;

        assert!(result.is_err());
        assert!(sink.pushed.lock().unwrap().is_empty());
    }
}
