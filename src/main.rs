mod application;
mod domain;
mod infrastructure;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Registry};

use application::transfer_routine::TransferRoutine;
use domain::mapping::FieldMapping;
use domain::routine::Routine;
use infrastructure::caspio::api_client::CaspioApiClient;
use infrastructure::config::app_config::CONFIG;
use infrastructure::sheets::spreadsheet_manager::SpreadsheetManager;
use infrastructure::sheets::status_writer::SheetStatusWriter;
use infrastructure::sheets::worklist_source::SheetWorklistSource;

fn init_tracing() {
    let stdout_layer = tracing_subscriber::fmt::layer();

    Registry::default()
        .with(
            tracing_subscriber::filter::Targets::new()
                .with_target("sheet_caspio_sync", tracing::Level::TRACE)
                .with_default(tracing::Level::WARN),
        )
        .with(stdout_layer)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let sheets_config = CONFIG.sheets.clone();
    let status_column = CONFIG.transfer.status_column;

    // The reader and the status writer each authenticate and hold their own
    // handle; nothing is shared across pipeline phases.
    let reader_manager = match SpreadsheetManager::new(sheets_config.clone()).await {
        Ok(manager) => manager,
        Err(error) => {
            tracing::error!("❌ Google Sheets authentication failed: {error:?}");
            std::process::exit(1);
        }
    };
    let writer_manager = match SpreadsheetManager::new(sheets_config.clone()).await {
        Ok(manager) => manager,
        Err(error) => {
            tracing::error!("❌ Google Sheets authentication failed: {error:?}");
            std::process::exit(1);
        }
    };
    tracing::info!("✓ Google Sheets authentication successful");

    let routine = TransferRoutine::new(
        Arc::new(SheetWorklistSource::new(reader_manager, status_column)),
        Arc::new(CaspioApiClient::new(CONFIG.caspio.clone())),
        Arc::new(SheetStatusWriter::new(writer_manager, status_column)),
        FieldMapping::standard(),
        CONFIG.transfer.clone(),
    );

    match routine.run().await {
        Ok(summary) => {
            if summary.outcome() {
                tracing::info!("✅ {}: OK ({summary})", routine.name());
            } else {
                tracing::error!("❌ {}: no row was transferred ({summary})", routine.name());
                std::process::exit(1);
            }
        }
        Err(error) => {
            tracing::error!("❌ {}: {error:?}", routine.name());
            std::process::exit(1);
        }
    }
}
