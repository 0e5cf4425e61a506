use crate::adapters::csv_export::write_csv;
use crate::adapters::jsonl_store::JsonlStore;
use crate::domain::model::ContactMessage;
use crate::domain::ports::MessageStore;
use crate::utils::error::{AppError, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Read every message from a JSONL store and write it to `output` as CSV.
pub async fn export_csv(data_file: &Path, output: &Path) -> Result<usize> {
    if !tokio::fs::try_exists(data_file).await.unwrap_or(false) {
        return Err(AppError::InvalidConfigValueError {
            field: "data_file".to_string(),
            value: data_file.display().to_string(),
            reason: "Data file does not exist".to_string(),
        });
    }

    let store = JsonlStore::open(data_file).await?;
    let messages = store.list_contact_messages().await?;

    let target = output.to_path_buf();
    let rows = tokio::task::spawn_blocking(move || write_csv_file(&messages, &target))
        .await
        .map_err(|e| AppError::ServerError {
            message: format!("CSV export task failed: {e}"),
        })??;

    tracing::info!("📁 Exported {} messages to {}", rows, output.display());
    Ok(rows)
}

fn write_csv_file(messages: &[ContactMessage], output: &Path) -> Result<usize> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let writer = BufWriter::new(File::create(output)?);
    write_csv(messages, writer)
}
