//! JSON report files.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{PipelineError, PipelineResult};

/// Pretty-print `value` to `path`, creating parent directories as needed.
pub async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> PipelineResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| PipelineError::io(parent, e))?;
    }
    let body = serde_json::to_vec_pretty(value)?;
    tokio::fs::write(path, body)
        .await
        .map_err(|e| PipelineError::io(path, e))?;
    tracing::info!(path = %path.display(), "Report written");
    Ok(())
}

/// Read and deserialize a JSON file.
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> PipelineResult<T> {
    let body = tokio::fs::read(path)
        .await
        .map_err(|e| PipelineError::io(path, e))?;
    Ok(serde_json::from_slice(&body)?)
}
