//! 具體的 pipeline 與它們共用的讀寫輔助函式。

pub mod gateway_pipeline;
pub mod merge_pipeline;
pub mod publish_pipeline;
pub mod sequence_pipeline;

use crate::core::closure::{prune, ClosureReport};
use crate::core::operations::{filter_and_retag, FilterReport, OperationIdRegistry};
use crate::core::Storage;
use crate::domain::model::{OperationRef, OutputDocument, RunSummary, ServiceDocuments, SpecDocument};
use crate::utils::error::{CombineError, Result};
use crate::utils::json::{join_path, spec_file_name, to_pretty_json};
use serde::de::DeserializeOwned;

pub use gateway_pipeline::GatewayPipeline;
pub use merge_pipeline::MergePipeline;
pub use publish_pipeline::PublishPipeline;
pub use sequence_pipeline::{PipelineResult, PipelineSequence};

/// 依序讀入每個服務的文件，缺少任何一個就中止
pub(crate) async fn load_services<S: Storage>(
    storage: &S,
    input_dir: &str,
    services: &[String],
) -> Result<ServiceDocuments> {
    let mut documents = ServiceDocuments::new();

    for service in services {
        let path = join_path(input_dir, &spec_file_name(service));
        if !storage.exists(&path).await {
            tracing::error!("❌ Missing spec for service {} at {}", service, path);
            return Err(CombineError::MissingInputDocument {
                service: service.clone(),
                path,
            });
        }

        let bytes = storage.read_file(&path).await?;
        let document = SpecDocument::from_slice(&path, &bytes)?;
        tracing::debug!(
            "📄 Loaded {}: {} paths, {} schemas",
            service,
            document.paths().map_or(0, |paths| paths.len()),
            document.schema_names().len()
        );
        documents.insert(service.clone(), document);
    }

    Ok(documents)
}

/// 讀取外部對照表（tag map、example map …）
pub(crate) async fn load_table<S: Storage, T: DeserializeOwned>(
    storage: &S,
    label: &str,
    path: &str,
) -> Result<T> {
    if !storage.exists(path).await {
        return Err(CombineError::MissingInputDocument {
            service: label.to_string(),
            path: path.to_string(),
        });
    }
    let bytes = storage.read_file(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// 依 segment 過濾 path 並刪除無法到達的 schema，結果累計到 `summary`
pub(crate) fn narrow_to_segments<F>(
    document: &mut SpecDocument,
    segments: &[String],
    registry: &mut OperationIdRegistry,
    keep: F,
    strict: bool,
    summary: &mut RunSummary,
) -> Result<(FilterReport, ClosureReport)>
where
    F: Fn(&OperationRef<'_>) -> bool,
{
    let filter = filter_and_retag(document, segments, registry)?;
    let closure = prune(document, keep)?;
    if strict {
        closure.ensure_sound()?;
    }
    record(summary, &filter, &closure);
    Ok((filter, closure))
}

pub(crate) fn record(summary: &mut RunSummary, filter: &FilterReport, closure: &ClosureReport) {
    summary.paths_kept += filter.kept_paths;
    summary.paths_removed += filter.removed_paths.len();
    record_closure(summary, closure);
}

pub(crate) fn record_closure(summary: &mut RunSummary, closure: &ClosureReport) {
    summary.paths_kept = summary.paths_kept.saturating_sub(closure.removed_paths.len());
    summary.paths_removed += closure.removed_paths.len();
    summary.schemas_kept += closure.kept.len();
    summary.schemas_removed += closure.removed.len();
    summary
        .dangling_references
        .extend(closure.dangling.iter().cloned());
    summary
        .dangling_references
        .extend(closure.malformed.iter().cloned());
}

/// 寫出所有文件，回傳寫出的路徑
pub(crate) async fn write_documents<S: Storage>(
    storage: &S,
    documents: Vec<OutputDocument>,
) -> Result<Vec<String>> {
    let mut written = Vec::with_capacity(documents.len());
    for output in documents {
        let bytes = to_pretty_json(&output.document, output.indent)?;
        storage
            .write_file(&output.file_path, &bytes)
            .await
            .map_err(|e| CombineError::StageError {
                stage: "load".to_string(),
                details: format!("failed to write {}: {}", output.file_path, e),
            })?;
        tracing::debug!("💾 Wrote {} ({} bytes)", output.file_path, bytes.len());
        written.push(output.file_path);
    }
    Ok(written)
}
