use crate::core::Pipeline;
use crate::domain::model::RunSummary;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Pipeline 執行結果
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub pipeline_name: String,
    pub output_paths: Vec<String>,
    pub summary: RunSummary,
    pub duration: Duration,
}

/// Pipeline 序列，依加入順序執行，任何一個失敗就停止
pub struct PipelineSequence {
    pipelines: Vec<Box<dyn Pipeline>>,
    monitor: Option<SystemMonitor>,
    execution_id: String,
}

impl PipelineSequence {
    pub fn new(execution_id: String) -> Self {
        Self {
            pipelines: Vec::new(),
            monitor: None,
            execution_id,
        }
    }

    /// 啟用或禁用系統監控
    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor = enabled.then(|| SystemMonitor::new(true));
        self
    }

    pub fn add_pipeline(&mut self, pipeline: Box<dyn Pipeline>) {
        self.pipelines.push(pipeline);
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    /// 執行所有 pipeline
    pub async fn execute_all(&self) -> Result<Vec<PipelineResult>> {
        let mut results = Vec::new();
        tracing::info!(
            "🚀 Running {} pipelines ({})",
            self.pipelines.len(),
            self.execution_id
        );

        if let Some(monitor) = &self.monitor {
            monitor.log_stats("Pipeline execution started.");
        }

        for pipeline in &self.pipelines {
            if !pipeline.should_execute() {
                tracing::info!("⏭️ Skipping pipeline: {} (condition not met)", pipeline.name());
                continue;
            }

            let start_time = Instant::now();
            match Self::execute_pipeline(pipeline.as_ref()).await {
                Ok((output_paths, summary)) => {
                    let result = PipelineResult {
                        pipeline_name: pipeline.name().to_string(),
                        output_paths,
                        summary,
                        duration: start_time.elapsed(),
                    };

                    tracing::info!(
                        "✅ Pipeline executed: {} (files: {}, duration: {:?})",
                        result.pipeline_name,
                        result.output_paths.len(),
                        result.duration
                    );
                    if let Some(monitor) = &self.monitor {
                        monitor.log_stats(&result.pipeline_name);
                    }
                    results.push(result);
                }
                Err(e) => {
                    tracing::error!("❌ Pipeline {} failed: {}", pipeline.name(), e);
                    return Err(e);
                }
            }
        }

        if let Some(monitor) = &self.monitor {
            monitor.log_final_stats();
        }

        Ok(results)
    }

    async fn execute_pipeline(pipeline: &dyn Pipeline) -> Result<(Vec<String>, RunSummary)> {
        let documents = pipeline.extract().await?;
        tracing::debug!("📥 {}: loaded {} documents", pipeline.name(), documents.len());

        let result = pipeline.transform(documents).await?;
        tracing::debug!(
            "🔄 {}: produced {} documents",
            pipeline.name(),
            result.documents.len()
        );

        let summary = result.summary.clone();
        let output_paths = pipeline.load(result).await?;
        Ok((output_paths, summary))
    }

    /// 獲取執行摘要
    pub fn get_execution_summary(results: &[PipelineResult]) -> HashMap<String, serde_json::Value> {
        let mut summary = HashMap::new();

        let total_files: usize = results.iter().map(|r| r.output_paths.len()).sum();
        let total_duration: Duration = results.iter().map(|r| r.duration).sum();
        let dangling: usize = results
            .iter()
            .map(|r| r.summary.dangling_references.len())
            .sum();

        summary.insert("total_pipelines".to_string(), results.len().into());
        summary.insert("total_files".to_string(), total_files.into());
        summary.insert(
            "total_duration_ms".to_string(),
            (total_duration.as_millis() as u64).into(),
        );
        summary.insert("dangling_references".to_string(), dangling.into());

        let pipeline_names: Vec<serde_json::Value> = results
            .iter()
            .map(|r| serde_json::Value::String(r.pipeline_name.clone()))
            .collect();
        summary.insert(
            "executed_pipelines".to_string(),
            serde_json::Value::Array(pipeline_names),
        );

        summary
    }
}
