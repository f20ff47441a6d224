use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// 執行單一 pipeline 的 extract → transform → load
pub struct SpecEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> SpecEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<Vec<String>> {
        tracing::info!("🚀 Starting pipeline: {}", self.pipeline.name());
        self.monitor.log_stats("start");

        // Extract
        let documents = self.pipeline.extract().await?;
        tracing::info!("📥 Loaded {} documents", documents.len());
        self.monitor.log_stats("extract");

        // Transform
        let result = self.pipeline.transform(documents).await?;
        tracing::info!(
            "🔄 Produced {} documents (paths kept: {}, schemas kept: {}, schemas removed: {})",
            result.documents.len(),
            result.summary.paths_kept,
            result.summary.schemas_kept,
            result.summary.schemas_removed
        );
        self.monitor.log_stats("transform");

        // Load
        let written = self.pipeline.load(result).await?;
        for path in &written {
            tracing::info!("💾 Written: {}", path);
        }
        self.monitor.log_stats("load");
        self.monitor.log_final_stats();

        Ok(written)
    }
}
