use super::{load_services, narrow_to_segments, write_documents};
use crate::core::closure::operation_id_contains_any;
use crate::core::operations::OperationIdRegistry;
use crate::core::overlays::apply_enum_rewrites;
use crate::core::{ConfigProvider, Pipeline, ServiceDocuments, Storage, TransformResult};
use crate::domain::model::{OutputDocument, RunSummary};
use crate::utils::error::Result;
use crate::utils::json::{join_path, spec_file_name};

pub const GATEWAY_INDENT: usize = 4;

/// 為 API gateway 產生每個服務各自的文件，不做跨服務合併
pub struct GatewayPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> GatewayPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    /// 同時出現在選定 segment 與 gateway segment 中的 segment（依選定順序）
    pub fn gateway_segments(&self) -> Vec<&String> {
        let gateway = self.config.gateway_segments();
        self.config
            .segments()
            .iter()
            .filter(|segment| {
                gateway
                    .iter()
                    .any(|candidate| candidate.eq_ignore_ascii_case(segment))
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for GatewayPipeline<S, C> {
    async fn extract(&self) -> Result<ServiceDocuments> {
        load_services(&self.storage, self.config.input_dir(), self.config.services()).await
    }

    async fn transform(&self, documents: ServiceDocuments) -> Result<TransformResult> {
        let mut summary = RunSummary {
            documents_loaded: documents.len(),
            ..RunSummary::default()
        };
        let mut outputs = Vec::new();

        for segment in self.gateway_segments() {
            let segments = std::slice::from_ref(segment);
            for (service, document) in &documents {
                let mut document = document.clone();
                apply_enum_rewrites(&mut document, self.config.enum_rewrites());

                // 每個服務各自保證 operationId 唯一
                let mut registry = OperationIdRegistry::new();
                narrow_to_segments(
                    &mut document,
                    segments,
                    &mut registry,
                    operation_id_contains_any(segments),
                    self.config.strict_references(),
                    &mut summary,
                )?;

                let stem = format!("{}_{}", segment, service).to_lowercase();
                document.set_title(&stem);
                tracing::debug!("🚪 Gateway spec {} has {} operations", stem, registry.len());

                outputs.push(OutputDocument {
                    file_path: join_path(self.config.gateway_dir(), &spec_file_name(&stem)),
                    document,
                    indent: GATEWAY_INDENT,
                });
            }
        }

        Ok(TransformResult {
            documents: outputs,
            summary,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<Vec<String>> {
        write_documents(&self.storage, result.documents).await
    }

    fn name(&self) -> &str {
        "gateway"
    }

    fn should_execute(&self) -> bool {
        !self.gateway_segments().is_empty()
    }
}
