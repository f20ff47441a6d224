use super::{load_services, narrow_to_segments, write_documents};
use crate::core::closure::operation_id_contains_any;
use crate::core::combine::combine;
use crate::core::dedupe::disambiguate;
use crate::core::operations::OperationIdRegistry;
use crate::core::overlays::apply_enum_rewrites;
use crate::core::{ConfigProvider, Pipeline, ServiceDocuments, Storage, TransformResult};
use crate::domain::model::{OutputDocument, RunSummary};
use crate::utils::error::Result;
use crate::utils::json::{join_path, spec_file_name};

/// 合併結果的縮排
pub const MERGED_INDENT: usize = 4;

/// 把所有服務合併成一份，依選定的 segment 過濾後寫到 merged 目錄
pub struct MergePipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> MergePipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    /// 輸出檔名（不含副檔名）：segment 轉小寫後以 `_` 串接
    pub fn output_stem(&self) -> String {
        merged_stem(self.config.segments())
    }
}

pub fn merged_stem(segments: &[String]) -> String {
    segments
        .iter()
        .map(|segment| segment.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for MergePipeline<S, C> {
    async fn extract(&self) -> Result<ServiceDocuments> {
        tracing::info!(
            "📂 Loading {} service specs from {}",
            self.config.services().len(),
            self.config.input_dir()
        );
        load_services(&self.storage, self.config.input_dir(), self.config.services()).await
    }

    async fn transform(&self, mut documents: ServiceDocuments) -> Result<TransformResult> {
        let mut summary = RunSummary {
            documents_loaded: documents.len(),
            ..RunSummary::default()
        };

        let renames = disambiguate(&mut documents)?;
        summary.renamed_components = renames.renames.len();
        if !renames.duplicated.is_empty() {
            tracing::info!(
                "🔀 {} conflicting component names qualified with service names",
                renames.duplicated.len()
            );
        }

        let mut combined = combine(&documents, &self.config.envelope());
        let rewritten = apply_enum_rewrites(&mut combined, self.config.enum_rewrites());
        if rewritten > 0 {
            tracing::debug!("🔤 Rewrote {} enum lists", rewritten);
        }

        let segments = self.config.segments();
        let mut registry = OperationIdRegistry::new();
        narrow_to_segments(
            &mut combined,
            segments,
            &mut registry,
            operation_id_contains_any(segments),
            self.config.strict_references(),
            &mut summary,
        )?;

        let stem = self.output_stem();
        combined.set_title(&stem);

        Ok(TransformResult {
            documents: vec![OutputDocument {
                file_path: join_path(self.config.merged_dir(), &spec_file_name(&stem)),
                document: combined,
                indent: MERGED_INDENT,
            }],
            summary,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<Vec<String>> {
        write_documents(&self.storage, result.documents).await
    }

    fn name(&self) -> &str {
        "merge"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipelines::testing::{MockConfig, MockStorage};
    use crate::utils::error::CombineError;
    use serde_json::json;

    async fn seed(storage: &MockStorage) {
        storage
            .put_json(
                "service/account.json",
                &json!({
                    "openapi": "3.0.1",
                    "paths": {
                        "/api/v1/customers": {"get": {
                            "operationId": "listCustomers",
                            "responses": {"200": {"content": {"*/*": {"schema": {
                                "type": "array", "items": {"$ref": "#/components/schemas/Customer"}
                            }}}}}
                        }},
                        "/api/admin/customers": {"get": {
                            "operationId": "adminCustomers",
                            "responses": {"200": {"content": {"*/*": {"schema": {"$ref": "#/components/schemas/AdminView"}}}}}
                        }}
                    },
                    "components": {"schemas": {
                        "Customer": {"type": "object", "properties": {"page": {"$ref": "#/components/schemas/Page"}}},
                        "Page": {"type": "object", "properties": {"size": {"type": "integer"}}},
                        "AdminView": {"type": "object"}
                    }}
                }),
            )
            .await;
        storage
            .put_json(
                "service/product.json",
                &json!({
                    "openapi": "3.0.1",
                    "paths": {
                        "/api/v1/products": {"get": {
                            "operationId": "listProducts",
                            "responses": {"200": {"content": {"*/*": {"schema": {"$ref": "#/components/schemas/Page"}}}}}
                        }},
                        "/api/v1/customers": {"post": {
                            "operationId": "listCustomers",
                            "requestBody": {"content": {"application/json": {"schema": {"$ref": "#/components/schemas/Status"}}}}
                        }}
                    },
                    "components": {"schemas": {
                        "Page": {"type": "object", "properties": {"cursor": {"type": "string"}}},
                        "Status": {"type": "string", "enum": ["갱신 결제", "단건 주문"]}
                    }}
                }),
            )
            .await;
    }

    #[tokio::test]
    async fn test_merge_end_to_end() {
        let storage = MockStorage::new();
        seed(&storage).await;
        let mut config = MockConfig::new(&["account", "product"], &["v1"]);
        config.enum_rewrites = vec![crate::domain::model::EnumRewrite {
            from: vec![json!("갱신 결제"), json!("단건 주문")],
            to: vec![json!("RECURRING"), json!("ONE_TIME")],
        }];
        let pipeline = MergePipeline::new(storage.clone(), config);

        let documents = pipeline.extract().await.unwrap();
        let result = pipeline.transform(documents).await.unwrap();
        assert_eq!(result.summary.documents_loaded, 2);
        assert_eq!(result.summary.renamed_components, 2);
        assert_eq!(result.summary.paths_removed, 1);
        let written = pipeline.load(result).await.unwrap();

        assert_eq!(written, vec!["merge/v1.json"]);
        let merged = storage.get_json("merge/v1.json").await.unwrap();
        assert_eq!(merged["info"]["title"], "v1");
        assert!(merged["paths"].get("/api/admin/customers").is_none());

        let customers = &merged["paths"]["/api/v1/customers"];
        assert_eq!(customers["get"]["operationId"], "v1_listCustomers");
        assert_eq!(customers["post"]["operationId"], "v1_listCustomers_2");
        assert_eq!(customers["get"]["tags"], json!(["customers"]));

        let names: Vec<&String> = merged["components"]["schemas"]
            .as_object()
            .unwrap()
            .keys()
            .collect();
        assert_eq!(names, vec!["Customer", "AccountPage", "Status", "ProductPage"]);
        assert_eq!(
            merged["components"]["schemas"]["Customer"]["properties"]["page"]["$ref"],
            "#/components/schemas/AccountPage"
        );
        assert_eq!(
            merged["components"]["schemas"]["Status"]["enum"],
            json!(["RECURRING", "ONE_TIME"])
        );
    }

    #[tokio::test]
    async fn test_merge_output_uses_four_space_indent() {
        let storage = MockStorage::new();
        seed(&storage).await;
        let pipeline = MergePipeline::new(
            storage.clone(),
            MockConfig::new(&["account", "product"], &["V1"]),
        );

        let documents = pipeline.extract().await.unwrap();
        let result = pipeline.transform(documents).await.unwrap();
        pipeline.load(result).await.unwrap();

        let text = storage.get_text("merge/v1.json").await.unwrap();
        assert!(text.starts_with("{\n    \"openapi\": \"3.0.1\""));
    }

    #[tokio::test]
    async fn test_missing_service_fails_before_merge() {
        let storage = MockStorage::new();
        seed(&storage).await;
        let pipeline = MergePipeline::new(
            storage,
            MockConfig::new(&["account", "payment", "product"], &["all"]),
        );

        let err = pipeline.extract().await.unwrap_err();

        match err {
            CombineError::MissingInputDocument { service, path } => {
                assert_eq!(service, "payment");
                assert_eq!(path, "service/payment.json");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_strict_references_reject_dangling() {
        let storage = MockStorage::new();
        storage
            .put_json(
                "service/account.json",
                &json!({"paths": {"/api/v1/a": {"get": {
                    "operationId": "a",
                    "parameters": [{"schema": {"$ref": "#/components/schemas/Gone"}}]
                }}}}),
            )
            .await;
        let mut config = MockConfig::new(&["account"], &["v1"]);
        config.strict = true;
        let pipeline = MergePipeline::new(storage, config);

        let documents = pipeline.extract().await.unwrap();
        let err = pipeline.transform(documents).await.unwrap_err();

        assert!(matches!(err, CombineError::DanglingReferences { .. }));
    }

    #[test]
    fn test_merged_stem() {
        assert_eq!(merged_stem(&["V1".to_string()]), "v1");
        assert_eq!(merged_stem(&["v1".to_string(), "Admin".to_string()]), "v1_admin");
    }
}
