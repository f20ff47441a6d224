use super::{load_table, record_closure, write_documents};
use crate::core::closure::{operation_id_and_tags, prune};
use crate::core::examples::apply_examples;
use crate::core::overlays::{apply_extensions, apply_required};
use crate::core::tagging::{apply_tag_map, remove_paths_tagged};
use crate::core::{ConfigProvider, Pipeline, ServiceDocuments, SpecDocument, Storage, TransformResult};
use crate::domain::model::{ExampleMap, ExtensionMap, OutputDocument, RequiredMap, RunSummary, TagMap};
use crate::domain::ports::PublishSettings;
use crate::utils::error::{CombineError, Result};
use crate::utils::json::{join_path, spec_file_name};

/// 發佈結果的縮排
pub const PUBLISH_INDENT: usize = 2;

/// 讀取合併結果，依 tag 對照表整理後加上 required、範例與 extension，寫到 complete 目錄
pub struct PublishPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    settings: Option<PublishSettings>,
}

impl<S: Storage, C: ConfigProvider> PublishPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        let settings = config.publish();
        Self {
            storage,
            config,
            settings,
        }
    }

    fn settings(&self) -> Result<&PublishSettings> {
        self.settings
            .as_ref()
            .ok_or_else(|| CombineError::MissingConfigError {
                field: "publish".to_string(),
            })
    }

    fn source_path(&self, settings: &PublishSettings) -> String {
        join_path(self.config.merged_dir(), &spec_file_name(&settings.source))
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for PublishPipeline<S, C> {
    async fn extract(&self) -> Result<ServiceDocuments> {
        let settings = self.settings()?;
        let path = self.source_path(settings);
        if !self.storage.exists(&path).await {
            return Err(CombineError::MissingInputDocument {
                service: settings.source.clone(),
                path,
            });
        }

        let bytes = self.storage.read_file(&path).await?;
        let document = SpecDocument::from_slice(&path, &bytes)?;
        tracing::info!("📂 Publishing from {}", path);

        let mut documents = ServiceDocuments::new();
        documents.insert(settings.source.clone(), document);
        Ok(documents)
    }

    async fn transform(&self, mut documents: ServiceDocuments) -> Result<TransformResult> {
        let settings = self.settings()?;
        let mut document =
            documents
                .shift_remove(&settings.source)
                .ok_or_else(|| CombineError::StageError {
                    stage: "publish".to_string(),
                    details: format!("source document {} was not loaded", settings.source),
                })?;
        let mut summary = RunSummary {
            documents_loaded: 1,
            ..RunSummary::default()
        };

        document.set_title(&settings.title);

        let tag_map: TagMap = load_table(&self.storage, "tag map", &settings.tag_map).await?;
        let tagging = apply_tag_map(&mut document, &tag_map, &settings.unmapped_label)?;
        let removed = remove_paths_tagged(&mut document, &settings.unmapped_label);
        summary.paths_kept = tagging.mapped_paths;
        summary.paths_removed = removed.len();
        tracing::info!(
            "🔖 {} paths mapped to tags, {} unmapped paths removed",
            tagging.mapped_paths,
            removed.len()
        );

        let closure = prune(
            &mut document,
            operation_id_and_tags(&settings.segments, &settings.include_tags),
        )?;
        if self.config.strict_references() {
            closure.ensure_sound()?;
        }
        record_closure(&mut summary, &closure);

        if let Some(path) = &settings.required_map {
            let required: RequiredMap = load_table(&self.storage, "required map", path).await?;
            let report = apply_required(&mut document, &required);
            summary.required_applied = report.applied;
        }

        if let Some(path) = &settings.example_map {
            let examples: ExampleMap = load_table(&self.storage, "example map", path).await?;
            let report = apply_examples(&mut document, &examples);
            summary.examples_applied = report.applied();
        }

        if let Some(path) = &settings.extension_map {
            let extensions: ExtensionMap =
                load_table(&self.storage, "extension map", path).await?;
            let report = apply_extensions(&mut document, &extensions);
            summary.extensions_applied = report.applied;
        }

        Ok(TransformResult {
            documents: vec![OutputDocument {
                file_path: join_path(self.config.complete_dir(), &settings.output_file),
                document,
                indent: PUBLISH_INDENT,
            }],
            summary,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<Vec<String>> {
        write_documents(&self.storage, result.documents).await
    }

    fn name(&self) -> &str {
        "publish"
    }

    fn should_execute(&self) -> bool {
        self.settings.is_some()
    }
}
