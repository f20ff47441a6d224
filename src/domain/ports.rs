use crate::core::combine::Envelope;
use crate::domain::model::{EnumRewrite, ServiceDocuments, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self, path: &str) -> impl std::future::Future<Output = bool> + Send;
}

/// 發佈階段的設定
#[derive(Debug, Clone, PartialEq)]
pub struct PublishSettings {
    pub source: String,
    pub title: String,
    pub segments: Vec<String>,
    pub include_tags: Vec<String>,
    pub unmapped_label: String,
    pub tag_map: String,
    pub required_map: Option<String>,
    pub example_map: Option<String>,
    pub extension_map: Option<String>,
    pub output_file: String,
}

pub trait ConfigProvider: Send + Sync {
    fn input_dir(&self) -> &str;
    fn services(&self) -> &[String];
    fn segments(&self) -> &[String];
    fn gateway_segments(&self) -> &[String];
    fn merged_dir(&self) -> &str;
    fn gateway_dir(&self) -> &str;
    fn complete_dir(&self) -> &str;
    fn envelope(&self) -> Envelope;
    fn enum_rewrites(&self) -> &[EnumRewrite];
    fn strict_references(&self) -> bool;
    fn publish(&self) -> Option<PublishSettings>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ServiceDocuments>;
    async fn transform(&self, documents: ServiceDocuments) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<Vec<String>>;

    fn name(&self) -> &str;

    /// 依設定決定是否執行
    fn should_execute(&self) -> bool {
        true
    }
}
