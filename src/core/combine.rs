//! 把多個服務文件合併成一份。

use crate::domain::model::{ServiceDocuments, SpecDocument};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const OPENAPI_VERSION: &str = "3.0.1";

/// 合併結果固定的外殼（標題、伺服器、共用的 header 認證）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Envelope {
    pub title: String,
    pub version: String,
    pub server_url: String,
    pub server_description: String,
    /// 設定時加入 apiKey（header）型態的 security scheme，值為 header 名稱
    pub security_header: Option<String>,
    pub security_scheme: String,
}

fn default_security_scheme() -> String {
    "apiKey".to_string()
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            title: "Combined API".to_string(),
            version: "1.0".to_string(),
            server_url: "https://api.example.com".to_string(),
            server_description: "Generated server url".to_string(),
            security_header: None,
            security_scheme: default_security_scheme(),
        }
    }
}

impl Envelope {
    /// 產生空的合併文件
    pub fn document(&self) -> SpecDocument {
        let mut root = Map::new();
        root.insert("openapi".to_string(), json!(OPENAPI_VERSION));
        root.insert(
            "info".to_string(),
            json!({"title": self.title, "version": self.version}),
        );
        root.insert(
            "servers".to_string(),
            json!([{"url": self.server_url, "description": self.server_description}]),
        );
        if self.security_header.is_some() {
            let mut requirement = Map::new();
            requirement.insert(self.security_scheme.clone(), json!([]));
            root.insert(
                "security".to_string(),
                Value::Array(vec![Value::Object(requirement)]),
            );
        }

        let mut document = SpecDocument::new(root);
        if let Some(header) = &self.security_header {
            let mut schemes = Map::new();
            schemes.insert(
                self.security_scheme.clone(),
                json!({"type": "apiKey", "in": "header", "name": header}),
            );
            document
                .components_mut()
                .insert("securitySchemes".to_string(), Value::Object(schemes));
        }
        document
    }
}

/// 依服務順序合併 `paths` 與 `components.schemas`。
///
/// 同一個 path 的 method 逐一合併，同名 method 與同名 schema 都是後寫入者勝出。
pub fn combine(documents: &ServiceDocuments, envelope: &Envelope) -> SpecDocument {
    let mut combined = envelope.document();

    for (service, document) in documents {
        let mut merged_paths = 0;
        if let Some(paths) = document.paths() {
            let target = combined.paths_mut();
            for (path, path_item) in paths {
                merge_path_item(target, path, path_item);
                merged_paths += 1;
            }
        }

        let mut merged_schemas = 0;
        if let Some(schemas) = document.schemas() {
            let target = combined.schemas_mut();
            for (name, schema) in schemas {
                target.insert(name.clone(), schema.clone());
                merged_schemas += 1;
            }
        }

        tracing::debug!(
            "🧩 Merged {}: {} paths, {} schemas",
            service,
            merged_paths,
            merged_schemas
        );
    }

    combined
}

fn merge_path_item(target: &mut Map<String, Value>, path: &str, path_item: &Value) {
    match (target.get_mut(path), path_item) {
        (Some(Value::Object(existing)), Value::Object(incoming)) => {
            for (key, value) in incoming {
                existing.insert(key.clone(), value.clone());
            }
        }
        _ => {
            target.insert(path.to_string(), path_item.clone());
        }
    }
}
