use crate::utils::error::{CombineError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Path item 底下被視為 operation 的 key
pub const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

pub fn is_http_method(key: &str) -> bool {
    HTTP_METHODS.contains(&key)
}

/// 一份 OpenAPI 文件（服務原始文件或合併後的文件）。
///
/// 載入時保證根節點是物件，且 `paths` 與 `components.schemas` 存在並且是物件。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpecDocument {
    root: Map<String, Value>,
}

impl SpecDocument {
    pub fn new(root: Map<String, Value>) -> Self {
        let mut document = Self { root };
        document.paths_mut();
        document.schemas_mut();
        document
    }

    /// 驗證並正規化一份 JSON 文件；`location` 用於錯誤訊息（服務名稱或檔案路徑）
    pub fn from_value(location: &str, value: Value) -> Result<Self> {
        let Value::Object(root) = value else {
            return Err(CombineError::InvalidDocument {
                location: location.to_string(),
                reason: "document root must be a JSON object".to_string(),
            });
        };

        if let Some(paths) = root.get("paths") {
            if !paths.is_object() {
                return Err(CombineError::InvalidDocument {
                    location: format!("{}#/paths", location),
                    reason: "`paths` must be an object".to_string(),
                });
            }
        }

        if let Some(components) = root.get("components") {
            let Some(components) = components.as_object() else {
                return Err(CombineError::InvalidDocument {
                    location: format!("{}#/components", location),
                    reason: "`components` must be an object".to_string(),
                });
            };
            if let Some(schemas) = components.get("schemas") {
                if !schemas.is_object() {
                    return Err(CombineError::InvalidDocument {
                        location: format!("{}#/components/schemas", location),
                        reason: "`components.schemas` must be an object".to_string(),
                    });
                }
            }
        }

        Ok(Self::new(root))
    }

    pub fn from_slice(location: &str, bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(location, value)
    }

    pub fn root(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.root
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    pub fn paths(&self) -> Option<&Map<String, Value>> {
        self.root.get("paths").and_then(Value::as_object)
    }

    pub fn paths_mut(&mut self) -> &mut Map<String, Value> {
        object_entry(&mut self.root, "paths")
    }

    pub fn components(&self) -> Option<&Map<String, Value>> {
        self.root.get("components").and_then(Value::as_object)
    }

    pub fn components_mut(&mut self) -> &mut Map<String, Value> {
        object_entry(&mut self.root, "components")
    }

    pub fn schemas(&self) -> Option<&Map<String, Value>> {
        self.root
            .get("components")
            .and_then(|c| c.get("schemas"))
            .and_then(Value::as_object)
    }

    pub fn schemas_mut(&mut self) -> &mut Map<String, Value> {
        object_entry(self.components_mut(), "schemas")
    }

    pub fn schema_names(&self) -> Vec<String> {
        self.schemas()
            .map(|schemas| schemas.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn set_title(&mut self, title: &str) {
        let info = object_entry(&mut self.root, "info");
        info.insert("title".to_string(), Value::String(title.to_string()));
    }

    pub fn title(&self) -> Option<&str> {
        self.root
            .get("info")
            .and_then(|info| info.get("title"))
            .and_then(Value::as_str)
    }

    /// 列出所有 HTTP method operation；method 成員不是物件時回報錯誤
    pub fn operations(&self) -> Result<Vec<OperationRef<'_>>> {
        let mut operations = Vec::new();
        let Some(paths) = self.paths() else {
            return Ok(operations);
        };

        for (path, path_item) in paths {
            let Some(item) = path_item.as_object() else {
                return Err(CombineError::InvalidDocument {
                    location: path.clone(),
                    reason: "path item must be an object".to_string(),
                });
            };
            for (method, operation) in item {
                if !is_http_method(method) {
                    continue;
                }
                let Some(operation) = operation.as_object() else {
                    return Err(invalid_operation(path, method));
                };
                operations.push(OperationRef {
                    path,
                    method,
                    operation,
                });
            }
        }

        Ok(operations)
    }
}

impl Default for SpecDocument {
    fn default() -> Self {
        Self::new(Map::new())
    }
}

/// 對一個 path item 底下的每個 operation 執行 `f`
pub fn for_each_operation_mut<F>(path: &str, path_item: &mut Value, mut f: F) -> Result<()>
where
    F: FnMut(&str, &mut Map<String, Value>) -> Result<()>,
{
    let Some(item) = path_item.as_object_mut() else {
        return Err(CombineError::InvalidDocument {
            location: path.to_string(),
            reason: "path item must be an object".to_string(),
        });
    };

    for (method, operation) in item.iter_mut() {
        if !is_http_method(method) {
            continue;
        }
        let Some(operation) = operation.as_object_mut() else {
            return Err(invalid_operation(path, method));
        };
        f(method, operation)?;
    }
    Ok(())
}

fn invalid_operation(path: &str, method: &str) -> CombineError {
    CombineError::InvalidDocument {
        location: format!("{} {}", method.to_uppercase(), path),
        reason: "operation must be an object".to_string(),
    }
}

/// 取得（必要時建立）物件型別的子節點
pub(crate) fn object_entry<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    match slot {
        Value::Object(object) => object,
        _ => unreachable!("slot was replaced with an object above"),
    }
}

/// 唯讀的 operation 視圖，供保留條件判斷使用
#[derive(Debug, Clone, Copy)]
pub struct OperationRef<'a> {
    pub path: &'a str,
    pub method: &'a str,
    pub operation: &'a Map<String, Value>,
}

impl<'a> OperationRef<'a> {
    pub fn operation_id(&self) -> Option<&'a str> {
        self.operation.get("operationId").and_then(Value::as_str)
    }

    pub fn tags(&self) -> Vec<&'a str> {
        self.operation
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn location(&self) -> String {
        format!("{} {}", self.method.to_uppercase(), self.path)
    }
}

/// 服務名稱 → 文件，依設定的服務順序排列
pub type ServiceDocuments = IndexMap<String, SpecDocument>;

/// 標籤 → path 清單（外部提供）
pub type TagMap = IndexMap<String, Vec<String>>;

/// schema 名稱 → required 欄位清單（外部提供）
pub type RequiredMap = IndexMap<String, Vec<String>>;

/// path → method → 範例區塊（外部提供）
pub type ExampleMap = IndexMap<String, IndexMap<String, ExampleEntry>>;

/// path → method → vendor extension（`x-…`）
pub type ExtensionMap = IndexMap<String, IndexMap<String, Map<String, Value>>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExampleEntry {
    #[serde(rename = "requestBody", default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responses: Option<Value>,
}

/// enum 值整組替換規則
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumRewrite {
    pub from: Vec<Value>,
    pub to: Vec<Value>,
}

/// 一份待寫出的文件
#[derive(Debug, Clone)]
pub struct OutputDocument {
    pub file_path: String,
    pub document: SpecDocument,
    pub indent: usize,
}

/// 單次 pipeline 執行的統計
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub documents_loaded: usize,
    pub renamed_components: usize,
    pub paths_kept: usize,
    pub paths_removed: usize,
    pub schemas_kept: usize,
    pub schemas_removed: usize,
    pub dangling_references: Vec<String>,
    pub required_applied: usize,
    pub examples_applied: usize,
    pub extensions_applied: usize,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub documents: Vec<OutputDocument>,
    pub summary: RunSummary,
}
