//! 以外部對照表覆寫文件內容：required 欄位、vendor extension、enum 值。

use crate::core::visitor::rewrite_enums;
use crate::domain::model::{is_http_method, EnumRewrite, ExtensionMap, RequiredMap, SpecDocument};
use serde_json::Value;

const EXTENSION_PREFIX: &str = "x-";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayReport {
    pub applied: usize,
    pub skipped: Vec<String>,
}

/// 直接取代 schema 的 `required` 陣列；schema 不存在時略過
pub fn apply_required(document: &mut SpecDocument, required: &RequiredMap) -> OverlayReport {
    let mut report = OverlayReport::default();
    let schemas = document.schemas_mut();

    for (name, fields) in required {
        match schemas.get_mut(name).and_then(Value::as_object_mut) {
            Some(schema) => {
                let fields = fields.iter().cloned().map(Value::String).collect();
                schema.insert("required".to_string(), Value::Array(fields));
                report.applied += 1;
            }
            None => {
                tracing::warn!("⚠️ Required fields for unknown schema {} skipped", name);
                report.skipped.push(name.clone());
            }
        }
    }

    report
}

/// 把對照表中 `x-` 開頭的 key 複製到對應的 operation
pub fn apply_extensions(document: &mut SpecDocument, extensions: &ExtensionMap) -> OverlayReport {
    let mut report = OverlayReport::default();
    let paths = document.paths_mut();

    for (path, methods) in extensions {
        let Some(item) = paths.get_mut(path).and_then(Value::as_object_mut) else {
            continue;
        };
        for (method, values) in methods {
            if !is_http_method(method) {
                continue;
            }
            let Some(operation) = item.get_mut(method).and_then(Value::as_object_mut) else {
                report.skipped.push(format!("{} {}", method.to_uppercase(), path));
                continue;
            };
            let mut copied = false;
            for (key, value) in values {
                if key.starts_with(EXTENSION_PREFIX) {
                    operation.insert(key.clone(), value.clone());
                    copied = true;
                }
            }
            if copied {
                report.applied += 1;
            }
        }
    }

    report
}

/// 在 `components.schemas` 套用所有 enum 替換規則，回傳替換次數
pub fn apply_enum_rewrites(document: &mut SpecDocument, rules: &[EnumRewrite]) -> usize {
    if rules.is_empty() {
        return 0;
    }
    let schemas = document.schemas_mut();
    let mut rewritten = 0;
    for schema in schemas.values_mut() {
        for rule in rules {
            rewritten += rewrite_enums(schema, rule);
        }
    }
    rewritten
}
