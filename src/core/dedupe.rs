//! 跨服務的 schema component 名稱衝突處理。
//!
//! 同名但結構不同的 component，在每個定義它的服務中都改名為
//! `<服務名><Component 名>`，並同步改寫該服務文件中所有指向舊名稱的 `$ref`。
//! 同名且結構相同的 component 保留原名，合併後只留一份。
//! 帶前綴的名稱已被任何服務使用時，依序加上 `_2`、`_3`… 直到不衝突。

use crate::core::equality::components_equal;
use crate::core::reference::schema_pointer;
use crate::core::visitor::replace_string_leaves;
use crate::domain::model::{ServiceDocuments, SpecDocument};
use crate::utils::error::{CombineError, Result};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashSet;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rename {
    pub service: String,
    pub from: String,
    pub to: String,
    pub references: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameReport {
    pub duplicated: IndexSet<String>,
    pub renames: Vec<Rename>,
}

/// 找出在不同服務中有不同結構定義的 component 名稱。
///
/// 只要某名稱的所有定義不完全相同就算重複，與服務順序無關。
pub fn find_duplicated_names(documents: &ServiceDocuments) -> IndexSet<String> {
    let mut first_seen: IndexMap<&str, &Value> = IndexMap::new();
    let mut duplicated = IndexSet::new();

    for document in documents.values() {
        let Some(schemas) = document.schemas() else {
            continue;
        };
        for (name, definition) in schemas {
            match first_seen.get(name.as_str()) {
                Some(first) if !components_equal(first, definition) => {
                    duplicated.insert(name.clone());
                }
                Some(_) => {}
                None => {
                    first_seen.insert(name.as_str(), definition);
                }
            }
        }
    }

    duplicated
}

/// 把重複名稱改成帶服務前綴的名稱，回傳改名紀錄
pub fn disambiguate(documents: &mut ServiceDocuments) -> Result<RenameReport> {
    let duplicated = find_duplicated_names(documents);
    let mut renames = Vec::new();
    let mut taken: HashSet<String> = documents
        .values()
        .flat_map(|document| document.schema_names())
        .collect();

    for (service, document) in documents.iter_mut() {
        for name in document.schema_names() {
            if !duplicated.contains(&name) {
                continue;
            }
            let qualified = free_name(qualified_name(service, &name), &taken);
            taken.insert(qualified.clone());
            let references = rename_component(document, &name, &qualified)?;
            tracing::debug!(
                "🔀 {}: {} -> {} ({} references rewritten)",
                service,
                name,
                qualified,
                references
            );
            renames.push(Rename {
                service: service.clone(),
                from: name,
                to: qualified,
                references,
            });
        }
    }

    Ok(RenameReport {
        duplicated,
        renames,
    })
}

/// `candidate` 已被使用時加上第一個可用的數字後綴（從 2 開始）
fn free_name(candidate: String, taken: &HashSet<String>) -> String {
    if !taken.contains(&candidate) {
        return candidate;
    }
    let mut suffix = 2;
    loop {
        let name = format!("{}_{}", candidate, suffix);
        if !taken.contains(&name) {
            tracing::warn!("⚠️ Schema {} already exists, using {}", candidate, name);
            return name;
        }
        suffix += 1;
    }
}

/// 改寫文件中所有指向 `old_name` 的 `$ref`，並在 key 仍存在時重新命名 schema。
/// 回傳改寫的 reference 數量；`new_name` 已存在時不做任何修改並回報錯誤。
pub fn rename_component(
    document: &mut SpecDocument,
    old_name: &str,
    new_name: &str,
) -> Result<usize> {
    if old_name != new_name && document.schemas().is_some_and(|s| s.contains_key(new_name)) {
        return Err(CombineError::InvalidDocument {
            location: schema_pointer(new_name),
            reason: format!("cannot rename {} to an existing schema", old_name),
        });
    }

    let old_pointer = schema_pointer(old_name);
    let new_pointer = schema_pointer(new_name);

    let references = document
        .root_mut()
        .values_mut()
        .map(|value| replace_string_leaves(value, &old_pointer, &new_pointer))
        .sum();

    let schemas = document.schemas_mut();
    if let Some(definition) = schemas.shift_remove(old_name) {
        schemas.insert(new_name.to_string(), definition);
    }

    Ok(references)
}

pub fn qualified_name(service: &str, component: &str) -> String {
    format!("{}{}", capitalize(service), capitalize(component))
}

/// 第一個字元轉大寫，其餘保持不變
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
