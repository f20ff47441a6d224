//! 依 path 前綴過濾 path，並重新指定 operationId 與 tag。

use crate::domain::model::{for_each_operation_mut, SpecDocument};
use crate::utils::error::{CombineError, Result};
use serde_json::{json, Value};
use std::collections::HashSet;

/// 代表「所有 segment」的特殊值，對應前綴 `/api`
pub const ALL_SEGMENTS: &str = "all";

const API_PREFIX: &str = "/api";

/// 單次執行中已指派過的 operationId
#[derive(Debug, Default, Clone)]
pub struct OperationIdRegistry {
    assigned: HashSet<String>,
}

impl OperationIdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 產生 `<segment>_<id>`，已被使用時依序加上 `_2`、`_3`…
    pub fn assign(&mut self, segment: &str, operation_id: &str) -> String {
        let base = format!("{}_{}", segment, operation_id);
        let mut candidate = base.clone();
        let mut counter = 2;
        while self.assigned.contains(&candidate) {
            candidate = format!("{}_{}", base, counter);
            counter += 1;
        }
        self.assigned.insert(candidate.clone());
        candidate
    }

    pub fn contains(&self, operation_id: &str) -> bool {
        self.assigned.contains(operation_id)
    }

    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterReport {
    pub kept_paths: usize,
    pub removed_paths: Vec<String>,
    pub operations: usize,
}

pub fn segment_prefix(segment: &str) -> String {
    if segment == ALL_SEGMENTS {
        API_PREFIX.to_string()
    } else {
        format!("{}/{}", API_PREFIX, segment)
    }
}

/// 回傳第一個前綴符合的 segment（不分大小寫）
pub fn matching_segment<'a>(path: &str, segments: &'a [String]) -> Option<&'a str> {
    let path = path.to_lowercase();
    segments
        .iter()
        .find(|segment| path.starts_with(&segment_prefix(segment).to_lowercase()))
        .map(String::as_str)
}

/// `/api/v1/product/{id}` 取 `product`，不存在時為空字串
pub fn tag_from_path(path: &str) -> &str {
    path.split('/').nth(3).unwrap_or("")
}

/// 過濾並改寫 operation。
///
/// 每個 path 先判斷是否符合任一 segment，再決定保留或刪除；
/// 保留的 path 以第一個符合的 segment 作為 operationId 前綴，並以 path 的第四段作為唯一的 tag。
pub fn filter_and_retag(
    document: &mut SpecDocument,
    segments: &[String],
    registry: &mut OperationIdRegistry,
) -> Result<FilterReport> {
    let mut report = FilterReport::default();
    let paths = document.paths_mut();

    for (path, path_item) in paths.iter_mut() {
        let Some(segment) = matching_segment(path, segments) else {
            report.removed_paths.push(path.clone());
            continue;
        };

        let tag = tag_from_path(path).to_string();
        for_each_operation_mut(path, path_item, |method, operation| {
            let operation_id = match operation.get("operationId") {
                Some(Value::String(id)) => id.clone(),
                _ => {
                    return Err(CombineError::MissingField {
                        location: format!("{} {}", method.to_uppercase(), path),
                        field: "operationId".to_string(),
                    })
                }
            };
            let assigned = registry.assign(segment, &operation_id);
            operation.insert("tags".to_string(), json!([tag]));
            operation.insert("operationId".to_string(), Value::String(assigned));
            report.operations += 1;
            Ok(())
        })?;
        report.kept_paths += 1;
    }

    for path in &report.removed_paths {
        paths.shift_remove(path);
    }

    tracing::debug!(
        "🏷️ Segments {:?}: kept {} paths, removed {}, {} operations renamed",
        segments,
        report.kept_paths,
        report.removed_paths.len(),
        report.operations
    );

    Ok(report)
}
