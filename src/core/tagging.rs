//! 依外部提供的 tag → path 對照表排序 path，並指定每個 operation 的 tag。

use crate::domain::model::{for_each_operation_mut, is_http_method, SpecDocument, TagMap};
use crate::utils::error::Result;
use indexmap::IndexMap;
use serde_json::{json, Map, Value};

/// 對照表中找不到的 path 使用的標籤
pub const DEFAULT_UNMAPPED_LABEL: &str = "unmapped";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagReport {
    pub mapped_paths: usize,
    pub unmapped_paths: Vec<String>,
}

/// 依對照表找出 path 的第一個 tag
pub fn tag_for_path<'a>(tag_map: &'a TagMap, path: &str) -> Option<&'a str> {
    tag_map
        .iter()
        .find(|(_, paths)| paths.iter().any(|candidate| candidate == path))
        .map(|(tag, _)| tag.as_str())
}

/// 重新排列 `paths`：先依對照表順序（tag 順序，再依每個 tag 內的 path 順序），
/// 其餘 path 維持原本順序接在後面。每個 operation 只留一個 tag，
/// 找不到對應時使用 `unmapped_label`。
pub fn apply_tag_map(
    document: &mut SpecDocument,
    tag_map: &TagMap,
    unmapped_label: &str,
) -> Result<TagReport> {
    let paths = document.paths_mut();
    let mut remaining: IndexMap<String, Value> = std::mem::take(paths).into_iter().collect();
    let mut sorted = Map::new();

    for listed in tag_map.values() {
        for path in listed {
            if let Some((key, item)) = remaining.shift_remove_entry(path) {
                sorted.insert(key, item);
            }
        }
    }
    sorted.extend(remaining);

    let mut report = TagReport::default();
    for (path, path_item) in sorted.iter_mut() {
        let tag = match tag_for_path(tag_map, path) {
            Some(tag) => {
                report.mapped_paths += 1;
                tag
            }
            None => {
                report.unmapped_paths.push(path.clone());
                unmapped_label
            }
        };
        for_each_operation_mut(path, path_item, |_, operation| {
            operation.insert("tags".to_string(), json!([tag]));
            Ok(())
        })?;
    }

    *document.paths_mut() = sorted;

    tracing::debug!(
        "🔖 Tagged {} paths, {} unmapped",
        report.mapped_paths,
        report.unmapped_paths.len()
    );

    Ok(report)
}

/// 刪除所有 operation 都只帶有 `label` 的 path，回傳刪除的 path
pub fn remove_paths_tagged(document: &mut SpecDocument, label: &str) -> Vec<String> {
    let paths = document.paths_mut();
    let removed: Vec<String> = paths
        .iter()
        .filter(|(_, item)| carries_only(item, label))
        .map(|(path, _)| path.clone())
        .collect();

    for path in &removed {
        paths.shift_remove(path);
    }

    if !removed.is_empty() {
        tracing::debug!("🗑️ Removed {} paths tagged {}", removed.len(), label);
    }
    removed
}

fn carries_only(path_item: &Value, label: &str) -> bool {
    let Some(item) = path_item.as_object() else {
        return false;
    };
    let mut operations = item
        .iter()
        .filter(|(key, _)| is_http_method(key))
        .peekable();
    if operations.peek().is_none() {
        return false;
    }
    operations.all(|(_, operation)| {
        operation
            .get("tags")
            .and_then(Value::as_array)
            .is_some_and(|tags| !tags.is_empty() && tags.iter().all(|tag| tag == label))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag_map(entries: Vec<(&str, Vec<&str>)>) -> TagMap {
        entries
            .into_iter()
            .map(|(tag, paths)| {
                (
                    tag.to_string(),
                    paths.iter().map(|path| path.to_string()).collect(),
                )
            })
            .collect()
    }

    fn document(value: Value) -> SpecDocument {
        SpecDocument::from_value("test", value).unwrap()
    }

    fn path_order(document: &SpecDocument) -> Vec<String> {
        document.paths().unwrap().keys().cloned().collect()
    }

    #[test]
    fn test_sort_and_tag_stability() {
        let mut doc = document(json!({
            "paths": {
                "/y": {"get": {"operationId": "y"}},
                "/x": {"get": {"operationId": "x"}, "post": {"operationId": "x2"}},
                "/z": {"get": {"operationId": "z"}}
            }
        }));
        let map = tag_map(vec![("A", vec!["/x"]), ("B", vec!["/y"])]);

        let report = apply_tag_map(&mut doc, &map, DEFAULT_UNMAPPED_LABEL).unwrap();

        assert_eq!(path_order(&doc), vec!["/x", "/y", "/z"]);
        assert_eq!(report.mapped_paths, 2);
        assert_eq!(report.unmapped_paths, vec!["/z"]);

        let value = doc.clone().into_value();
        assert_eq!(value["paths"]["/x"]["get"]["tags"], json!(["A"]));
        assert_eq!(value["paths"]["/x"]["post"]["tags"], json!(["A"]));
        assert_eq!(value["paths"]["/y"]["get"]["tags"], json!(["B"]));
        assert_eq!(value["paths"]["/z"]["get"]["tags"], json!(["unmapped"]));

        let removed = remove_paths_tagged(&mut doc, DEFAULT_UNMAPPED_LABEL);
        assert_eq!(removed, vec!["/z"]);
        assert_eq!(path_order(&doc), vec!["/x", "/y"]);
    }

    #[test]
    fn test_first_tag_wins_and_per_tag_order_kept() {
        let mut doc = document(json!({
            "paths": {
                "/c": {"get": {}},
                "/b": {"get": {}},
                "/a": {"get": {}}
            }
        }));
        let map = tag_map(vec![
            ("First", vec!["/a", "/c"]),
            ("Second", vec!["/c", "/b", "/missing"]),
        ]);

        apply_tag_map(&mut doc, &map, DEFAULT_UNMAPPED_LABEL).unwrap();

        assert_eq!(path_order(&doc), vec!["/a", "/c", "/b"]);
        let value = doc.into_value();
        assert_eq!(value["paths"]["/c"]["get"]["tags"], json!(["First"]));
        assert_eq!(value["paths"]["/b"]["get"]["tags"], json!(["Second"]));
    }

    #[test]
    fn test_non_method_members_untouched() {
        let mut doc = document(json!({
            "paths": {"/a": {"parameters": [{"name": "id"}], "get": {}}}
        }));

        apply_tag_map(&mut doc, &tag_map(vec![("A", vec!["/a"])]), "none").unwrap();

        let value = doc.into_value();
        assert_eq!(value["paths"]["/a"]["parameters"], json!([{"name": "id"}]));
        assert_eq!(value["paths"]["/a"]["get"]["tags"], json!(["A"]));
    }

    #[test]
    fn test_remove_keeps_paths_without_operations() {
        let mut doc = document(json!({
            "paths": {"/only-params": {"parameters": []}}
        }));
        assert!(remove_paths_tagged(&mut doc, DEFAULT_UNMAPPED_LABEL).is_empty());
    }
}
