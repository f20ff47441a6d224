//! `serde_json::Value` 樹的通用走訪。
//!
//! 以顯式堆疊走訪 object / array / scalar 節點，不依賴遞迴，也不列舉特定的 schema 形狀，
//! 任何位置的 `$ref` 或字串葉節點都會被看到。

use crate::domain::model::EnumRewrite;
use serde_json::Value;

/// 前序走訪所有節點
pub fn walk<'a, F>(root: &'a Value, mut visit: F)
where
    F: FnMut(&'a Value),
{
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        visit(node);
        match node {
            Value::Array(items) => stack.extend(items.iter().rev()),
            Value::Object(map) => stack.extend(map.values().rev()),
            _ => {}
        }
    }
}

/// 前序走訪所有節點，`visit` 可以修改節點；修改後的子節點仍會被走訪
pub fn walk_mut<F>(root: &mut Value, mut visit: F)
where
    F: FnMut(&mut Value),
{
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        visit(&mut *node);
        match node {
            Value::Array(items) => stack.extend(items.iter_mut().rev()),
            Value::Object(map) => stack.extend(map.values_mut().rev()),
            _ => {}
        }
    }
}

/// 一個 `$ref` 出現的位置
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RefSite<'a> {
    Pointer(&'a str),
    /// `$ref` 的值不是字串
    Malformed(&'a Value),
}

/// 收集子樹中所有 `$ref`
pub fn collect_refs(root: &Value) -> Vec<RefSite<'_>> {
    let mut sites = Vec::new();
    walk(root, |node| {
        if let Some(reference) = node.as_object().and_then(|map| map.get("$ref")) {
            sites.push(match reference {
                Value::String(pointer) => RefSite::Pointer(pointer),
                other => RefSite::Malformed(other),
            });
        }
    });
    sites
}

/// 把所有與 `from` 完全相同的字串葉節點換成 `to`（object 的 key 不動），回傳替換次數
pub fn replace_string_leaves(root: &mut Value, from: &str, to: &str) -> usize {
    let mut replaced = 0;
    walk_mut(root, |node| {
        if let Value::String(text) = node {
            if text == from {
                *text = to.to_string();
                replaced += 1;
            }
        }
    });
    replaced
}

/// 套用 enum 替換規則：`enum` 陣列與 `from` 完全相同（含順序）時整組換成 `to`
pub fn rewrite_enums(root: &mut Value, rule: &EnumRewrite) -> usize {
    let mut rewritten = 0;
    walk_mut(root, |node| {
        let Some(map) = node.as_object_mut() else {
            return;
        };
        if let Some(Value::Array(values)) = map.get_mut("enum") {
            if *values == rule.from {
                *values = rule.to.clone();
                rewritten += 1;
            }
        }
    });
    rewritten
}
