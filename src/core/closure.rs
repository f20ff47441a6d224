//! 從保留的 operation 出發，計算可達的 schema 並刪除其餘 schema（mark and sweep）。
//!
//! 種子集合來自每個保留 operation 內任何位置的 `$ref`（request body、parameter、response、
//! callback，不限 media type），以及該 path item 上非 method 成員（例如 path 層級的
//! `parameters`）內的 `$ref`。展開時走訪每個已到達 schema 定義內任何位置的 `$ref`；
//! 指向其他 component（`#/components/responses/…`、`parameters`、`requestBodies` …）的參照
//! 會展開該 component 的內容，但這些 component 本身不會被刪除。
//! 圖以名稱 arena 與 visited 位元表示，邊在第一次到達節點時才計算，循環參照自然終止。
//!
//! `prune` 先刪除不符合保留條件的 operation（以及因此沒有任何 operation 的 path），
//! 刪除 schema 後再掃描整份文件，回報結果中實際無法解析的參照。

use crate::core::reference::{component_ref, is_local_pointer, schema_root_name};
use crate::core::visitor::{collect_refs, RefSite};
use crate::domain::model::{is_http_method, OperationRef, SpecDocument};
use crate::utils::error::{CombineError, Result};
use indexmap::IndexSet;
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashSet, VecDeque};

/// schema 之間的參照圖，節點為 `components.schemas` 的名稱
pub struct ReferenceGraph<'a> {
    schemas: &'a Map<String, Value>,
    components: Option<&'a Map<String, Value>>,
    names: IndexSet<&'a str>,
    edges: Vec<Option<Vec<usize>>>,
    /// 尚未展開的非 schema component pointer
    pending: Vec<String>,
    dangling: BTreeSet<String>,
    malformed: Vec<String>,
}

impl<'a> ReferenceGraph<'a> {
    pub fn new(schemas: &'a Map<String, Value>) -> Self {
        let names: IndexSet<&'a str> = schemas.keys().map(String::as_str).collect();
        let edges = vec![None; names.len()];
        Self {
            schemas,
            components: None,
            names,
            edges,
            pending: Vec::new(),
            dangling: BTreeSet::new(),
            malformed: Vec::new(),
        }
    }

    /// 讓 `#/components/<kind>/<Name>` 形式的參照可以被展開
    pub fn with_components(mut self, components: &'a Map<String, Value>) -> Self {
        self.components = Some(components);
        self
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.get_index_of(name)
    }

    pub fn name(&self, index: usize) -> Option<&'a str> {
        self.names.get_index(index).copied()
    }

    fn component(&self, pointer: &str) -> Option<&'a Value> {
        let (kind, name) = component_ref(pointer)?;
        self.components?.get(kind)?.get(name)
    }

    /// 把子樹中的 `$ref` 解析成節點；找不到的 schema 記為 dangling
    pub fn resolve_refs(&mut self, location: &str, subtree: &Value) -> Vec<usize> {
        let mut targets = Vec::new();
        for site in collect_refs(subtree) {
            match site {
                RefSite::Pointer(pointer) => match schema_root_name(pointer) {
                    Some(name) => match self.index_of(name) {
                        Some(index) => targets.push(index),
                        None => {
                            self.dangling.insert(pointer.to_string());
                        }
                    },
                    None if component_ref(pointer).is_some() => {
                        self.pending.push(pointer.to_string());
                    }
                    None if is_local_pointer(pointer) => {
                        tracing::trace!("Ignoring non-component reference {} at {}", pointer, location);
                    }
                    None => {
                        tracing::debug!("Ignoring external reference {} at {}", pointer, location);
                    }
                },
                RefSite::Malformed(value) => {
                    self.malformed
                        .push(format!("{}: $ref must be a string, found {}", location, value));
                }
            }
        }
        targets
    }

    /// 節點的出邊，第一次查詢時才從 schema 定義計算
    pub fn neighbours(&mut self, index: usize) -> Vec<usize> {
        if let Some(Some(cached)) = self.edges.get(index) {
            return cached.clone();
        }
        let Some(name) = self.name(index) else {
            return Vec::new();
        };
        let targets = match self.schemas.get(name) {
            Some(definition) => self.resolve_refs(name, definition),
            None => Vec::new(),
        };
        self.edges[index] = Some(targets.clone());
        targets
    }

    /// 從種子出發的可達節點（worklist，不遞迴）
    pub fn reachable(&mut self, seeds: &[usize]) -> Vec<bool> {
        let mut visited = vec![false; self.len()];
        let mut expanded: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<usize> = VecDeque::new();

        enqueue(&mut visited, &mut queue, seeds);

        loop {
            while let Some(current) = queue.pop_front() {
                let next = self.neighbours(current);
                enqueue(&mut visited, &mut queue, &next);
            }

            let Some(pointer) = self.pending.pop() else {
                break;
            };
            if !expanded.insert(pointer.clone()) {
                continue;
            }
            match self.component(&pointer) {
                Some(component) => {
                    let next = self.resolve_refs(&pointer, component);
                    enqueue(&mut visited, &mut queue, &next);
                }
                None => {
                    self.dangling.insert(pointer);
                }
            }
        }

        visited
    }

    pub fn dangling(&self) -> impl Iterator<Item = &String> {
        self.dangling.iter()
    }

    pub fn malformed(&self) -> &[String] {
        &self.malformed
    }
}

fn enqueue(visited: &mut [bool], queue: &mut VecDeque<usize>, targets: &[usize]) {
    for &target in targets {
        if target < visited.len() && !visited[target] {
            visited[target] = true;
            queue.push_back(target);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClosureReport {
    pub kept: Vec<String>,
    pub removed: Vec<String>,
    /// 被刪除的 operation（`METHOD path`）
    pub removed_operations: Vec<String>,
    /// 因為 operation 全被刪除而移除的 path
    pub removed_paths: Vec<String>,
    /// 指向不存在 component 的 pointer
    pub dangling: Vec<String>,
    /// 值不是字串的 `$ref`
    pub malformed: Vec<String>,
}

impl ClosureReport {
    pub fn is_sound(&self) -> bool {
        self.dangling.is_empty() && self.malformed.is_empty()
    }

    /// 嚴格模式下，有未解析的參照即視為錯誤
    pub fn ensure_sound(&self) -> Result<()> {
        if self.is_sound() {
            return Ok(());
        }
        let mut references = self.dangling.clone();
        references.extend(self.malformed.iter().cloned());
        Err(CombineError::DanglingReferences { references })
    }
}

/// 計算保留的 schema 名稱（依 `components.schemas` 原本的順序）
pub fn reachable_schemas<F>(document: &SpecDocument, keep: F) -> Result<ClosureReport>
where
    F: Fn(&OperationRef<'_>) -> bool,
{
    let empty = Map::new();
    let schemas = document.schemas().unwrap_or(&empty);
    let mut graph = ReferenceGraph::new(schemas);
    if let Some(components) = document.components() {
        graph = graph.with_components(components);
    }
    let mut seeds = Vec::new();
    let mut seeded_paths: IndexSet<&str> = IndexSet::new();

    for operation in document.operations()? {
        if !keep(&operation) {
            continue;
        }
        let location = operation.location();
        for value in operation.operation.values() {
            seeds.extend(graph.resolve_refs(&location, value));
        }
        seeded_paths.insert(operation.path);
    }

    // path 層級的共用成員（parameters 等）隨保留的 operation 一起保留
    if let Some(paths) = document.paths() {
        for path in &seeded_paths {
            let Some(item) = paths.get(*path).and_then(Value::as_object) else {
                continue;
            };
            for (key, value) in item {
                if !is_http_method(key) {
                    seeds.extend(graph.resolve_refs(path, value));
                }
            }
        }
    }

    let visited = graph.reachable(&seeds);

    let mut report = ClosureReport::default();
    for (index, reached) in visited.iter().enumerate() {
        if let Some(name) = graph.name(index) {
            if *reached {
                report.kept.push(name.to_string());
            } else {
                report.removed.push(name.to_string());
            }
        }
    }
    report.dangling = graph.dangling().cloned().collect();
    report.malformed = graph.malformed().to_vec();

    Ok(report)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetainReport {
    pub removed_operations: Vec<String>,
    pub removed_paths: Vec<String>,
}

/// 刪除不符合條件的 operation，以及因此不再有任何 operation 的 path
pub fn retain_operations<F>(document: &mut SpecDocument, keep: F) -> Result<RetainReport>
where
    F: Fn(&OperationRef<'_>) -> bool,
{
    let rejected: Vec<(String, String)> = document
        .operations()?
        .into_iter()
        .filter(|operation| !keep(operation))
        .map(|operation| (operation.path.to_string(), operation.method.to_string()))
        .collect();

    let mut report = RetainReport::default();
    let paths = document.paths_mut();
    for (path, method) in rejected {
        let Some(item) = paths.get_mut(&path).and_then(Value::as_object_mut) else {
            continue;
        };
        item.shift_remove(&method);
        report
            .removed_operations
            .push(format!("{} {}", method.to_uppercase(), path));
        if !item.keys().any(|key| is_http_method(key)) {
            paths.shift_remove(&path);
            report.removed_paths.push(path);
        }
    }

    if !report.removed_operations.is_empty() {
        tracing::debug!(
            "🗑️ Removed {} operations failing the keep condition ({} paths emptied)",
            report.removed_operations.len(),
            report.removed_paths.len()
        );
    }

    Ok(report)
}

/// 整份文件中無法解析的本地 component 參照，以及值不是字串的 `$ref`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceAudit {
    pub dangling: Vec<String>,
    pub malformed: Vec<String>,
}

impl ReferenceAudit {
    pub fn is_sound(&self) -> bool {
        self.dangling.is_empty() && self.malformed.is_empty()
    }
}

/// 掃描整份文件（paths、components 與其他頂層成員）的 `$ref`
pub fn audit_references(document: &SpecDocument) -> ReferenceAudit {
    let components = document.components();
    let mut dangling = BTreeSet::new();
    let mut malformed = Vec::new();

    let mut check = |location: String, subtree: &Value| {
        for site in collect_refs(subtree) {
            match site {
                RefSite::Pointer(pointer) => {
                    let Some((kind, name)) = component_ref(pointer) else {
                        continue;
                    };
                    let resolved = components
                        .and_then(|components| components.get(kind))
                        .and_then(|entries| entries.get(name))
                        .is_some();
                    if !resolved {
                        dangling.insert(pointer.to_string());
                    }
                }
                RefSite::Malformed(value) => {
                    malformed.push(format!("{}: $ref must be a string, found {}", location, value));
                }
            }
        }
    };

    for (key, section) in document.root() {
        match (key.as_str(), section.as_object()) {
            ("paths", Some(paths)) => {
                for (path, item) in paths {
                    let Some(item) = item.as_object() else {
                        check(path.clone(), item);
                        continue;
                    };
                    for (member, value) in item {
                        let location = if is_http_method(member) {
                            format!("{} {}", member.to_uppercase(), path)
                        } else {
                            format!("{} {}", path, member)
                        };
                        check(location, value);
                    }
                }
            }
            ("components", Some(sections)) => {
                for (kind, entries) in sections {
                    let Some(entries) = entries.as_object() else {
                        check(format!("#/components/{}", kind), entries);
                        continue;
                    };
                    for (name, value) in entries {
                        check(format!("#/components/{}/{}", kind, name), value);
                    }
                }
            }
            _ => check(key.clone(), section),
        }
    }

    ReferenceAudit {
        dangling: dangling.into_iter().collect(),
        malformed,
    }
}

/// 刪除不符合條件的 operation 與所有無法從保留 operation 到達的 schema。
///
/// 回報中的 `dangling` 與 `malformed` 來自刪除後對整份文件的掃描。
pub fn prune<F>(document: &mut SpecDocument, keep: F) -> Result<ClosureReport>
where
    F: Fn(&OperationRef<'_>) -> bool,
{
    let retained = retain_operations(document, &keep)?;
    let mut report = reachable_schemas(document, &keep)?;

    let schemas = document.schemas_mut();
    for name in &report.removed {
        schemas.shift_remove(name);
    }

    let audit = audit_references(document);
    report.removed_operations = retained.removed_operations;
    report.removed_paths = retained.removed_paths;
    report.dangling = audit.dangling;
    report.malformed = audit.malformed;

    for pointer in &report.dangling {
        tracing::warn!("⚠️ Unresolved reference: {}", pointer);
    }
    for message in &report.malformed {
        tracing::warn!("⚠️ Malformed reference: {}", message);
    }
    tracing::debug!(
        "✂️ Kept {} schemas, removed {}",
        report.kept.len(),
        report.removed.len()
    );

    Ok(report)
}

/// operationId 含有任一 segment
pub fn operation_id_contains_any(segments: &[String]) -> impl Fn(&OperationRef<'_>) -> bool + '_ {
    move |operation| {
        operation
            .operation_id()
            .map(|id| segments.iter().any(|segment| id.contains(segment.as_str())))
            .unwrap_or(false)
    }
}

/// operationId 含有任一 segment，且 tag 與 `include_tags` 有交集（`include_tags` 為空時不限制 tag）
pub fn operation_id_and_tags<'a>(
    segments: &'a [String],
    include_tags: &'a [String],
) -> impl Fn(&OperationRef<'_>) -> bool + 'a {
    let by_id = operation_id_contains_any(segments);
    move |operation| {
        by_id(operation)
            && (include_tags.is_empty()
                || operation
                    .tags()
                    .iter()
                    .any(|tag| include_tags.iter().any(|include| include == tag)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::visitor::walk;
    use serde_json::json;

    fn document(value: Value) -> SpecDocument {
        SpecDocument::from_value("test", value).unwrap()
    }

    fn keep_all(_: &OperationRef<'_>) -> bool {
        true
    }

    /// 文件中每個 schema pointer 都必須能解析
    fn assert_no_dangling(document: &SpecDocument) {
        let value = document.clone().into_value();
        let schemas = value["components"]["schemas"].as_object().unwrap();
        walk(&value, |node| {
            if let Some(Value::String(pointer)) = node.as_object().and_then(|m| m.get("$ref")) {
                if let Some(name) = schema_root_name(pointer) {
                    assert!(schemas.contains_key(name), "dangling {}", pointer);
                }
            }
        });
    }

    fn shop() -> SpecDocument {
        document(json!({
            "paths": {
                "/api/v1/orders": {
                    "post": {
                        "operationId": "v1_createOrder",
                        "requestBody": {"content": {"application/json": {"schema": {
                            "type": "object",
                            "properties": {"data": {"$ref": "#/components/schemas/OrderRequest"}}
                        }}}},
                        "parameters": [{"name": "filter", "in": "query", "schema": {"$ref": "#/components/schemas/Filter"}}],
                        "responses": {"200": {"content": {"*/*": {"schema": {
                            "type": "object",
                            "additionalProperties": {"$ref": "#/components/schemas/Order"}
                        }}}}}
                    }
                },
                "/api/admin/reports": {
                    "get": {
                        "operationId": "admin_reports",
                        "responses": {"200": {"content": {"*/*": {"schema": {"$ref": "#/components/schemas/Report"}}}}}
                    }
                }
            },
            "components": {"schemas": {
                "OrderRequest": {"type": "object", "properties": {
                    "items": {"type": "array", "items": {"$ref": "#/components/schemas/OrderItem"}}
                }},
                "OrderItem": {"type": "object", "properties": {
                    "options": {"additionalProperties": {"items": {"$ref": "#/components/schemas/Option"}}}
                }},
                "Option": {"type": "string"},
                "Filter": {"type": "string"},
                "Order": {"type": "object", "properties": {
                    "parent": {"$ref": "#/components/schemas/Order"},
                    "children": {"type": "array", "items": {"$ref": "#/components/schemas/Order"}}
                }},
                "Report": {"type": "object"},
                "Unused": {"type": "object"}
            }}
        }))
    }

    #[test]
    fn test_prune_keeps_transitive_closure() {
        let mut doc = shop();
        let segments = vec!["v1".to_string()];

        let report = prune(&mut doc, operation_id_contains_any(&segments)).unwrap();

        assert_eq!(
            report.kept,
            vec!["OrderRequest", "OrderItem", "Option", "Filter", "Order"]
        );
        assert_eq!(report.removed, vec!["Report", "Unused"]);
        assert_eq!(report.removed_paths, vec!["/api/admin/reports"]);
        assert!(report.is_sound());
        assert_eq!(
            doc.schema_names(),
            vec!["OrderRequest", "OrderItem", "Option", "Filter", "Order"]
        );
    }

    #[test]
    fn test_prune_keep_all_is_sound() {
        let mut doc = shop();
        let report = prune(&mut doc, keep_all).unwrap();

        assert_eq!(report.removed, vec!["Unused"]);
        assert_no_dangling(&doc);
    }

    #[test]
    fn test_cycles_terminate() {
        let mut doc = document(json!({
            "paths": {"/api/v1/a": {"get": {"operationId": "v1_a", "responses": {"200": {
                "content": {"*/*": {"schema": {"$ref": "#/components/schemas/A"}}}
            }}}}},
            "components": {"schemas": {
                "A": {"properties": {"b": {"$ref": "#/components/schemas/B"}}},
                "B": {"properties": {"a": {"$ref": "#/components/schemas/A"}}},
                "Self": {"properties": {"me": {"$ref": "#/components/schemas/Self"}}}
            }}
        }));

        let report = prune(&mut doc, keep_all).unwrap();

        assert_eq!(report.kept, vec!["A", "B"]);
        assert_eq!(report.removed, vec!["Self"]);
    }

    #[test]
    fn test_shapes_beyond_recognized_list() {
        let mut doc = document(json!({
            "paths": {
                "/api/v1/a": {
                    "parameters": [{"name": "id", "in": "path", "schema": {"$ref": "#/components/schemas/Id"}}],
                    "get": {"operationId": "v1_a", "responses": {
                        "200": {"content": {"application/json": {"schema": {
                            "oneOf": [{"$ref": "#/components/schemas/Cat"}, {"$ref": "#/components/schemas/Dog"}]
                        }}}}
                    }}
                }
            },
            "components": {"schemas": {
                "Id": {"type": "string"},
                "Cat": {"allOf": [{"$ref": "#/components/schemas/Pet"}]},
                "Dog": {"type": "object"},
                "Pet": {"type": "object"}
            }}
        }));

        let report = prune(&mut doc, keep_all).unwrap();

        assert!(report.removed.is_empty());
        assert_no_dangling(&doc);
    }

    #[test]
    fn test_predicate_filters_seeds() {
        let mut doc = shop();
        let segments = vec!["admin".to_string()];

        let report = prune(&mut doc, operation_id_contains_any(&segments)).unwrap();

        assert_eq!(report.kept, vec!["Report"]);
        assert_eq!(report.removed_paths, vec!["/api/v1/orders"]);
        assert!(report.is_sound());
        assert_no_dangling(&doc);
    }

    #[test]
    fn test_rejected_operations_removed_before_sweep() {
        let mut doc = document(json!({
            "paths": {
                "/api/v1/orders": {
                    "post": {
                        "operationId": "v1_createOrder",
                        "tags": ["Orders"],
                        "responses": {"200": {"content": {"*/*": {"schema": {"$ref": "#/components/schemas/Order"}}}}}
                    },
                    "delete": {
                        "operationId": "v1_purgeOrders",
                        "tags": ["Admin"],
                        "responses": {"200": {"content": {"*/*": {"schema": {"$ref": "#/components/schemas/AuditLog"}}}}}
                    }
                },
                "/api/v1/customers": {
                    "parameters": [{"name": "id", "in": "query", "schema": {"$ref": "#/components/schemas/CustomerId"}}],
                    "get": {
                        "operationId": "v1_listCustomers",
                        "tags": ["Customers"],
                        "responses": {"200": {"content": {"*/*": {"schema": {"$ref": "#/components/schemas/Customer"}}}}}
                    }
                }
            },
            "components": {"schemas": {
                "Order": {"type": "object"},
                "AuditLog": {"type": "object"},
                "CustomerId": {"type": "string"},
                "Customer": {"type": "object"}
            }}
        }));
        let segments = vec!["v1".to_string()];
        let include = vec!["Orders".to_string()];

        let report = prune(&mut doc, operation_id_and_tags(&segments, &include)).unwrap();

        assert_eq!(
            report.removed_operations,
            vec!["DELETE /api/v1/orders", "GET /api/v1/customers"]
        );
        assert_eq!(report.removed_paths, vec!["/api/v1/customers"]);
        assert_eq!(report.kept, vec!["Order"]);
        assert!(report.is_sound());
        assert!(report.ensure_sound().is_ok());

        let paths = doc.paths().unwrap();
        assert_eq!(paths.keys().collect::<Vec<_>>(), vec!["/api/v1/orders"]);
        assert!(paths["/api/v1/orders"].get("delete").is_none());
        assert!(audit_references(&doc).is_sound());
        assert_no_dangling(&doc);
    }

    #[test]
    fn test_unresolved_reference_left_in_output_is_reported() {
        // 沒有任何 operation 的 path 不提供種子，它的參照在刪除後失效
        let mut doc = document(json!({
            "paths": {
                "/api/v1/a": {"get": {"operationId": "v1_a", "responses": {}}},
                "/api/v1/shared": {
                    "parameters": [{"name": "q", "in": "query", "schema": {"$ref": "#/components/schemas/Query"}}]
                }
            },
            "components": {"schemas": {"Query": {"type": "string"}}}
        }));

        let report = prune(&mut doc, keep_all).unwrap();

        assert_eq!(report.removed, vec!["Query"]);
        assert_eq!(report.dangling, vec!["#/components/schemas/Query"]);
        assert!(matches!(
            report.ensure_sound(),
            Err(CombineError::DanglingReferences { ref references }) if references == &report.dangling
        ));
    }

    #[test]
    fn test_other_component_kinds_are_followed() {
        let mut doc = document(json!({
            "paths": {"/api/v1/a": {"get": {
                "operationId": "v1_a",
                "parameters": [{"$ref": "#/components/parameters/Page"}],
                "responses": {
                    "200": {"content": {"*/*": {"schema": {"$ref": "#/components/schemas/Item"}}}},
                    "404": {"$ref": "#/components/responses/NotFound"}
                }
            }}},
            "components": {
                "schemas": {
                    "Item": {"type": "object"},
                    "Error": {"type": "object", "properties": {"detail": {"$ref": "#/components/schemas/ErrorDetail"}}},
                    "ErrorDetail": {"type": "string"},
                    "PageSize": {"type": "integer"},
                    "Unused": {"type": "object"}
                },
                "responses": {
                    "NotFound": {"content": {"*/*": {"schema": {"$ref": "#/components/schemas/Error"}}},
                                 "links": {"self": {"$ref": "#/components/responses/NotFound"}}}
                },
                "parameters": {
                    "Page": {"name": "size", "in": "query", "schema": {"$ref": "#/components/schemas/PageSize"}}
                }
            }
        }));

        let report = prune(&mut doc, keep_all).unwrap();

        assert_eq!(report.kept, vec!["Item", "Error", "ErrorDetail", "PageSize"]);
        assert_eq!(report.removed, vec!["Unused"]);
        assert!(report.is_sound());
        assert!(audit_references(&doc).is_sound());
    }

    #[test]
    fn test_missing_component_is_dangling() {
        let mut doc = document(json!({
            "paths": {"/api/v1/a": {"get": {
                "operationId": "v1_a",
                "responses": {"404": {"$ref": "#/components/responses/Gone"}}
            }}},
            "components": {"schemas": {}}
        }));

        let report = reachable_schemas(&doc, keep_all).unwrap();
        assert_eq!(report.dangling, vec!["#/components/responses/Gone"]);

        let report = prune(&mut doc, keep_all).unwrap();
        assert_eq!(report.dangling, vec!["#/components/responses/Gone"]);
    }

    #[test]
    fn test_dangling_and_malformed_references_reported() {
        let mut doc = document(json!({
            "paths": {"/api/v1/a": {"get": {"operationId": "v1_a", "responses": {"200": {
                "content": {"*/*": {"schema": {"$ref": "#/components/schemas/Missing"}}}
            }, "400": {"$ref": 12}}}}},
            "components": {"schemas": {}}
        }));

        let report = prune(&mut doc, keep_all).unwrap();

        assert_eq!(report.dangling, vec!["#/components/schemas/Missing"]);
        assert_eq!(report.malformed.len(), 1);
        assert!(report.malformed[0].starts_with("GET /api/v1/a"));
        assert!(matches!(
            report.ensure_sound(),
            Err(CombineError::DanglingReferences { ref references }) if references.len() == 2
        ));
    }

    #[test]
    fn test_operation_id_and_tags_predicate() {
        let doc = document(json!({
            "paths": {
                "/api/v1/a": {"get": {"operationId": "v1_a", "tags": ["고객 API"]}},
                "/api/v1/b": {"get": {"operationId": "v1_b", "tags": ["Internal"]}},
                "/api/v1/c": {"get": {"tags": ["고객 API"]}}
            }
        }));
        let segments = vec!["v1".to_string()];
        let include = vec!["고객 API".to_string()];
        let predicate = operation_id_and_tags(&segments, &include);

        let kept: Vec<&str> = doc
            .operations()
            .unwrap()
            .into_iter()
            .filter(|operation| predicate(operation))
            .map(|operation| operation.path)
            .collect();

        assert_eq!(kept, vec!["/api/v1/a"]);

        let any_tag = operation_id_and_tags(&segments, &[]);
        let kept = doc
            .operations()
            .unwrap()
            .iter()
            .filter(|operation| any_tag(operation))
            .count();
        assert_eq!(kept, 2);
    }
}
