//! `$ref` pointer 的解析與產生。

use std::fmt;

pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";
pub const COMPONENTS_REF_PREFIX: &str = "#/components/";

/// 指向 `components.schemas` 的本地 reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaRef {
    name: String,
}

impl SchemaRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// 只接受 `#/components/schemas/<Name>`，其他 pointer 回傳 `None`
    pub fn parse(pointer: &str) -> Option<Self> {
        schema_name(pointer).map(Self::new)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pointer(&self) -> String {
        schema_pointer(&self.name)
    }
}

impl fmt::Display for SchemaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", SCHEMA_REF_PREFIX, self.name)
    }
}

pub fn schema_pointer(name: &str) -> String {
    format!("{}{}", SCHEMA_REF_PREFIX, name)
}

pub fn schema_name(pointer: &str) -> Option<&str> {
    pointer
        .strip_prefix(SCHEMA_REF_PREFIX)
        .filter(|name| !name.is_empty() && !name.contains('/'))
}

/// 指向 schema 內部節點時（`#/components/schemas/A/properties/b`）取出最外層的 `A`
pub fn schema_root_name(pointer: &str) -> Option<&str> {
    pointer
        .strip_prefix(SCHEMA_REF_PREFIX)
        .and_then(|rest| rest.split('/').next())
        .filter(|name| !name.is_empty())
}

/// `#/components/<kind>/<Name>` 取出 `(kind, Name)`，更深的節點歸屬於最外層的 component
pub fn component_ref(pointer: &str) -> Option<(&str, &str)> {
    let mut segments = pointer.strip_prefix(COMPONENTS_REF_PREFIX)?.split('/');
    let kind = segments.next().filter(|kind| !kind.is_empty())?;
    let name = segments.next().filter(|name| !name.is_empty())?;
    Some((kind, name))
}

/// 是否為文件內部 pointer（`#/…`）
pub fn is_local_pointer(pointer: &str) -> bool {
    pointer.starts_with("#/")
}
