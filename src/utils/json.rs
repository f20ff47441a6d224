use crate::utils::error::Result;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

/// 以指定縮排寬度輸出 JSON，合併結果用 4，發佈結果用 2
pub fn to_pretty_json<T: Serialize>(value: &T, indent: usize) -> Result<Vec<u8>> {
    let indent = " ".repeat(indent);
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    Ok(buffer)
}

pub fn spec_file_name(stem: &str) -> String {
    format!("{}.json", stem)
}

/// `dir/file`，dir 為空或 `.` 時直接回傳 file
pub fn join_path(dir: &str, file: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() || dir == "." {
        file.to_string()
    } else {
        format!("{}/{}", dir, file)
    }
}
