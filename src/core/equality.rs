//! 判斷兩個 schema component 在結構上是否相同。

use serde_json::{Map, Value};

/// 比較時忽略的純說明欄位
pub const IGNORED_KEYS: [&str; 1] = ["description"];

/// 深度比較兩個 schema，任何層級的 `description` 都不列入比較。
///
/// object 的 key 順序無關，array 的元素順序有關。不修改也不複製輸入。
pub fn components_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Object(left), Value::Object(right)) => objects_equal(left, right),
        (Value::Array(left), Value::Array(right)) => {
            left.len() == right.len()
                && left
                    .iter()
                    .zip(right.iter())
                    .all(|(l, r)| components_equal(l, r))
        }
        _ => left == right,
    }
}

fn objects_equal(left: &Map<String, Value>, right: &Map<String, Value>) -> bool {
    let compared = |map: &Map<String, Value>| {
        map.keys()
            .filter(|key| !is_ignored(key))
            .count()
    };
    if compared(left) != compared(right) {
        return false;
    }

    left.iter()
        .filter(|(key, _)| !is_ignored(key))
        .all(|(key, value)| match right.get(key) {
            Some(other) => components_equal(value, other),
            None => false,
        })
}

fn is_ignored(key: &str) -> bool {
    IGNORED_KEYS.contains(&key)
}
