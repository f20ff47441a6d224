//! 把外部提供的範例整塊寫入 request / response 的 `examples`。

use crate::domain::model::{is_http_method, ExampleEntry, ExampleMap, SpecDocument};
use serde_json::{Map, Value};

const REQUEST_MEDIA_TYPE: &str = "application/json";
const RESPONSE_MEDIA_TYPE: &str = "*/*";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExampleReport {
    pub request_bodies: usize,
    pub responses: usize,
    /// 對照表中找不到對應 operation 的 `METHOD path`
    pub unmatched: Vec<String>,
}

impl ExampleReport {
    pub fn applied(&self) -> usize {
        self.request_bodies + self.responses
    }
}

/// 依 path + method 套用範例。
///
/// `requestBody` 範例寫入 `requestBody.content["application/json"].examples`；
/// `responses` 範例寫入第一個 response 的 `content["*/*"].examples`。
/// 目標 media type 不存在時略過，已存在的 `examples` 直接被取代。
pub fn apply_examples(document: &mut SpecDocument, examples: &ExampleMap) -> ExampleReport {
    let mut report = ExampleReport::default();
    let paths = document.paths_mut();

    for (path, methods) in examples {
        for (method, entry) in methods {
            let operation = paths
                .get_mut(path)
                .and_then(Value::as_object_mut)
                .filter(|_| is_http_method(method))
                .and_then(|item| item.get_mut(method))
                .and_then(Value::as_object_mut);

            let Some(operation) = operation else {
                report.unmatched.push(format!("{} {}", method.to_uppercase(), path));
                continue;
            };

            apply_entry(operation, entry, &mut report);
        }
    }

    if !report.unmatched.is_empty() {
        tracing::debug!(
            "📝 {} example entries without a matching operation",
            report.unmatched.len()
        );
    }

    report
}

fn apply_entry(operation: &mut Map<String, Value>, entry: &ExampleEntry, report: &mut ExampleReport) {
    if let Some(examples) = &entry.request_body {
        let target = operation
            .get_mut("requestBody")
            .and_then(|body| body.get_mut("content"))
            .and_then(|content| content.get_mut(REQUEST_MEDIA_TYPE))
            .and_then(Value::as_object_mut);
        if let Some(media) = target {
            media.insert("examples".to_string(), examples.clone());
            report.request_bodies += 1;
        }
    }

    if let Some(examples) = &entry.responses {
        let target = operation
            .get_mut("responses")
            .and_then(Value::as_object_mut)
            .and_then(|responses| responses.values_mut().next())
            .and_then(|response| response.get_mut("content"))
            .and_then(|content| content.get_mut(RESPONSE_MEDIA_TYPE))
            .and_then(Value::as_object_mut);
        if let Some(media) = target {
            media.insert("examples".to_string(), examples.clone());
            report.responses += 1;
        }
    }
}
