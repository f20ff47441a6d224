use crate::core::combine::Envelope;
use crate::core::tagging::DEFAULT_UNMAPPED_LABEL;
use crate::core::ConfigProvider;
use crate::domain::model::EnumRewrite;
use crate::domain::ports::PublishSettings;
use crate::utils::error::{CombineError, Result};
use crate::utils::validation::{
    validate_identifier, validate_json_file_name, validate_non_empty_list,
    validate_non_empty_string, validate_path, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub project: ProjectConfig,
    #[serde(default)]
    pub envelope: Envelope,
    pub sources: SourcesConfig,
    #[serde(default)]
    pub output: OutputConfig,
    pub segments: SegmentsConfig,
    #[serde(default)]
    pub references: ReferencesConfig,
    pub publish: Option<PublishConfig>,
    #[serde(default)]
    pub enum_rewrites: Vec<EnumRewrite>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_input_dir")]
    pub input_dir: String,
    pub services: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_merged_dir")]
    pub merged_dir: String,
    #[serde(default = "default_gateway_dir")]
    pub gateway_dir: String,
    #[serde(default = "default_complete_dir")]
    pub complete_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            merged_dir: default_merged_dir(),
            gateway_dir: default_gateway_dir(),
            complete_dir: default_complete_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentsConfig {
    pub selected: Vec<String>,
    #[serde(default = "default_gateway_segments")]
    pub gateway: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferencesConfig {
    /// 有無法解析的 `$ref` 時中止
    #[serde(default)]
    pub strict: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    pub source: String,
    pub title: String,
    pub segments: Vec<String>,
    #[serde(default)]
    pub include_tags: Vec<String>,
    #[serde(default = "default_unmapped_label")]
    pub unmapped_label: String,
    pub tag_map: String,
    pub required_map: Option<String>,
    pub example_map: Option<String>,
    pub extension_map: Option<String>,
    pub output_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

fn default_input_dir() -> String {
    "./service".to_string()
}

fn default_merged_dir() -> String {
    "./merge".to_string()
}

fn default_gateway_dir() -> String {
    "./gateway".to_string()
}

fn default_complete_dir() -> String {
    "./complete".to_string()
}

fn default_gateway_segments() -> Vec<String> {
    vec!["v1".to_string()]
}

fn default_unmapped_label() -> String {
    DEFAULT_UNMAPPED_LABEL.to_string()
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CombineError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| CombineError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_SEGMENT})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CombineError::ConfigError {
            message: format!("invalid placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 以命令列指定的 segment 取代設定檔中的 segment
    pub fn with_segments(mut self, segments: Vec<String>) -> Self {
        if !segments.is_empty() {
            self.segments.selected = segments;
        }
        self
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("project.name", &self.project.name)?;

        validate_path("sources.input_dir", &self.sources.input_dir)?;
        validate_non_empty_list("sources.services", &self.sources.services)?;
        for service in &self.sources.services {
            validate_identifier("sources.services", service)?;
        }

        validate_path("output.merged_dir", &self.output.merged_dir)?;
        validate_path("output.gateway_dir", &self.output.gateway_dir)?;
        validate_path("output.complete_dir", &self.output.complete_dir)?;

        validate_non_empty_list("segments.selected", &self.segments.selected)?;
        for segment in &self.segments.selected {
            validate_identifier("segments.selected", segment)?;
        }

        validate_non_empty_string("envelope.title", &self.envelope.title)?;
        validate_url("envelope.server_url", &self.envelope.server_url)?;
        if let Some(header) = &self.envelope.security_header {
            validate_non_empty_string("envelope.security_header", header)?;
        }

        for (index, rule) in self.enum_rewrites.iter().enumerate() {
            if rule.from.is_empty() {
                return Err(CombineError::InvalidConfigValueError {
                    field: format!("enum_rewrites[{}].from", index),
                    value: "[]".to_string(),
                    reason: "An enum rewrite needs at least one source value".to_string(),
                });
            }
        }

        if let Some(publish) = &self.publish {
            validate_identifier("publish.source", &publish.source)?;
            validate_non_empty_string("publish.title", &publish.title)?;
            validate_non_empty_list("publish.segments", &publish.segments)?;
            validate_non_empty_string("publish.unmapped_label", &publish.unmapped_label)?;
            validate_json_file_name("publish.tag_map", &publish.tag_map)?;
            for (field, path) in [
                ("publish.required_map", &publish.required_map),
                ("publish.example_map", &publish.example_map),
                ("publish.extension_map", &publish.extension_map),
            ] {
                if let Some(path) = path {
                    validate_json_file_name(field, path)?;
                }
            }
            validate_json_file_name("publish.output_file", &publish.output_file)?;
        }

        Ok(())
    }

    /// 取得監控設定
    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }
}

impl From<&PublishConfig> for PublishSettings {
    fn from(config: &PublishConfig) -> Self {
        Self {
            source: config.source.clone(),
            title: config.title.clone(),
            segments: config.segments.clone(),
            include_tags: config.include_tags.clone(),
            unmapped_label: config.unmapped_label.clone(),
            tag_map: config.tag_map.clone(),
            required_map: config.required_map.clone(),
            example_map: config.example_map.clone(),
            extension_map: config.extension_map.clone(),
            output_file: config.output_file.clone(),
        }
    }
}

impl ConfigProvider for TomlConfig {
    fn input_dir(&self) -> &str {
        &self.sources.input_dir
    }

    fn services(&self) -> &[String] {
        &self.sources.services
    }

    fn segments(&self) -> &[String] {
        &self.segments.selected
    }

    fn gateway_segments(&self) -> &[String] {
        &self.segments.gateway
    }

    fn merged_dir(&self) -> &str {
        &self.output.merged_dir
    }

    fn gateway_dir(&self) -> &str {
        &self.output.gateway_dir
    }

    fn complete_dir(&self) -> &str {
        &self.output.complete_dir
    }

    fn envelope(&self) -> Envelope {
        self.envelope.clone()
    }

    fn enum_rewrites(&self) -> &[EnumRewrite] {
        &self.enum_rewrites
    }

    fn strict_references(&self) -> bool {
        self.references.strict
    }

    fn publish(&self) -> Option<PublishSettings> {
        self.publish.as_ref().map(PublishSettings::from)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[project]
name = "api-docs"

[sources]
services = ["account", "payment"]

[segments]
selected = ["v1"]
"#;

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let config = TomlConfig::from_toml_str(MINIMAL).unwrap();

        assert_eq!(config.input_dir(), "./service");
        assert_eq!(config.merged_dir(), "./merge");
        assert_eq!(config.gateway_dir(), "./gateway");
        assert_eq!(config.complete_dir(), "./complete");
        assert_eq!(config.gateway_segments(), &["v1".to_string()]);
        assert_eq!(config.envelope(), Envelope::default());
        assert!(!config.strict_references());
        assert!(config.publish().is_none());
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[project]
name = "api-docs"
description = "Public API documentation"
version = "2.0"

[envelope]
title = "Shop API"
version = "1.0"
server_url = "https://api.shop.example"
server_description = "Production"
security_header = "Secret-Token"

[sources]
input_dir = "./downloaded"
services = ["account", "store", "usage_record"]

[output]
merged_dir = "./out/merge"

[segments]
selected = ["v1", "admin"]
gateway = ["v1", "v2"]

[references]
strict = true

[publish]
source = "v1"
title = "Shop"
segments = ["v1"]
include_tags = ["Customers", "Orders"]
tag_map = "./v1/spec-tag.json"
example_map = "./v1/spec-example.json"
output_file = "shop_v1.json"

[[enum_rewrites]]
from = ["갱신 결제", "단건 주문"]
to = ["RECURRING", "ONE_TIME"]

[monitoring]
enabled = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.services().len(), 3);
        assert_eq!(config.merged_dir(), "./out/merge");
        assert_eq!(config.gateway_dir(), "./gateway");
        assert_eq!(config.segments(), &["v1".to_string(), "admin".to_string()]);
        assert!(config.strict_references());
        assert_eq!(config.envelope().security_header.as_deref(), Some("Secret-Token"));
        assert_eq!(config.envelope().security_scheme, "apiKey");
        assert_eq!(config.enum_rewrites()[0].to, vec![json!("RECURRING"), json!("ONE_TIME")]);
        assert!(config.monitoring_enabled());

        let publish = config.publish().unwrap();
        assert_eq!(publish.unmapped_label, DEFAULT_UNMAPPED_LABEL);
        assert_eq!(publish.include_tags, vec!["Customers", "Orders"]);
        assert!(publish.required_map.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SPEC_COMBINER_TEST_SEGMENT", "admin");

        let toml_content = r#"
[project]
name = "test"

[sources]
services = ["account"]

[segments]
selected = ["${SPEC_COMBINER_TEST_SEGMENT}"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.segments(), &["admin".to_string()]);

        std::env::remove_var("SPEC_COMBINER_TEST_SEGMENT");
    }

    #[test]
    fn test_with_segments_overrides_file() {
        let config = TomlConfig::from_toml_str(MINIMAL)
            .unwrap()
            .with_segments(vec!["all".to_string()]);
        assert_eq!(config.segments(), &["all".to_string()]);

        let unchanged = TomlConfig::from_toml_str(MINIMAL).unwrap().with_segments(Vec::new());
        assert_eq!(unchanged.segments(), &["v1".to_string()]);
    }

    #[test]
    fn test_config_validation() {
        let bad_service = MINIMAL.replace("\"payment\"", "\"../payment\"");
        let config = TomlConfig::from_toml_str(&bad_service).unwrap();
        assert!(config.validate().is_err());

        let no_segments = MINIMAL.replace("selected = [\"v1\"]", "selected = []");
        let config = TomlConfig::from_toml_str(&no_segments).unwrap();
        assert!(matches!(
            config.validate(),
            Err(CombineError::MissingConfigError { .. })
        ));

        let bad_publish = format!(
            "{}\n[publish]\nsource = \"v1\"\ntitle = \"t\"\nsegments = [\"v1\"]\ntag_map = \"tags.yaml\"\noutput_file = \"out.json\"\n",
            MINIMAL
        );
        let config = TomlConfig::from_toml_str(&bad_publish).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_error_is_config_error() {
        let err = TomlConfig::from_toml_str("[project\nname = 1").unwrap_err();
        assert!(matches!(err, CombineError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.project.name, "api-docs");
    }
}
