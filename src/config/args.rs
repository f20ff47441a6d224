use crate::core::combine::Envelope;
use crate::core::ConfigProvider;
use crate::domain::model::EnumRewrite;
use crate::domain::ports::PublishSettings;
use crate::utils::error::{CombineError, Result};
use crate::utils::validation::{
    validate_identifier, validate_json_file_name, validate_non_empty_list, validate_path,
    validate_url, Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "spec-combiner")]
#[command(about = "Merge per-service OpenAPI documents and prune them per API segment")]
pub struct CliConfig {
    #[arg(long, default_value = "./service", help = "Directory holding one <service>.json per service")]
    pub input_dir: String,

    #[arg(long, default_value = "./merge")]
    pub merged_dir: String,

    #[arg(long, default_value = "./gateway")]
    pub gateway_dir: String,

    #[arg(long, default_value = "./complete")]
    pub complete_dir: String,

    #[arg(
        long,
        value_delimiter = ',',
        default_value = "account,notification,payment,product,storage,store,usage_record"
    )]
    pub services: Vec<String>,

    #[arg(long, env = "API_SEGMENT", value_delimiter = ',', default_value = "all")]
    pub segment: Vec<String>,

    #[arg(long, value_delimiter = ',', default_value = "v1")]
    pub gateway_segments: Vec<String>,

    #[arg(long, default_value = "Combined API")]
    pub title: String,

    #[arg(long, default_value = "https://api.example.com")]
    pub server_url: String,

    #[arg(long, help = "Header name of a shared apiKey credential")]
    pub security_header: Option<String>,

    #[arg(
        long = "enum-rewrites",
        value_name = "JSON_FILE",
        help = "JSON file with [{\"from\": [...], \"to\": [...]}] enum rewrite rules"
    )]
    pub enum_rewrites_file: Option<String>,

    /// 由 `enum_rewrites_file` 載入
    #[arg(skip)]
    #[serde(default)]
    pub enum_rewrites: Vec<EnumRewrite>,

    #[arg(long, help = "Fail when the output keeps a $ref to a missing component")]
    pub strict_refs: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per pipeline phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,
}

impl CliConfig {
    /// 讀取 `--enum-rewrites` 指定的規則檔
    pub fn load_enum_rewrites(mut self) -> Result<Self> {
        let Some(path) = &self.enum_rewrites_file else {
            return Ok(self);
        };
        let content = std::fs::read_to_string(path).map_err(CombineError::IoError)?;
        self.enum_rewrites =
            serde_json::from_str(&content).map_err(|e| CombineError::ConfigValidationError {
                field: "enum_rewrites_file".to_string(),
                message: format!("{}: {}", path, e),
            })?;
        tracing::debug!("🔤 Loaded {} enum rewrite rules from {}", self.enum_rewrites.len(), path);
        Ok(self)
    }
}

impl ConfigProvider for CliConfig {
    fn input_dir(&self) -> &str {
        &self.input_dir
    }

    fn services(&self) -> &[String] {
        &self.services
    }

    fn segments(&self) -> &[String] {
        &self.segment
    }

    fn gateway_segments(&self) -> &[String] {
        &self.gateway_segments
    }

    fn merged_dir(&self) -> &str {
        &self.merged_dir
    }

    fn gateway_dir(&self) -> &str {
        &self.gateway_dir
    }

    fn complete_dir(&self) -> &str {
        &self.complete_dir
    }

    fn envelope(&self) -> Envelope {
        Envelope {
            title: self.title.clone(),
            server_url: self.server_url.clone(),
            security_header: self.security_header.clone(),
            ..Envelope::default()
        }
    }

    fn enum_rewrites(&self) -> &[EnumRewrite] {
        &self.enum_rewrites
    }

    fn strict_references(&self) -> bool {
        self.strict_refs
    }

    fn publish(&self) -> Option<PublishSettings> {
        None
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input_dir", &self.input_dir)?;
        validate_path("merged_dir", &self.merged_dir)?;
        validate_path("gateway_dir", &self.gateway_dir)?;
        validate_non_empty_list("services", &self.services)?;
        for service in &self.services {
            validate_identifier("services", service)?;
        }
        validate_non_empty_list("segment", &self.segment)?;
        for segment in &self.segment {
            validate_identifier("segment", segment)?;
        }
        validate_url("server_url", &self.server_url)?;
        if let Some(path) = &self.enum_rewrites_file {
            validate_json_file_name("enum_rewrites_file", path)?;
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
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_cli_defaults() {
        let config = CliConfig::parse_from(["spec-combiner"]);

        assert_eq!(config.input_dir(), "./service");
        assert_eq!(config.services().len(), 7);
        assert_eq!(config.gateway_segments(), &["v1".to_string()]);
        assert!(!config.strict_references());
        assert!(config.publish().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_lists_and_envelope() {
        let config = CliConfig::parse_from([
            "spec-combiner",
            "--services",
            "account,store",
            "--segment",
            "v1,admin",
            "--security-header",
            "Secret-Token",
            "--strict-refs",
        ]);

        assert_eq!(config.services(), &["account".to_string(), "store".to_string()]);
        assert_eq!(config.segments(), &["v1".to_string(), "admin".to_string()]);
        assert!(config.strict_references());
        let envelope = config.envelope();
        assert_eq!(envelope.security_header.as_deref(), Some("Secret-Token"));
        assert_eq!(envelope.version, "1.0");
    }

    #[test]
    fn test_cli_loads_enum_rewrites() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"from": ["갱신 결제", "단건 주문"], "to": ["RECURRING", "ONE_TIME"]}}]"#
        )
        .unwrap();
        let path = file.path().to_string_lossy().to_string();

        let config = CliConfig::parse_from(["spec-combiner", "--enum-rewrites", path.as_str()])
            .load_enum_rewrites()
            .unwrap();

        assert_eq!(config.enum_rewrites().len(), 1);
        assert_eq!(config.enum_rewrites()[0].to, vec![json!("RECURRING"), json!("ONE_TIME")]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_without_enum_rewrites() {
        let config = CliConfig::parse_from(["spec-combiner"]).load_enum_rewrites().unwrap();
        assert!(config.enum_rewrites().is_empty());
    }

    #[test]
    fn test_cli_rejects_unreadable_enum_rewrites() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "not json").unwrap();
        let path = file.path().to_string_lossy().to_string();

        let err = CliConfig::parse_from(["spec-combiner", "--enum-rewrites", path.as_str()])
            .load_enum_rewrites()
            .unwrap_err();

        assert!(matches!(err, CombineError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_cli_validation_rejects_bad_service() {
        let config = CliConfig::parse_from(["spec-combiner", "--services", "../account"]);
        assert!(config.validate().is_err());
    }
}
