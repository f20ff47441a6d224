pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::pipelines::{
    GatewayPipeline, MergePipeline, PipelineResult, PipelineSequence, PublishPipeline,
};
pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use core::etl::SpecEngine;
pub use utils::error::{CombineError, Result};
