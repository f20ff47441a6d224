pub mod closure;
pub mod combine;
pub mod dedupe;
pub mod equality;
pub mod etl;
pub mod examples;
pub mod operations;
pub mod overlays;
pub mod reference;
pub mod tagging;
pub mod visitor;

pub use crate::domain::model::{ServiceDocuments, SpecDocument, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
