// Domain layer: OpenAPI document model and ports (interfaces).

pub mod model;
pub mod ports;
