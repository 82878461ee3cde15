//! Pipeline module.
//!
//! This module provides the ETL driver and its stage markers.

mod builder;
pub mod stage;

pub use builder::{EtlPipeline, EtlPipelineBuilder};
pub use stage::EtlStage;
