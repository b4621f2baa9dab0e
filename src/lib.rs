pub mod imaging_pipeline;
pub mod logger;
