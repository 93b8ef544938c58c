pub mod config;
pub mod domain;
pub mod ingest;
pub mod pipeline;
pub mod scoring;
pub mod time;
