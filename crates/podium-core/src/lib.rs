pub mod config;
pub mod disagreement;
pub mod divisions;
pub mod engine;
pub mod errors;
pub mod families;
pub mod fingerprint;
pub mod ingest;
pub mod model;
pub mod ranking;
pub mod rankings_api;
pub mod registry;
pub mod report;
pub mod scoring;
pub mod table;
