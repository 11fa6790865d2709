pub mod completion;
pub mod config;
pub mod ingest;
pub mod run;
pub mod templates;
pub mod version;
