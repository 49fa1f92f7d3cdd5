//! Shared types, error model, and configuration for docmodules.
//!
//! This crate is the foundation depended on by all other docmodules crates.
//! It provides:
//! - [`DocModulesError`]: the unified error type
//! - Domain types ([`PageRecord`], [`StructuredModule`], [`ModuleRecord`])
//! - Configuration ([`AppConfig`], [`CrawlConfig`], [`ServiceConfig`], config loading)
//! - Tracing setup ([`init_tracing`])

pub mod config;
pub mod error;
pub mod telemetry;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CrawlConfig, CrawlSection, ExtractionSection, OpenAiSection, ServiceConfig,
    USER_AGENT, config_dir, config_file_path, init_config, load_config, load_config_from,
    resolve_api_key,
};
pub use error::{DocModulesError, Result};
pub use telemetry::{LogFormat, init_tracing};
pub use types::{
    ContentItem, ModuleGroups, ModuleRecord, PageRecord, StructuredModule, StructuredModules,
    records_to_json,
};
