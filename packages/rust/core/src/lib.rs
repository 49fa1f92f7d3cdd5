//! Module description and end-to-end orchestration for docmodules.
//!
//! - [`describe`]: heuristic and service-backed describers, plus [`validate`]
//! - [`pipeline`]: seeds → crawl → structure → describe, with progress reporting
//! - [`seeds`]: URL list parsing and validation

pub mod describe;
pub mod pipeline;
pub mod seeds;

pub use describe::{
    Describer, Extraction, HeuristicDescriber, ServiceDescriber, extract, extract_with, validate,
};
pub use pipeline::{
    ExtractionConfig, ExtractionReport, ExtractionStatus, ProgressReporter, SilentProgress,
    run_extraction,
};
pub use seeds::{parse_url_list, read_url_file, validate_urls};
