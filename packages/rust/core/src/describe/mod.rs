//! Module description: structured modules → validated [`ModuleRecord`]s.
//!
//! Two interchangeable [`Describer`]s exist: [`ServiceDescriber`] (external
//! chat-completion service) and [`HeuristicDescriber`] (rule tables). The
//! caller picks the primary one; the heuristic path is always the fallback,
//! and every result passes through [`validate`].

pub mod heuristic;
pub mod service;
pub mod validate;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use docmodules_shared::{ModuleRecord, Result, ServiceConfig, StructuredModules};

pub use heuristic::HeuristicDescriber;
pub use service::ServiceDescriber;
pub use validate::validate;

/// Turns structured modules into raw (unvalidated) module records.
#[async_trait]
pub trait Describer: Send + Sync {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &'static str;

    /// Describe all modules. Records need not be validated yet.
    async fn describe(&self, structured: &StructuredModules) -> Result<Vec<Value>>;
}

/// Validated records and the describer that produced them.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub records: Vec<ModuleRecord>,
    pub describer: &'static str,
}

/// Describe `structured`, using the service when a config is supplied.
///
/// Never fails: a missing credential, a service failure, or an unusable
/// service response all fall through to the heuristic describer.
pub async fn extract(
    structured: &StructuredModules,
    service: Option<&ServiceConfig>,
) -> Vec<ModuleRecord> {
    let primary = service_describer(service);

    extract_with(structured, primary.as_ref().map(|d| d as &dyn Describer))
        .await
        .records
}

/// Build the service describer when a config is supplied and usable.
pub fn service_describer(service: Option<&ServiceConfig>) -> Option<ServiceDescriber> {
    service.and_then(|config| match ServiceDescriber::new(config.clone()) {
        Ok(describer) => Some(describer),
        Err(e) => {
            warn!(error = %e, "service describer unavailable, using heuristics");
            None
        }
    })
}

/// Describe `structured` with an optional primary describer.
#[instrument(skip_all, fields(modules = structured.len(), primary = primary.map(|d| d.name())))]
pub async fn extract_with(
    structured: &StructuredModules,
    primary: Option<&dyn Describer>,
) -> Extraction {
    if let Some(describer) = primary.filter(|_| !structured.is_empty()) {
        match describer.describe(structured).await {
            Ok(raw) => {
                let records = validate(&raw);
                if !records.is_empty() {
                    info!(describer = describer.name(), records = records.len(), "modules described");
                    return Extraction {
                        records,
                        describer: describer.name(),
                    };
                }
                warn!(describer = describer.name(), raw = raw.len(), "no usable records, falling back");
            }
            Err(e) => {
                warn!(describer = describer.name(), error = %e, "describer failed, falling back");
            }
        }
    }

    let fallback = HeuristicDescriber;
    let records = match fallback.describe(structured).await {
        Ok(raw) => validate(&raw),
        Err(e) => {
            error!(error = %e, "heuristic describer failed");
            Vec::new()
        }
    };

    info!(describer = fallback.name(), records = records.len(), "modules described");
    Extraction {
        records,
        describer: fallback.name(),
    }
}

#[cfg(test)]
mod tests {
    use docmodules_shared::{DocModulesError, StructuredModule};
    use serde_json::json;

    use super::*;

    struct Fixed(Result<Vec<Value>>);

    #[async_trait]
    impl Describer for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn describe(&self, _structured: &StructuredModules) -> Result<Vec<Value>> {
            match &self.0 {
                Ok(values) => Ok(values.clone()),
                Err(e) => Err(DocModulesError::Service(e.to_string())),
            }
        }
    }

    fn billing() -> StructuredModules {
        let mut structured = StructuredModules::new();
        structured.insert("Billing".into(), StructuredModule::default());
        structured
    }

    #[tokio::test]
    async fn no_credential_uses_heuristics() {
        let records = extract(&billing(), None).await;
        assert_eq!(records.len(), 1);
        assert!(records[0].description.contains("Billing and Payments"));
    }

    #[tokio::test]
    async fn empty_input_yields_empty_output() {
        let primary = Fixed(Ok(vec![json!({"module": "X", "Description": "Y"})]));
        let out = extract_with(&StructuredModules::new(), Some(&primary)).await;
        assert!(out.records.is_empty());
        assert_eq!(out.describer, "heuristic");
    }

    #[tokio::test]
    async fn primary_records_are_validated() {
        let primary = Fixed(Ok(vec![
            json!({"module": " Payments ", "Description": "Cards and invoices"}),
            json!({"module": "Broken"}),
        ]));

        let out = extract_with(&billing(), Some(&primary)).await;

        assert_eq!(out.describer, "fixed");
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].module, "Payments");
    }

    #[tokio::test]
    async fn failure_falls_back() {
        let primary = Fixed(Err(DocModulesError::Service("boom".into())));
        let out = extract_with(&billing(), Some(&primary)).await;
        assert_eq!(out.describer, "heuristic");
        assert_eq!(out.records[0].module, "Billing");
    }

    #[tokio::test]
    async fn unusable_output_falls_back() {
        let primary = Fixed(Ok(vec![json!({"Description": "no name"})]));
        let out = extract_with(&billing(), Some(&primary)).await;
        assert_eq!(out.describer, "heuristic");
        assert_eq!(out.records.len(), 1);
    }
}
