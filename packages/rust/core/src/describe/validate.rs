//! Output-shape validation for module records.
//!
//! Every describer's output passes through [`validate`], and callers can use it
//! directly to sanitize records from elsewhere.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use docmodules_shared::ModuleRecord;

/// Normalize raw records into [`ModuleRecord`]s.
///
/// A record must be an object with `module` and `Description`; both are
/// stringified and trimmed, and the record is dropped if either ends up empty.
/// `Submodules` is kept only when it is an object; entries with an empty name
/// or description are dropped. Anything else is dropped without error.
pub fn validate(records: &[Value]) -> Vec<ModuleRecord> {
    let validated: Vec<ModuleRecord> = records.iter().filter_map(validate_record).collect();

    let dropped = records.len() - validated.len();
    if dropped > 0 {
        debug!(dropped, kept = validated.len(), "dropped malformed records");
    }

    validated
}

fn validate_record(value: &Value) -> Option<ModuleRecord> {
    let object = value.as_object()?;

    let module = required_field(object.get("module"))?;
    let description = required_field(object.get("Description"))?;

    let submodules = match object.get("Submodules") {
        Some(Value::Object(entries)) => entries
            .iter()
            .filter_map(|(name, desc)| {
                let name = name.trim();
                let desc = required_field(Some(desc))?;
                (!name.is_empty()).then(|| (name.to_string(), desc))
            })
            .collect(),
        _ => BTreeMap::new(),
    };

    Some(ModuleRecord {
        module,
        description,
        submodules,
    })
}

/// Stringify and trim a field; missing, null, and blank values yield `None`.
fn required_field(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    };
    (!text.is_empty()).then_some(text)
}
