// SPDX-License-Identifier: MIT OR Apache-2.0
//! Schema migrations for project documents.
//!
//! `MIGRATIONS[i]` upgrades a raw document from version `i + 1` to `i + 2`.
//! Documents newer than the running application are never migrated.

use crate::import::ImportError;
use crate::project::CURRENT_SCHEMA_VERSION;
use serde_json::{Map, Value};
use tracing::debug;

/// Upgrade step over a raw document object
pub type Migration = fn(Map<String, Value>) -> Map<String, Value>;

/// Registered upgrade steps, oldest first
pub const MIGRATIONS: &[Migration] = &[];

/// Read `schemaVersion`, treating an absent value as version 1.
///
/// A version above `supported` is a [`ImportError::Version`]; anything that
/// is not a positive integer is a [`ImportError::Validation`].
pub fn schema_version(document: &Map<String, Value>, supported: u32) -> Result<u32, ImportError> {
    let Some(raw) = document.get("schemaVersion").filter(|v| !v.is_null()) else {
        return Ok(1);
    };
    let Some(number) = raw.as_f64() else {
        return Err(ImportError::Validation(format!(
            "schemaVersion must be a number, got {raw}"
        )));
    };
    if number > f64::from(supported) {
        return Err(ImportError::Version {
            found: raw.to_string(),
            supported,
        });
    }
    if number < 1.0 || number.fract() != 0.0 {
        return Err(ImportError::Validation(format!(
            "schemaVersion must be a positive integer, got {raw}"
        )));
    }
    Ok(number as u32)
}

/// Run `chain` from the document's version up to `supported`
pub fn migrate_with(
    mut document: Map<String, Value>,
    chain: &[Migration],
    supported: u32,
) -> Result<Map<String, Value>, ImportError> {
    let version = schema_version(&document, supported)?;

    for (index, migration) in chain.iter().enumerate().skip(version as usize - 1) {
        debug!(from = index + 1, to = index + 2, "Migrating project document");
        document = migration(document);
    }

    document.insert("schemaVersion".to_string(), Value::from(supported));
    Ok(document)
}

/// Upgrade a document to the current schema
pub fn migrate_to_latest(document: Map<String, Value>) -> Result<Map<String, Value>, ImportError> {
    migrate_with(document, MIGRATIONS, CURRENT_SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    fn rename_title(mut document: Map<String, Value>) -> Map<String, Value> {
        if let Some(title) = document.remove("title") {
            document.insert("name".to_string(), title);
        }
        document
    }

    fn add_characters(mut document: Map<String, Value>) -> Map<String, Value> {
        document.entry("characters").or_insert_with(|| json!([]));
        document
    }

    #[test]
    fn test_chain_matches_current_version() {
        assert_eq!(MIGRATIONS.len() + 1, CURRENT_SCHEMA_VERSION as usize);
    }

    #[test]
    fn test_missing_version_defaults_to_one() {
        assert_eq!(schema_version(&doc(json!({})), 1).unwrap(), 1);
        assert_eq!(schema_version(&doc(json!({"schemaVersion": null})), 1).unwrap(), 1);
        let migrated = migrate_to_latest(doc(json!({"name": "x"}))).unwrap();
        assert_eq!(migrated["schemaVersion"], json!(1));
    }

    #[test]
    fn test_newer_version_is_rejected() {
        let err = migrate_to_latest(doc(json!({"schemaVersion": 999}))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported schema version 999. Current version is 1. Please update the application."
        );
    }

    #[test]
    fn test_invalid_versions() {
        for bad in [json!(0), json!(-2), json!(0.5), json!("1")] {
            let err = schema_version(&doc(json!({"schemaVersion": bad})), 1).unwrap_err();
            assert!(matches!(err, ImportError::Validation(_)));
        }
    }

    #[test]
    fn test_chain_runs_from_document_version() {
        let chain: &[Migration] = &[rename_title, add_characters];

        let from_one = migrate_with(doc(json!({"title": "Old"})), chain, 3).unwrap();
        assert_eq!(from_one["name"], json!("Old"));
        assert_eq!(from_one["characters"], json!([]));
        assert_eq!(from_one["schemaVersion"], json!(3));

        // Version 2 documents skip the first step
        let from_two = migrate_with(doc(json!({"schemaVersion": 2, "title": "Kept"})), chain, 3).unwrap();
        assert_eq!(from_two["title"], json!("Kept"));
        assert!(from_two.get("name").is_none());
        assert_eq!(from_two["characters"], json!([]));
    }
}
