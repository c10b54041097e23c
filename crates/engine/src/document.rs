//! Loading activity descriptors from YAML or JSON documents.
//!
//! A document holds either a single descriptor or a list of descriptors.
//! Every descriptor, at any depth, selects its variant through `kind`.

use std::{fs, path::Path};

use anyhow::{Context, Result, bail};
use serde_json::Value as JsonValue;

use crate::{ACTIVITY_KINDS, ActivityDescriptor, ResolveError};

/// Reads and parses a descriptor document.
///
/// YAML is a superset of JSON, so both formats go through the YAML parser.
pub fn parse_activity_file(file_path: impl AsRef<Path>) -> Result<Vec<ActivityDescriptor>> {
    let file_path = file_path.as_ref();
    let file_content =
        fs::read_to_string(file_path).with_context(|| format!("Failed to read activity file: {}", file_path.display()))?;
    parse_activity_str(&file_content).with_context(|| format!("Failed to parse activity file: {}", file_path.display()))
}

/// Parses descriptor document text.
pub fn parse_activity_str(content: &str) -> Result<Vec<ActivityDescriptor>> {
    let document: JsonValue = serde_yaml::from_str(content).context("document is not valid YAML or JSON")?;
    let entries = match document {
        JsonValue::Array(entries) => entries,
        JsonValue::Object(_) => vec![document],
        JsonValue::Null => Vec::new(),
        _ => bail!("expected an activity descriptor or a list of activity descriptors"),
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            check_kinds(&entry)?;
            serde_json::from_value(entry).with_context(|| format!("invalid activity descriptor at index {index}"))
        })
        .collect()
}

/// Rejects unknown `kind` values before deserialization so they surface as
/// [`ResolveError::UnknownActivity`] instead of a generic serde message.
fn check_kinds(entry: &JsonValue) -> Result<(), ResolveError> {
    let JsonValue::Object(map) = entry else {
        return Ok(());
    };
    if let Some(kind) = map.get("kind").and_then(JsonValue::as_str)
        && !ACTIVITY_KINDS.contains(&kind)
    {
        return Err(ResolveError::UnknownActivity { kind: kind.to_string() });
    }
    if let Some(JsonValue::Array(children)) = map.get("activities") {
        for child in children {
            check_kinds(child)?;
        }
    }
    if let Some(body) = map.get("activity") {
        check_kinds(body)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_descriptor_list_from_a_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let document_path = temp_dir.path().join("service.yaml");
        let document_content = r#"
- kind: workflow
  name: Test
  activities:
    - kind: resource
      name: X
      input: [a, b]
      state:
        type: My::MyRes
        value: { name: bob, phone: "555" }
- kind: action
  name: Ping
  interface: TheApi
"#;
        fs::write(&document_path, document_content).unwrap();

        let descriptors = parse_activity_file(&document_path).expect("parse descriptor list");
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].name(), "Test");
        assert_eq!(descriptors[1].type_name(), "Action");
    }

    #[test]
    fn parses_a_single_json_descriptor() {
        let descriptors = parse_activity_str(r#"{"kind": "action", "name": "Ping"}"#).expect("parse json");
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].name(), "Ping");
    }

    #[test]
    fn unknown_kind_is_reported_at_any_depth() {
        let document_content = r#"
kind: workflow
name: Test
activities:
  - kind: deploy
    name: X
"#;
        let error = parse_activity_str(document_content).expect_err("unknown kind must fail");
        assert_eq!(
            error.downcast_ref::<ResolveError>(),
            Some(&ResolveError::UnknownActivity { kind: "deploy".into() })
        );
    }

    #[test]
    fn missing_file_mentions_the_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing_path = temp_dir.path().join("missing.yaml");
        let error = parse_activity_file(&missing_path).expect_err("missing file must fail");
        assert!(error.to_string().contains("missing.yaml"));
    }
}
