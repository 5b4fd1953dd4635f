//! TOML loading with provenance
//!
//! Every file read is recorded with the SHA-256 of its raw bytes so a
//! driver can tell when argument inputs changed.

use build_args_value::{KeyValueMap, Origin, Value};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use super::ConfigError;

/// A file that contributed argument values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSource {
    /// Path as given to the loader
    pub path: String,

    /// SHA-256 digest of the raw file bytes
    pub digest: String,
}

/// Read a TOML file, returning its text and provenance.
pub(crate) fn load_toml_file(path: &Path) -> Result<(String, ConfigSource), ConfigError> {
    let display = path.display().to_string();
    let bytes = fs::read(path).map_err(|e| ConfigError::IoError {
        path: display.clone(),
        message: e.to_string(),
    })?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hex::encode(hasher.finalize());

    let contents = String::from_utf8(bytes).map_err(|e| ConfigError::ParseError {
        path: display.clone(),
        message: format!("Invalid UTF-8: {}", e),
    })?;

    Ok((
        contents,
        ConfigSource {
            path: display,
            digest,
        },
    ))
}

/// Convert a TOML value, attributing it (and every nested value) to `origin`.
///
/// Floats and datetimes have no build-file equivalent and become strings.
pub fn toml_to_value(toml: toml::Value, origin: &Origin) -> Value {
    let value = match toml {
        toml::Value::String(s) => Value::string(s),
        toml::Value::Integer(i) => Value::integer(i),
        toml::Value::Float(f) => Value::string(f.to_string()),
        toml::Value::Boolean(b) => Value::boolean(b),
        toml::Value::Datetime(dt) => Value::string(dt.to_string()),
        toml::Value::Array(items) => Value::list(
            items
                .into_iter()
                .map(|item| toml_to_value(item, origin))
                .collect(),
        ),
        toml::Value::Table(table) => Value::scope(table_to_map(table, origin)),
    };
    value.with_origin(origin.clone())
}

/// Convert a TOML table into a name → value map.
pub fn table_to_map(table: toml::Table, origin: &Origin) -> KeyValueMap {
    table
        .into_iter()
        .map(|(name, value)| (name, toml_to_value(value, origin)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use build_args_value::ValueKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_toml_to_value() {
        let table: toml::Table = toml::from_str(
            r#"
            name = "x"
            count = 3
            ratio = 0.5
            enabled = true
            list = [1, 2]
            [nested]
            inner = "y"
            "#,
        )
        .unwrap();
        let origin = Origin::file("args.toml");
        let map = table_to_map(table, &origin);

        assert_eq!(map["name"], Value::string("x"));
        assert_eq!(map["count"], Value::integer(3));
        assert_eq!(map["ratio"], Value::string("0.5"));
        assert_eq!(map["enabled"], Value::boolean(true));
        assert_eq!(map["list"], Value::list(vec![Value::integer(1), Value::integer(2)]));
        assert!(matches!(map["nested"].kind(), ValueKind::Scope(inner) if inner["inner"] == Value::string("y")));
        assert_eq!(map["name"].origin(), Some(&origin));
        assert_eq!(map["list"].as_list().unwrap()[0].origin(), Some(&origin));
    }

    #[test]
    fn test_load_records_digest() {
        let mut temp = NamedTempFile::new().unwrap();
        write!(temp, "a = 1\n").unwrap();

        let (contents, source) = load_toml_file(temp.path()).unwrap();
        assert_eq!(contents, "a = 1\n");
        assert_eq!(source.path, temp.path().display().to_string());
        assert_eq!(source.digest.len(), 64);

        let (_, again) = load_toml_file(temp.path()).unwrap();
        assert_eq!(source.digest, again.digest);
    }

    #[test]
    fn test_missing_file() {
        let err = load_toml_file(Path::new("/nonexistent/args.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError { .. }));
    }
}
