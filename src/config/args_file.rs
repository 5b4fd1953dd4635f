//! Explicit overrides: args files and `--arg` assignments

use build_args_value::{KeyValueMap, Origin, Value};
use std::path::Path;

use super::source::{load_toml_file, table_to_map, toml_to_value, ConfigSource};
use super::ConfigError;

/// Origin attached to values given with `--arg`.
pub const COMMAND_LINE_ORIGIN: &str = "<command line>";

/// Load an args file: a flat TOML table of argument overrides.
pub fn load_args_file(path: &Path) -> Result<(KeyValueMap, ConfigSource), ConfigError> {
    let (contents, source) = load_toml_file(path)?;
    let table: toml::Table = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: source.path.clone(),
        message: e.to_string(),
    })?;

    let origin = Origin::file(source.path.clone());
    Ok((table_to_map(table, &origin), source))
}

/// Parse a `name=value` command-line override.
///
/// The value is read as a TOML value (`true`, `3`, `"str"`, `[1, 2]`); a
/// bare word that does not parse is taken as a string.
pub fn parse_arg_assignment(text: &str) -> Result<(String, Value), ConfigError> {
    let Some((name, raw)) = text.split_once('=') else {
        return Err(ConfigError::ValidationError(format!(
            "expected name=value, got '{}'",
            text
        )));
    };
    let name = name.trim();
    if !is_identifier(name) {
        return Err(ConfigError::ValidationError(format!(
            "invalid build argument name '{}'",
            name
        )));
    }

    let raw = raw.trim();
    let origin = Origin::file(COMMAND_LINE_ORIGIN);
    let value = match toml::from_str::<toml::Table>(&format!("value = {}", raw)) {
        Ok(mut table) => match table.remove("value") {
            Some(parsed) => toml_to_value(parsed, &origin),
            None => Value::string(raw).with_origin(origin),
        },
        Err(_) => Value::string(raw).with_origin(origin),
    };
    Ok((name.to_string(), value))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
