//! Argument listing
//!
//! Builds the merged view of every declared argument used by `list`. This
//! view is for display only and plays no part in resolution.

use build_args_value::{KeyValueMap, Value};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::store::ArgumentsPerToolchain;

/// A declared argument's default and, when set, its active override.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueWithOverride {
    pub default_value: Value,
    pub has_override: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_value: Option<Value>,
}

impl ValueWithOverride {
    pub fn new(default_value: Value) -> Self {
        Self {
            default_value,
            has_override: false,
            override_value: None,
        }
    }

    /// The value the argument takes in the default toolchain.
    pub fn current_value(&self) -> &Value {
        self.override_value.as_ref().unwrap_or(&self.default_value)
    }
}

/// Sorted by argument name.
pub type ValueWithOverrideMap = BTreeMap<String, ValueWithOverride>;

/// Merge declarations (earlier toolchains win) with the active overrides.
///
/// Overrides for names no toolchain declared are left out.
pub(crate) fn merge_arguments(
    declared_per_toolchain: &ArgumentsPerToolchain,
    overrides: &KeyValueMap,
) -> ValueWithOverrideMap {
    let mut result = ValueWithOverrideMap::new();

    for declared in declared_per_toolchain.values() {
        for (name, value) in declared {
            result
                .entry(name.clone())
                .or_insert_with(|| ValueWithOverride::new(value.clone()));
        }
    }

    for (name, value) in overrides {
        if let Some(entry) = result.get_mut(name) {
            entry.has_override = true;
            entry.override_value = Some(value.clone());
        }
    }

    result
}

/// Render `arguments` in the human-readable listing format.
///
/// With `short`, prints one `name = value` line per argument.
pub fn format_listing(arguments: &ValueWithOverrideMap, short: bool) -> String {
    let mut out = String::new();
    for (name, arg) in arguments {
        if short {
            let _ = writeln!(out, "{} = {}", name, arg.current_value());
            continue;
        }

        let _ = writeln!(out, "{}", name);
        if let Some(override_value) = &arg.override_value {
            let _ = write!(out, "    Current value = {}", override_value);
            match override_value.origin() {
                Some(origin) => {
                    let _ = writeln!(out, "\n      From {}", origin);
                }
                None => {
                    let _ = writeln!(out, "\n      (Internally set; try `build-args list --args-file`.)");
                }
            }
            let _ = writeln!(out, "    Overridden from the default = {}", arg.default_value);
        } else {
            let _ = writeln!(out, "    Current value (from the default) = {}", arg.default_value);
        }
        match arg.default_value.origin() {
            Some(origin) => {
                let _ = writeln!(out, "      From {}", origin);
            }
            None => {
                let _ = writeln!(out, "      (Internally set; no declaration.)");
            }
        }
        out.push('\n');
    }
    out
}
