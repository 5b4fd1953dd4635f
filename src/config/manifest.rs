//! Build manifest
//!
//! Describes the project defaults and, per toolchain, the overrides the
//! toolchain definition supplies and the `declare_args()` blocks its build
//! files evaluate. Example:
//!
//! ```toml
//! [default_args]
//! use_custom_libcxx = false
//!
//! [[toolchain]]
//! label = "//build/toolchain:clang_x64"
//! default = true
//!
//! [[toolchain.declare_args]]
//! file = "//build/config/compiler.gni"
//! line = 4
//! args = { is_debug = true, symbol_level = 2 }
//!
//! [[toolchain]]
//! label = "//build/toolchain:clang_arm64"
//! toolchain_args = { current_cpu = "arm64" }
//! ```

use build_args_value::{KeyValueMap, Origin};
use serde::Deserialize;
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use super::source::{load_toml_file, table_to_map, ConfigSource};
use super::ConfigError;
use crate::toolchain::ToolchainId;

/// Parsed build manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildManifest {
    /// Project default overrides (never reported as unused)
    #[serde(default)]
    pub default_args: toml::Table,

    #[serde(default, rename = "toolchain")]
    pub toolchains: Vec<ToolchainSpec>,

    /// Location the manifest was read from, used as the origin of its values
    #[serde(skip)]
    pub path: String,
}

/// One toolchain evaluation context.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolchainSpec {
    pub label: String,

    #[serde(default)]
    pub default: bool,

    /// Overrides applied only in this toolchain
    #[serde(default)]
    pub toolchain_args: toml::Table,

    /// Blocks evaluated in this toolchain, in order
    #[serde(default)]
    pub declare_args: Vec<DeclareBlock>,
}

/// A `declare_args()` block in a build file.
#[derive(Debug, Clone, Deserialize)]
pub struct DeclareBlock {
    pub file: String,

    #[serde(default)]
    pub line: Option<u32>,

    #[serde(default)]
    pub args: toml::Table,
}

impl BuildManifest {
    /// Load and validate a manifest file.
    pub fn load(path: &Path) -> Result<(Self, ConfigSource), ConfigError> {
        let (contents, source) = load_toml_file(path)?;
        let manifest = Self::parse(&contents, &source.path)?;
        Ok((manifest, source))
    }

    /// Parse and validate manifest text read from `path`.
    pub fn parse(contents: &str, path: &str) -> Result<Self, ConfigError> {
        let mut manifest: BuildManifest =
            toml::from_str(contents).map_err(|e| ConfigError::ParseError {
                path: path.to_string(),
                message: e.to_string(),
            })?;
        manifest.path = path.to_string();
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for toolchain in &self.toolchains {
            if toolchain.label.is_empty() && !toolchain.default {
                return Err(ConfigError::ValidationError(
                    "only a default toolchain may have an empty label".to_string(),
                ));
            }
            if !seen.insert(toolchain.id()) {
                return Err(ConfigError::ValidationError(format!(
                    "toolchain '{}' is listed twice",
                    toolchain.label
                )));
            }
            for block in &toolchain.declare_args {
                if block.file.is_empty() {
                    return Err(ConfigError::ValidationError(format!(
                        "declare_args block in toolchain '{}' has no file",
                        toolchain.label
                    )));
                }
            }
        }
        Ok(())
    }

    /// Project defaults as values attributed to the manifest.
    pub fn default_overrides(&self) -> KeyValueMap {
        table_to_map(self.default_args.clone(), &Origin::file(self.path.clone()))
    }

    /// Build files named by the declare blocks, sorted and deduplicated.
    pub fn build_files(&self) -> BTreeSet<String> {
        self.toolchains
            .iter()
            .flat_map(|toolchain| toolchain.declare_args.iter())
            .map(|block| block.file.clone())
            .collect()
    }
}

impl ToolchainSpec {
    pub fn id(&self) -> ToolchainId {
        ToolchainId {
            label: self.label.clone(),
            is_default: self.default,
        }
    }

    /// This toolchain's overrides, attributed to the manifest at `path`.
    pub fn toolchain_overrides(&self, path: &str) -> KeyValueMap {
        table_to_map(self.toolchain_args.clone(), &Origin::file(path))
    }
}

impl DeclareBlock {
    pub fn origin(&self) -> Origin {
        Origin {
            file: self.file.clone(),
            line: self.line,
        }
    }

    /// Declared defaults, each attributed to this block.
    pub fn to_args(&self) -> KeyValueMap {
        table_to_map(self.args.clone(), &self.origin())
    }
}
