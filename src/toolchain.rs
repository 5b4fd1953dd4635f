//! Toolchain context identities
//!
//! Each toolchain evaluation context gets one `ToolchainId`, handed out by
//! the driver and threaded through every store call. Per-context maps are
//! keyed by it, so their iteration order is the deterministic order below.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Identity of a toolchain evaluation context.
///
/// Ordering: every default context sorts before every non-default one, and
/// contexts with the same flag sort by label. Several contexts may claim to
/// be the default (files evaluated while loading the args file use an empty
/// label), and the order stays total because the label breaks the tie.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolchainId {
    /// Toolchain label (e.g. "//build/toolchain:clang_x64")
    pub label: String,

    /// Whether this context is the build's default toolchain
    #[serde(default)]
    pub is_default: bool,
}

impl ToolchainId {
    /// A non-default toolchain.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            is_default: false,
        }
    }

    /// The default toolchain (or a bootstrap context standing in for it).
    pub fn default_toolchain(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            is_default: true,
        }
    }
}

impl Ord for ToolchainId {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .is_default
            .cmp(&self.is_default)
            .then_with(|| self.label.cmp(&other.label))
    }
}

impl PartialOrd for ToolchainId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ToolchainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.label.is_empty() {
            write!(f, "<default>")
        } else {
            write!(f, "{}", self.label)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sorts_first() {
        let default = ToolchainId::default_toolchain("//tc:zzz");
        let other = ToolchainId::new("//tc:aaa");
        assert!(default < other);
    }

    #[test]
    fn test_label_breaks_ties() {
        let mut ids = vec![
            ToolchainId::new("//tc:b"),
            ToolchainId::default_toolchain("//tc:x"),
            ToolchainId::new("//tc:a"),
            ToolchainId::default_toolchain(""),
        ];
        ids.sort();

        let labels: Vec<_> = ids.iter().map(|id| id.label.as_str()).collect();
        assert_eq!(labels, vec!["", "//tc:x", "//tc:a", "//tc:b"]);
    }

    #[test]
    fn test_same_label_different_flag_are_distinct() {
        let a = ToolchainId::default_toolchain("//tc:a");
        let b = ToolchainId::new("//tc:a");
        assert_ne!(a, b);
        assert_eq!(a.cmp(&b), Ordering::Less);
    }

    #[test]
    fn test_display() {
        assert_eq!(ToolchainId::default_toolchain("").to_string(), "<default>");
        assert_eq!(ToolchainId::new("//tc:a").to_string(), "//tc:a");
    }
}
