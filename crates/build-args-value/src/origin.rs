//! Source locations attached to values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Location responsible for a value (a build file, an args file, or a
/// manifest entry).
///
/// Two declarations of the same argument are the same declaration exactly
/// when their origins compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Origin {
    /// Source-absolute or relative file path (e.g. "//build/config/BUILDCONFIG.gn").
    pub file: String,

    /// 1-based line number, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl Origin {
    /// Create an origin pointing at a whole file.
    pub fn file(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line: None,
        }
    }

    /// Create an origin pointing at a line in a file.
    pub fn at(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line: Some(line),
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}", self.file, line),
            None => write!(f, "{}", self.file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Origin::at("//BUILD.gn", 12).to_string(), "//BUILD.gn:12");
        assert_eq!(Origin::file("out/args.toml").to_string(), "out/args.toml");
    }

    #[test]
    fn test_equality_includes_line() {
        assert_eq!(Origin::at("//a.gni", 3), Origin::at("//a.gni", 3));
        assert_ne!(Origin::at("//a.gni", 3), Origin::at("//a.gni", 4));
        assert_ne!(Origin::at("//a.gni", 3), Origin::file("//a.gni"));
    }
}
