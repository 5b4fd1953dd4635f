//! Build argument errors
//!
//! Every error carries the location that caused it, a help text, and for
//! duplicate declarations a linked sub-error pointing at the first
//! declaration site.

use build_args_value::Origin;
use serde::Serialize;
use std::fmt::Write as _;

/// Help text attached to duplicate declarations.
const DUPLICATE_HELP: &str = "Here you're declaring an argument that was already declared \
elsewhere.\nYou can only declare each argument once in the entire build so there is one\n\
canonical place for documentation and the default value. Either move this\nargument to the \
build config file (for visibility everywhere) or to a .gni file\nthat you \"import\" from the \
files where you need it (preferred).";

/// A secondary diagnostic linked to a primary error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Origin>,
    pub message: String,
    pub help: String,
}

/// Errors raised while resolving or verifying build arguments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgsError {
    /// The same argument was declared at two different locations.
    #[error("Duplicate build argument declaration.")]
    DuplicateDeclaration {
        name: String,
        origin: Option<Origin>,
        previous: Option<Origin>,
    },

    /// An override was supplied for an argument no build file declares.
    #[error("Build argument has no effect.")]
    UnusedOverride {
        name: String,
        origin: Option<Origin>,
        suggestion: Option<String>,
    },

    /// The host reported an architecture with no canonical tag.
    #[error("OS architecture not handled. ({0})")]
    UnknownHostArchitecture(String),
}

impl ArgsError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ArgsError::DuplicateDeclaration { .. } => "DUPLICATE_DECLARATION",
            ArgsError::UnusedOverride { .. } => "UNUSED_OVERRIDE",
            ArgsError::UnknownHostArchitecture(_) => "UNKNOWN_HOST_ARCHITECTURE",
        }
    }

    /// Name of the argument involved, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            ArgsError::DuplicateDeclaration { name, .. } | ArgsError::UnusedOverride { name, .. } => {
                Some(name)
            }
            ArgsError::UnknownHostArchitecture(_) => None,
        }
    }

    /// Location the error is reported at.
    pub fn origin(&self) -> Option<&Origin> {
        match self {
            ArgsError::DuplicateDeclaration { origin, .. }
            | ArgsError::UnusedOverride { origin, .. } => origin.as_ref(),
            ArgsError::UnknownHostArchitecture(_) => None,
        }
    }

    pub fn help(&self) -> String {
        match self {
            ArgsError::DuplicateDeclaration { .. } => DUPLICATE_HELP.to_string(),
            ArgsError::UnusedOverride {
                name, suggestion, ..
            } => {
                let mut help = String::new();
                if let Some(suggestion) = suggestion {
                    let _ = write!(help, "Did you mean \"{}\"?\n\n", suggestion);
                }
                let _ = write!(
                    help,
                    "The variable \"{}\" was set as a build argument\n\
                     but never appeared in a declare_args() block in any buildfile.\n\n\
                     To view all possible args, run \"build-args list\"",
                    name
                );
                help
            }
            ArgsError::UnknownHostArchitecture(_) => {
                "Every supported host must map to a known CPU tag.".to_string()
            }
        }
    }

    /// Linked diagnostics, in reporting order.
    pub fn sub_errors(&self) -> Vec<SubError> {
        match self {
            ArgsError::DuplicateDeclaration { previous, .. } => vec![SubError {
                origin: previous.clone(),
                message: "Previous declaration.".to_string(),
                help: "See also \"build-args overview\" for more on how build arguments work."
                    .to_string(),
            }],
            _ => Vec::new(),
        }
    }

    /// Render the error, its location, help and sub-errors for a terminal.
    pub fn report(&self) -> String {
        let mut out = String::new();
        write_block(&mut out, self.origin(), &self.to_string(), &self.help());
        for sub in self.sub_errors() {
            out.push('\n');
            write_block(&mut out, sub.origin.as_ref(), &sub.message, &sub.help);
        }
        out
    }

    /// Machine-readable form of the error.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "code": self.code(),
            "name": self.name(),
            "message": self.to_string(),
            "origin": self.origin(),
            "help": self.help(),
            "sub_errors": self.sub_errors(),
        })
    }
}

fn write_block(out: &mut String, origin: Option<&Origin>, message: &str, help: &str) {
    match origin {
        Some(origin) => {
            let _ = writeln!(out, "ERROR at {}: {}", origin, message);
        }
        None => {
            let _ = writeln!(out, "ERROR: {}", message);
        }
    }
    for line in help.lines() {
        let _ = writeln!(out, "{}", line);
    }
}
