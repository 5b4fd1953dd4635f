//! Build Argument Value Model
//!
//! Defines the values exchanged between the build-file interpreter and the
//! argument engine: tagged values, their source origins, and the sorted
//! name → value map used for declarations and overrides.

pub mod origin;
pub mod value;

pub use origin::Origin;
pub use value::{Value, ValueKind};

use std::collections::BTreeMap;

/// Sorted mapping from argument name to value.
///
/// Iteration order is the name order, which keeps every report built from
/// these maps reproducible.
pub type KeyValueMap = BTreeMap<String, Value>;
