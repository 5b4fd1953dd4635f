//! Build Args - build argument resolution for multi-toolchain builds
//!
//! Decides, for every named build argument, which of the competing value
//! sources wins (system defaults, project defaults, explicit overrides,
//! toolchain overrides, declared defaults), and catches configuration
//! mistakes such as duplicate declarations and overrides nothing uses.

pub mod audit;
pub mod config;
pub mod driver;
pub mod error;
pub mod help;
pub mod listing;
pub mod scope;
pub mod store;
pub mod system;
pub mod toolchain;

pub use build_args_value::{KeyValueMap, Origin, Value, ValueKind};
pub use error::{ArgsError, SubError};
pub use listing::{ValueWithOverride, ValueWithOverrideMap};
pub use scope::{MemoryScope, Scope};
pub use store::Args;
pub use system::{HostInfo, HostPlatform};
pub use toolchain::ToolchainId;
