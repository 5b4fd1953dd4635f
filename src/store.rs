//! The build argument store
//!
//! One `Args` exists per build invocation. It holds the command-line and
//! project-default overrides, a record of every override ever supplied, and
//! for each toolchain context the arguments declared there and the
//! overrides that toolchain brings. All state sits behind a single lock.
//!
//! Precedence, lowest to highest:
//! 1. Defaults from `declare_args()` (system arguments count as declared)
//! 2. Project default overrides (dotfile `default_args`)
//! 3. Command-line / args-file overrides
//! 4. Toolchain overrides (`toolchain_args`)

use build_args_value::{KeyValueMap, Value};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use crate::audit;
use crate::error::ArgsError;
use crate::listing::{self, ValueWithOverrideMap};
use crate::scope::Scope;
use crate::system::{HostInfo, SYSTEM_VAR_NAMES};
use crate::toolchain::ToolchainId;

/// Per-toolchain maps, iterated default toolchain first.
pub(crate) type ArgumentsPerToolchain = BTreeMap<ToolchainId, KeyValueMap>;

#[derive(Debug, Clone, Default)]
pub(crate) struct ArgsState {
    /// Active overrides: project defaults layered under explicit overrides.
    pub(crate) overrides: KeyValueMap,

    /// Every explicit or toolchain override ever added (last write wins).
    /// Checked at the end of the build for overrides nothing declared.
    pub(crate) all_overrides: KeyValueMap,

    /// Arguments declared in each toolchain context, with their defaults.
    pub(crate) declared_arguments_per_toolchain: ArgumentsPerToolchain,

    /// Overrides supplied by each toolchain definition.
    pub(crate) toolchain_overrides: ArgumentsPerToolchain,
}

/// Build argument store shared by every toolchain evaluation.
#[derive(Debug)]
pub struct Args {
    host: HostInfo,
    state: Mutex<ArgsState>,
    build_args_dependency_files: BTreeSet<PathBuf>,
}

impl Args {
    /// Create a store for the given host.
    pub fn new(host: HostInfo) -> Self {
        Self {
            host,
            state: Mutex::new(ArgsState::default()),
            build_args_dependency_files: BTreeSet::new(),
        }
    }

    /// Create a store for the machine this process runs on.
    ///
    /// Fails when the host architecture has no canonical tag; no system
    /// defaults can be established in that case.
    pub fn for_native_host() -> Result<Self, ArgsError> {
        Ok(Self::new(HostInfo::native()?))
    }

    pub fn host(&self) -> &HostInfo {
        &self.host
    }

    /// Add an explicit override (command line or args file).
    pub fn add_arg_override(&self, name: &str, value: Value) {
        let mut state = self.state.lock();
        tracing::debug!(name, %value, "adding build argument override");
        state.overrides.insert(name.to_string(), value.clone());
        state.all_overrides.insert(name.to_string(), value);
    }

    /// Bulk form of [`Args::add_arg_override`].
    pub fn add_arg_overrides(&self, overrides: &KeyValueMap) {
        let mut state = self.state.lock();
        for (name, value) in overrides {
            state.overrides.insert(name.clone(), value.clone());
            state.all_overrides.insert(name.clone(), value.clone());
        }
        tracing::debug!(count = overrides.len(), "added build argument overrides");
    }

    /// Add project default overrides.
    ///
    /// These come from project configuration rather than the user, so they
    /// are never reported as unused.
    pub fn add_default_arg_overrides(&self, overrides: &KeyValueMap) {
        let mut state = self.state.lock();
        for (name, value) in overrides {
            state.overrides.insert(name.clone(), value.clone());
        }
        tracing::debug!(count = overrides.len(), "added default build argument overrides");
    }

    /// Active override for `name`, if any.
    pub fn get_arg_override(&self, name: &str) -> Option<Value> {
        self.state.lock().overrides.get(name).cloned()
    }

    /// Look `name` up across every source: the override record first, then
    /// the declarations of each toolchain, default toolchain first.
    pub fn get_arg_from_all_arguments(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.recorded_override(name) {
            return Some(value);
        }

        let state = self.state.lock();
        state
            .declared_arguments_per_toolchain
            .values()
            .find_map(|declared| declared.get(name).cloned())
    }

    fn recorded_override(&self, name: &str) -> Option<Value> {
        self.state.lock().all_overrides.get(name).cloned()
    }

    /// Prepare the root scope of a toolchain context.
    ///
    /// Seeds the system arguments, applies the active and toolchain
    /// overrides to whatever is already declared in this context, and keeps
    /// `toolchain_overrides` for the `declare_args()` blocks that follow.
    /// Overrides for names not yet declared are not applied here; they take
    /// effect when the declaration is seen.
    pub fn setup_root_scope(&self, scope: &mut dyn Scope, toolchain_overrides: &KeyValueMap) {
        let mut state = self.state.lock();
        let toolchain = scope.toolchain().clone();

        self.set_system_vars_locked(&mut state, scope);

        let declared = state
            .declared_arguments_per_toolchain
            .get(&toolchain)
            .cloned()
            .unwrap_or_default();
        apply_declared_overrides(&state.overrides, &declared, scope);
        apply_declared_overrides(toolchain_overrides, &declared, scope);

        state
            .toolchain_overrides
            .insert(toolchain.clone(), toolchain_overrides.clone());
        for (name, value) in toolchain_overrides {
            state.all_overrides.insert(name.clone(), value.clone());
        }

        tracing::debug!(
            %toolchain,
            toolchain_overrides = toolchain_overrides.len(),
            "root scope set up"
        );
    }

    fn set_system_vars_locked(&self, state: &mut ArgsState, scope: &mut dyn Scope) {
        let defaults = self.host.system_defaults();
        let declared = state
            .declared_arguments_per_toolchain
            .entry(scope.toolchain().clone())
            .or_default();

        for (name, value) in defaults {
            scope.set_value(&name, value.clone(), None);
            // Marked used so the build config may overwrite them freely.
            scope.mark_used(&name);
            declared.insert(name, value);
        }
    }

    /// Declare `args` in the scope's toolchain context and resolve each one.
    ///
    /// For every argument the scope receives, in order of preference, the
    /// toolchain override, the active override, or the declared default, and
    /// the name is marked used in all three cases. A name declared before at
    /// a different location fails the call; arguments processed before the
    /// failing one stay declared.
    pub fn declare_args(&self, args: &KeyValueMap, scope: &mut dyn Scope) -> Result<(), ArgsError> {
        let mut state = self.state.lock();
        let toolchain = scope.toolchain().clone();

        for (name, default_value) in args {
            check_not_declared_elsewhere(&state, &toolchain, name, default_value)?;

            let declared = state
                .declared_arguments_per_toolchain
                .entry(toolchain.clone())
                .or_default();
            record_declaration(declared, name, default_value);

            // Marking used in every branch: an argument only consumed in one
            // toolchain, or overwritten before being read, is not unused.
            let resolved = state
                .toolchain_overrides
                .get(&toolchain)
                .and_then(|overrides| overrides.get(name))
                .or_else(|| state.overrides.get(name))
                .unwrap_or(default_value);

            scope.set_value(name, resolved.clone(), resolved.origin());
            scope.mark_used(name);
            tracing::debug!(%toolchain, name = %name, value = %resolved, "declared build argument");
        }

        Ok(())
    }

    /// Check that every override supplied was declared somewhere.
    ///
    /// Reports the first unused override by name, with a spelling
    /// suggestion drawn from all declared arguments.
    pub fn verify_all_overrides_used(&self) -> Result<(), ArgsError> {
        let state = self.state.lock();
        audit::verify_all_overrides_used(
            &state.all_overrides,
            &state.declared_arguments_per_toolchain,
        )
    }

    /// Every declared argument with its default and active override.
    pub fn get_all_arguments(&self) -> ValueWithOverrideMap {
        let state = self.state.lock();
        listing::merge_arguments(&state.declared_arguments_per_toolchain, &state.overrides)
    }

    /// Toolchain contexts that have declared arguments, in lookup order.
    pub fn toolchains(&self) -> Vec<ToolchainId> {
        self.state
            .lock()
            .declared_arguments_per_toolchain
            .keys()
            .cloned()
            .collect()
    }

    /// Files whose contents can change argument values.
    pub fn build_args_dependency_files(&self) -> &BTreeSet<PathBuf> {
        &self.build_args_dependency_files
    }

    pub fn set_build_args_dependency_files(&mut self, files: BTreeSet<PathBuf>) {
        self.build_args_dependency_files = files;
    }
}

impl Clone for Args {
    fn clone(&self) -> Self {
        Self {
            host: self.host.clone(),
            state: Mutex::new(self.state.lock().clone()),
            build_args_dependency_files: self.build_args_dependency_files.clone(),
        }
    }
}

/// Set the values in `values` whose names are already declared.
fn apply_declared_overrides(values: &KeyValueMap, declared: &KeyValueMap, scope: &mut dyn Scope) {
    for (name, value) in values {
        if declared.contains_key(name) {
            scope.set_value(name, value.clone(), value.origin());
        }
    }
}

/// Fail if `name` was declared at another location in any context.
///
/// Re-evaluating the same file for another toolchain declares the name
/// again at the same origin, which is fine. The implicit system arguments
/// carry no origin and never conflict.
///
/// A conflict between two contexts is reported with the declaration of the
/// lower-ordered toolchain as `previous`, whichever context got there first.
fn check_not_declared_elsewhere(
    state: &ArgsState,
    toolchain: &ToolchainId,
    name: &str,
    incoming: &Value,
) -> Result<(), ArgsError> {
    let own = state
        .declared_arguments_per_toolchain
        .get(toolchain)
        .and_then(|declared| declared.get(name))
        .map(|value| (toolchain, value));
    let others = state
        .declared_arguments_per_toolchain
        .iter()
        .filter(|(id, _)| *id != toolchain)
        .filter_map(|(id, declared)| declared.get(name).map(|value| (id, value)));

    for (previous_toolchain, previous) in own.into_iter().chain(others) {
        if previous.origin().is_none() && SYSTEM_VAR_NAMES.contains(&name) {
            continue;
        }
        if previous.origin() == incoming.origin() {
            continue;
        }

        let (origin, earlier) = if previous_toolchain > toolchain {
            (previous.origin(), incoming.origin())
        } else {
            (incoming.origin(), previous.origin())
        };
        tracing::warn!(
            name,
            origin = ?origin,
            previous = ?earlier,
            "duplicate build argument declaration"
        );
        return Err(ArgsError::DuplicateDeclaration {
            name: name.to_string(),
            origin: origin.cloned(),
            previous: earlier.cloned(),
        });
    }
    Ok(())
}

/// Record a declaration that passed the duplicate check.
///
/// A same-origin redeclaration keeps the first entry. A declaration that
/// takes over an implicit system argument replaces it.
fn record_declaration(declared: &mut KeyValueMap, name: &str, value: &Value) {
    match declared.get(name) {
        Some(existing) if existing.origin().is_some() => {}
        _ => {
            declared.insert(name.to_string(), value.clone());
        }
    }
}
