//! Execution scope interface
//!
//! The argument store never owns interpreter scopes. It writes resolved
//! values into whatever implements [`Scope`] and reads back only what it
//! needs to attribute declarations to a toolchain context.

use build_args_value::{KeyValueMap, Origin, Value};
use std::collections::BTreeMap;

use crate::toolchain::ToolchainId;

/// The slice of an interpreter scope the argument store talks to.
pub trait Scope {
    /// Toolchain context this scope belongs to.
    fn toolchain(&self) -> &ToolchainId;

    /// Set `name`, attributing the stored copy to `origin`. A new name
    /// starts out unused; overwriting keeps the existing used flag.
    fn set_value(&mut self, name: &str, value: Value, origin: Option<&Origin>);

    fn get_value(&self, name: &str) -> Option<&Value>;

    /// Flag `name` as read so the interpreter does not warn about it.
    fn mark_used(&mut self, name: &str);

    /// Snapshot of the values set directly in this scope.
    fn current_scope_values(&self) -> KeyValueMap;
}

#[derive(Debug, Clone)]
struct Slot {
    value: Value,
    used: bool,
}

/// Flat in-memory scope used by the driver and in tests.
#[derive(Debug, Clone)]
pub struct MemoryScope {
    toolchain: ToolchainId,
    slots: BTreeMap<String, Slot>,
}

impl MemoryScope {
    pub fn new(toolchain: ToolchainId) -> Self {
        Self {
            toolchain,
            slots: BTreeMap::new(),
        }
    }

    pub fn is_used(&self, name: &str) -> bool {
        self.slots.get(name).map(|slot| slot.used).unwrap_or(false)
    }

    /// Names that were set but never marked used, sorted.
    pub fn unused_names(&self) -> Vec<&str> {
        self.slots
            .iter()
            .filter(|(_, slot)| !slot.used)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Scope for MemoryScope {
    fn toolchain(&self) -> &ToolchainId {
        &self.toolchain
    }

    fn set_value(&mut self, name: &str, mut value: Value, origin: Option<&Origin>) {
        value.set_origin(origin.cloned());
        match self.slots.get_mut(name) {
            Some(slot) => slot.value = value,
            None => {
                self.slots
                    .insert(name.to_string(), Slot { value, used: false });
            }
        }
    }

    fn get_value(&self, name: &str) -> Option<&Value> {
        self.slots.get(name).map(|slot| &slot.value)
    }

    fn mark_used(&mut self, name: &str) {
        if let Some(slot) = self.slots.get_mut(name) {
            slot.used = true;
        }
    }

    fn current_scope_values(&self) -> KeyValueMap {
        self.slots
            .iter()
            .map(|(name, slot)| (name.clone(), slot.value.clone()))
            .collect()
    }
}
