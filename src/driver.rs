//! Build evaluation driver
//!
//! Feeds the store from the loaded inputs and evaluates every toolchain of a
//! manifest on its own thread, the way build files of different toolchains
//! are loaded in parallel.

use build_args_value::KeyValueMap;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::thread;

use crate::config::{self, BuildManifest, ConfigError, ConfigSource};
use crate::error::ArgsError;
use crate::scope::MemoryScope;
use crate::store::Args;

/// Errors from loading inputs or evaluating arguments.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Args(#[from] ArgsError),
}

/// Everything a build invocation reads before evaluation.
#[derive(Debug, Clone, Default)]
pub struct BuildInputs {
    pub manifest: BuildManifest,
    /// Explicit overrides from the args file, then `--arg`, in order
    pub overrides: KeyValueMap,
    pub sources: Vec<ConfigSource>,
}

impl BuildInputs {
    /// Load the manifest, the optional args file, and `--arg` assignments.
    pub fn load(
        manifest_path: &Path,
        args_file: Option<&Path>,
        assignments: &[String],
    ) -> Result<Self, ConfigError> {
        let (manifest, manifest_source) = BuildManifest::load(manifest_path)?;
        let mut sources = vec![manifest_source];
        let mut overrides = KeyValueMap::new();

        if let Some(path) = args_file {
            let (file_overrides, source) = config::load_args_file(path)?;
            overrides.extend(file_overrides);
            sources.push(source);
        }

        for assignment in assignments {
            let (name, value) = config::parse_arg_assignment(assignment)?;
            overrides.insert(name, value);
        }

        Ok(Self {
            manifest,
            overrides,
            sources,
        })
    }

    /// Files whose contents can change argument values.
    pub fn dependency_files(&self) -> BTreeSet<PathBuf> {
        self.sources
            .iter()
            .map(|source| PathBuf::from(&source.path))
            .chain(self.manifest.build_files().into_iter().map(PathBuf::from))
            .collect()
    }
}

/// Build a store holding the inputs' project defaults and overrides.
pub fn prepare(mut args: Args, inputs: &BuildInputs) -> Args {
    args.add_default_arg_overrides(&inputs.manifest.default_overrides());
    args.add_arg_overrides(&inputs.overrides);
    args.set_build_args_dependency_files(inputs.dependency_files());
    args
}

/// Evaluate every toolchain of the manifest concurrently.
///
/// Returns the resulting root scopes in toolchain order. When several
/// toolchains fail, the error of the first one in that order is returned.
pub fn evaluate(args: &Args, manifest: &BuildManifest) -> Result<Vec<MemoryScope>, ArgsError> {
    let mut results: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = manifest
            .toolchains
            .iter()
            .map(|spec| {
                s.spawn(move || {
                    let mut scope = MemoryScope::new(spec.id());
                    args.setup_root_scope(&mut scope, &spec.toolchain_overrides(&manifest.path));
                    for block in &spec.declare_args {
                        args.declare_args(&block.to_args(), &mut scope)?;
                    }
                    Ok::<_, ArgsError>(scope)
                })
            })
            .collect();

        manifest
            .toolchains
            .iter()
            .zip(handles)
            .map(|(spec, handle)| {
                let result = match handle.join() {
                    Ok(result) => result,
                    Err(panic) => std::panic::resume_unwind(panic),
                };
                (spec.id(), result)
            })
            .collect()
    });

    results.sort_by(|(a, _), (b, _)| a.cmp(b));
    results.into_iter().map(|(_, result)| result).collect()
}
