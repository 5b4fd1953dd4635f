//! Unused override detection
//!
//! An override nothing declared is almost always a typo or a stale entry in
//! an args file, so it fails the build with a spelling suggestion.

use build_args_value::KeyValueMap;

use crate::error::ArgsError;
use crate::store::ArgumentsPerToolchain;

/// Largest edit distance still offered as a suggestion.
const MAX_VALID_EDIT_DISTANCE: usize = 3;

/// Fail with the first (by name) override that no toolchain declared.
pub(crate) fn verify_all_overrides_used(
    all_overrides: &KeyValueMap,
    declared_per_toolchain: &ArgumentsPerToolchain,
) -> Result<(), ArgsError> {
    let mut unused = all_overrides.clone();
    for declared in declared_per_toolchain.values() {
        unused.retain(|name, _| !declared.contains_key(name));
    }

    let Some((name, value)) = unused.into_iter().next() else {
        return Ok(());
    };

    let candidates = declared_per_toolchain
        .values()
        .flat_map(|declared| declared.keys().map(String::as_str));
    let suggestion = spellcheck(&name, candidates).map(str::to_string);

    tracing::warn!(name = %name, ?suggestion, "build argument override has no effect");
    Err(ArgsError::UnusedOverride {
        origin: value.origin().cloned(),
        name,
        suggestion,
    })
}

/// Closest candidate to `text`, if any is within the accepted distance.
///
/// Ties go to the earliest candidate.
pub fn spellcheck<'a>(text: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut best: Option<(&'a str, usize)> = None;
    for candidate in candidates {
        let distance = edit_distance(candidate, text, MAX_VALID_EDIT_DISTANCE);
        if distance > MAX_VALID_EDIT_DISTANCE {
            continue;
        }
        if best.map_or(true, |(_, best_distance)| distance < best_distance) {
            best = Some((candidate, distance));
        }
    }
    best.map(|(candidate, _)| candidate)
}

/// Levenshtein distance between `a` and `b`.
///
/// Stops early and returns `max_distance + 1` once every cell of a row
/// exceeds `max_distance`.
pub fn edit_distance(a: &str, b: &str, max_distance: usize) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.len().abs_diff(b.len()) > max_distance {
        return max_distance + 1;
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        current[0] = i;
        let mut row_min = current[0];
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            current[j] = (previous[j] + 1) // deletion
                .min(current[j - 1] + 1) // insertion
                .min(previous[j - 1] + cost); // substitution
            row_min = row_min.min(current[j]);
        }
        if row_min > max_distance {
            return max_distance + 1;
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolchain::ToolchainId;
    use build_args_value::{Origin, Value};

    fn map(names: &[&str]) -> KeyValueMap {
        names
            .iter()
            .map(|name| (name.to_string(), Value::boolean(true)))
            .collect()
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("kitten", "sitting", 10), 3);
        assert_eq!(edit_distance("", "abc", 10), 3);
        assert_eq!(edit_distance("same", "same", 3), 0);
        assert_eq!(edit_distance("is_debug", "is_debgu", 3), 2);
    }

    #[test]
    fn test_edit_distance_cutoff() {
        assert_eq!(edit_distance("a", "abcdefgh", 3), 4);
        assert_eq!(edit_distance("abcdef", "uvwxyz", 3), 4);
    }

    #[test]
    fn test_spellcheck() {
        let candidates = ["is_debug", "is_official_build", "target_cpu"];
        assert_eq!(spellcheck("is_debgu", candidates), Some("is_debug"));
        assert_eq!(spellcheck("target_cpux", candidates), Some("target_cpu"));
        assert_eq!(spellcheck("completely_different", candidates), None);
    }

    #[test]
    fn test_spellcheck_tie_keeps_first() {
        assert_eq!(spellcheck("ab", ["ax", "ay"]), Some("ax"));
    }

    #[test]
    fn test_all_declared_passes() {
        let mut declared = ArgumentsPerToolchain::new();
        declared.insert(ToolchainId::default_toolchain(""), map(&["a"]));
        declared.insert(ToolchainId::new("//tc:b"), map(&["b"]));

        assert!(verify_all_overrides_used(&map(&["a", "b"]), &declared).is_ok());
    }

    #[test]
    fn test_reports_first_unused_by_name() {
        let mut declared = ArgumentsPerToolchain::new();
        declared.insert(ToolchainId::default_toolchain(""), map(&["enable_nacl"]));

        let mut overrides = map(&["zeta", "enable_nalc"]);
        overrides.insert(
            "enable_nalc".to_string(),
            Value::boolean(false).with_origin(Origin::file("out/args.toml")),
        );

        let err = verify_all_overrides_used(&overrides, &declared).unwrap_err();
        assert_eq!(
            err,
            ArgsError::UnusedOverride {
                name: "enable_nalc".to_string(),
                origin: Some(Origin::file("out/args.toml")),
                suggestion: Some("enable_nacl".to_string()),
            }
        );
    }
}
