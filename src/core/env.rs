//! Environment snapshots and how they are combined.

use std::env;

use indexmap::IndexMap;
use log::debug;

/// An ordered mapping from environment variable name to its value.
///
/// Order is the insertion order, which keeps the environment handed to
/// child processes deterministic across runs.
pub type EnvMap = IndexMap<String, String>;

/// Take a snapshot of the current process environment.
///
/// Variables whose name or value is not valid unicode are skipped.
pub fn snapshot() -> EnvMap {
    env::vars_os()
        .filter_map(|(key, val)| match (key.into_string(), val.into_string()) {
            (Ok(k), Ok(v)) => Some((k, v)),
            (k, _) => {
                debug!("skipping non-unicode environment variable {k:?}");
                None
            }
        })
        .collect()
}

/// Overlay `delta` onto a copy of `baseline`.
///
/// Keys only in `baseline` are kept unchanged, keys in `delta` are overwritten
/// (in place) or appended, nothing is ever removed.
pub fn merge(baseline: &EnvMap, delta: &EnvMap) -> EnvMap {
    let mut merged = baseline.clone();
    merged.extend(delta.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

/// Look up a variable by name, ignoring ASCII case if there is no exact match.
///
/// Windows stores names with arbitrary case but treats them case-insensitively.
pub fn lookup<'a>(env: &'a EnvMap, name: &str) -> Option<&'a str> {
    env.get(name)
        .or_else(|| {
            env.iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v)
        })
        .map(String::as_str)
}
