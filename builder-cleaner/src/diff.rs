//! Orphan detection: local repository names with no live namespace.

use std::collections::HashSet;

use builder_core::NamespaceName;

/// Directory names from `dirs` with no case-insensitive match among `namespaces`.
///
/// `dirs` must already be stripped of the `.git` suffix. Returned names keep
/// their on-disk spelling so the caller can rebuild the exact path. Ordering
/// follows `dirs` but callers should not rely on it.
pub fn orphans<'a, I>(namespaces: I, dirs: &[String]) -> Vec<String>
where
    I: IntoIterator<Item = &'a NamespaceName>,
{
    let live: HashSet<String> = namespaces.into_iter().map(NamespaceName::canonical).collect();

    dirs.iter()
        .filter(|dir| !live.contains(&dir.to_lowercase()))
        .cloned()
        .collect()
}

/// Truncate each string at the last occurrence of `suffix`.
///
/// Strings without `suffix` pass through unchanged.
pub fn strip_suffixes(strs: &[String], suffix: &str) -> Vec<String> {
    strs.iter()
        .map(|s| match s.rfind(suffix) {
            Some(idx) => s[..idx].to_string(),
            None => s.clone(),
        })
        .collect()
}
