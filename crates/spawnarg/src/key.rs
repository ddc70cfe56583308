//! ASCII case-folding for spawnarg keys.
//!
//! Keys compare case-insensitively but are stored in their original case.
//! idTech property names are ASCII identifiers, so folding is ASCII-only.

/// Folded form of a key, used as the lookup-index entry.
pub(crate) fn fold(key: &str) -> String {
    key.to_ascii_lowercase()
}

/// Case-insensitive key equality.
pub(crate) fn eq_fold(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Case-insensitive prefix match. Compares bytes so a prefix ending inside a
/// multi-byte character simply fails to match.
pub(crate) fn starts_with_fold(key: &str, prefix: &str) -> bool {
    key.as_bytes()
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix.as_bytes()))
}

///
/// TESTS
///
