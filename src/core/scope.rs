//! Scope matching for intent-owned path globs.
//!
//! Globs are workspace-relative, forward-slash, case-sensitive:
//! - `**` matches zero or more whole path segments
//! - `*` matches zero or more characters within one segment
//! - `?` matches exactly one character within one segment
//! - everything else matches literally
//!
//! A path is in scope iff it matches at least one glob. An empty glob set
//! puts nothing in scope.

use crate::core::error::GatehouseError;

/// Decide whether a normalized workspace-relative path lies within a glob set.
pub fn in_scope(path: &str, globs: &[String]) -> bool {
    globs.iter().any(|glob| glob_match(glob, path))
}

/// Match a single glob against a normalized relative path.
pub fn glob_match(glob: &str, path: &str) -> bool {
    let pattern: Vec<&str> = glob.split('/').collect();
    let segments: Vec<&str> = path.split('/').collect();
    match_segments(&pattern, &segments)
}

fn match_segments(pattern: &[&str], segments: &[&str]) -> bool {
    match pattern.split_first() {
        None => segments.is_empty(),
        Some((&"**", rest)) => {
            // `**` absorbs zero or more leading segments.
            (0..=segments.len()).any(|skip| match_segments(rest, &segments[skip..]))
        }
        Some((pat, rest)) => match segments.split_first() {
            Some((seg, seg_rest)) => match_segment(pat, seg) && match_segments(rest, seg_rest),
            None => false,
        },
    }
}

fn match_segment(pattern: &str, segment: &str) -> bool {
    let pat: Vec<char> = pattern.chars().collect();
    let seg: Vec<char> = segment.chars().collect();
    match_chars(&pat, &seg)
}

fn match_chars(pat: &[char], seg: &[char]) -> bool {
    match pat.split_first() {
        None => seg.is_empty(),
        Some(('*', rest)) => (0..=seg.len()).any(|skip| match_chars(rest, &seg[skip..])),
        Some(('?', rest)) => !seg.is_empty() && match_chars(rest, &seg[1..]),
        Some((ch, rest)) => seg.first() == Some(ch) && match_chars(rest, &seg[1..]),
    }
}

/// Normalize a path crossing the engine API to the workspace convention.
///
/// Accepts forward-slash relative paths; strips a single leading `./`.
/// Rejects empty paths, absolute paths (POSIX or drive-letter), backslashes,
/// and any `..` segment.
pub fn normalize_rel_path(raw: &str) -> Result<String, GatehouseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(GatehouseError::PathError(
            "empty path; a workspace-relative path is required".to_string(),
        ));
    }
    if trimmed.contains('\\') {
        return Err(GatehouseError::PathError(format!(
            "'{trimmed}': backslashes are not part of the workspace path convention"
        )));
    }
    if trimmed.starts_with('/') {
        return Err(GatehouseError::PathError(format!(
            "'{trimmed}': absolute paths are not allowed"
        )));
    }
    let bytes = trimmed.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' && bytes[0].is_ascii_alphabetic() {
        return Err(GatehouseError::PathError(format!(
            "'{trimmed}': drive-letter paths are not allowed"
        )));
    }
    let stripped = trimmed.strip_prefix("./").unwrap_or(trimmed);
    if stripped.is_empty() {
        return Err(GatehouseError::PathError(
            "'./' does not name a file".to_string(),
        ));
    }
    if stripped.split('/').any(|segment| segment == "..") {
        return Err(GatehouseError::PathError(format!(
            "'{trimmed}': parent components ('..') are not allowed"
        )));
    }
    Ok(stripped.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn globs(patterns: &[&str]) -> Vec<String> {
        patterns.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn double_star_matches_any_depth_including_none() {
        assert!(glob_match("src/api/**", "src/api/weather.ts"));
        assert!(glob_match("src/api/**", "src/api/v2/routes/weather.ts"));
        assert!(glob_match("src/**/handlers.ts", "src/handlers.ts"));
        assert!(glob_match("src/**/handlers.ts", "src/a/b/handlers.ts"));
        assert!(!glob_match("src/api/**", "src/auth/middleware.ts"));
    }

    #[test]
    fn single_star_stays_within_a_segment() {
        assert!(glob_match("src/*.ts", "src/main.ts"));
        assert!(!glob_match("src/*.ts", "src/api/main.ts"));
        assert!(glob_match("src/*/mod.rs", "src/core/mod.rs"));
        // zero characters is a valid `*` match
        assert!(glob_match("src/*main.ts", "src/main.ts"));
    }

    #[test]
    fn question_mark_matches_exactly_one_character() {
        assert!(glob_match("src/v?.rs", "src/v1.rs"));
        assert!(!glob_match("src/v?.rs", "src/v12.rs"));
        assert!(!glob_match("src/v?.rs", "src/v.rs"));
    }

    #[test]
    fn literal_globs_match_exactly() {
        assert!(glob_match("docs/README.md", "docs/README.md"));
        assert!(!glob_match("docs/README.md", "docs/readme.md"));
        assert!(!glob_match("docs/README.md", "docs/README.md.bak"));
    }

    #[test]
    fn empty_glob_set_puts_nothing_in_scope() {
        assert!(!in_scope("src/main.rs", &[]));
    }

    #[test]
    fn any_matching_glob_is_sufficient() {
        let set = globs(&["migrations/**", "src/api/**"]);
        assert!(in_scope("src/api/weather.ts", &set));
        assert!(in_scope("migrations/0001_init.sql", &set));
        assert!(!in_scope("src/auth/session.ts", &set));
    }

    #[test]
    fn normalize_strips_leading_dot_slash() {
        assert_eq!(normalize_rel_path("./src/main.rs").unwrap(), "src/main.rs");
        assert_eq!(normalize_rel_path("src/main.rs").unwrap(), "src/main.rs");
    }

    #[test]
    fn normalize_rejects_escapes() {
        assert!(normalize_rel_path("").is_err());
        assert!(normalize_rel_path("/etc/passwd").is_err());
        assert!(normalize_rel_path("C:/windows/system32").is_err());
        assert!(normalize_rel_path("src\\main.rs").is_err());
        assert!(normalize_rel_path("../outside.txt").is_err());
        assert!(normalize_rel_path("src/../../outside.txt").is_err());
    }
}
