use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static BLOCK_COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").unwrap());

static LINE_COMMENT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"//.*").unwrap());

static IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(\bimport\s+(?P<type>type )?(?:[^'"]+\s+from\s+)??)(['"])(?P<module>[^'"]+)(['"])"#)
        .unwrap()
});

static EXPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(\bexport\s+(?P<type>type )?(?:[^'"]+\s+from\s+)??)(['"])(?P<module>[^'"]+)(['"])"#)
        .unwrap()
});

static DYNAMIC_IMPORT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:^|[^.]\s*)(\bimport\s*?\(\s*?)([`'"])(?P<module>[^`'"]+)([`'"]\))"#).unwrap()
});

static REQUIRE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:^|[^.]\s*)(\brequire\s*?\(\s*?)([`'"])(?P<module>[^`'"]+)([`'"]\))"#).unwrap()
});

static REQUIRE_JEST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?:^|[^.]\s*)(\b(?:require\s*?\.\s*?(?:requireActual|requireMock)|jest\s*?\.\s*?(?:requireActual|requireMock|genMockFromModule))\s*?\(\s*?)([`'"])(?P<module>[^`'"]+)([`'"]\))"#,
    )
    .unwrap()
});

pub fn strip_comments(source: &str) -> String {
    // Line comments first: a `/*` sitting inside a line comment is dead
    // text and must not open a block.
    let without_lines = LINE_COMMENT_RE.replace_all(source, "");
    BLOCK_COMMENT_RE
        .replace_all(&without_lines, "")
        .into_owned()
}

/// Lexically scans source text for the module identifiers it references:
/// static and dynamic imports, re-exports, CommonJS requires, and the
/// jest require variants. `type`-only imports carry no runtime edge and
/// are skipped. The result is sorted and deduplicated.
pub fn extract_dependencies(source: &str) -> Vec<String> {
    let stripped = strip_comments(source);
    let mut modules = BTreeSet::new();

    for captures in IMPORT_RE
        .captures_iter(&stripped)
        .chain(EXPORT_RE.captures_iter(&stripped))
    {
        if captures.name("type").is_some() {
            continue;
        }
        if let Some(module) = captures.name("module") {
            modules.insert(module.as_str().to_string());
        }
    }

    for captures in DYNAMIC_IMPORT_RE
        .captures_iter(&stripped)
        .chain(REQUIRE_RE.captures_iter(&stripped))
        .chain(REQUIRE_JEST_RE.captures_iter(&stripped))
    {
        if let Some(module) = captures.name("module") {
            modules.insert(module.as_str().to_string());
        }
    }

    modules.into_iter().collect()
}
