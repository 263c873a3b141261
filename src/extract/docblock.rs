use once_cell::sync::Lazy;
use regex::Regex;

static DOCBLOCK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)^\s*/\*\*?(.*?)\*/").unwrap());

static PRAGMA_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@(\w+)\s+([^\s*]+)").unwrap());

/// The comment block a file opens with, if any. Only whitespace may
/// precede it; a docblock after the first statement is ordinary source.
pub fn leading_block(source: &str) -> Option<&str> {
    DOCBLOCK_RE
        .captures(source)
        .and_then(|captures| captures.get(1))
        .map(|inner| inner.as_str())
}

/// All `@key value` pragmas in the leading docblock, in order of
/// appearance.
pub fn parse_pragmas(source: &str) -> Vec<(String, String)> {
    let Some(block) = leading_block(source) else {
        return Vec::new();
    };
    PRAGMA_RE
        .captures_iter(block)
        .map(|captures| (captures[1].to_string(), captures[2].to_string()))
        .collect()
}

/// Module identity a file claims via `@providesModule`. Files without
/// the pragma are indexed but stay unnamed.
pub fn provides_module(source: &str) -> Option<String> {
    parse_pragmas(source)
        .into_iter()
        .find(|(key, _)| key == "providesModule")
        .map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_provides_module_pragma() {
        let source = "/**\n * @providesModule Banana\n */\nmodule.exports = {};";
        assert_eq!(provides_module(source), Some("Banana".to_string()));
    }

    #[test]
    fn allows_leading_whitespace() {
        let source = "\n\n  /** @providesModule Apple */\nexports.ok = true;";
        assert_eq!(provides_module(source), Some("Apple".to_string()));
    }

    #[test]
    fn ignores_docblock_after_code() {
        let source = "const x = 1;\n/** @providesModule Late */";
        assert_eq!(provides_module(source), None);
    }

    #[test]
    fn ignores_files_without_pragma() {
        let source = "/** plain header comment */\nmodule.exports = {};";
        assert_eq!(provides_module(source), None);
    }

    #[test]
    fn reads_other_pragmas_in_order() {
        let source = "/**\n * @providesModule Pear\n * @flow strict\n */";
        let pragmas = parse_pragmas(source);
        assert_eq!(
            pragmas,
            vec![
                ("providesModule".to_string(), "Pear".to_string()),
                ("flow".to_string(), "strict".to_string()),
            ]
        );
    }
}
