//! Metadata extraction over source text. Everything here is a pure
//! function of the input string; file IO stays with the caller.

pub mod docblock;
pub mod requires;

/// What one file contributes to the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub module_id: Option<String>,
    pub dependencies: Vec<String>,
}

/// Scans a file's text for its claimed module identity and referenced
/// dependencies. The docblock is read from the raw text, before comment
/// stripping removes it.
pub fn scan(source: &str) -> ScanResult {
    ScanResult {
        module_id: docblock::provides_module(source),
        dependencies: requires::extract_dependencies(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_identity_and_dependencies_together() {
        let source = "\
/**
 * @providesModule Kitchen
 */
const sink = require('Sink');
import faucet from 'Faucet';";
        let result = scan(source);
        assert_eq!(result.module_id, Some("Kitchen".to_string()));
        assert_eq!(result.dependencies, vec!["Faucet", "Sink"]);
    }

    #[test]
    fn scans_plain_files_to_empty_result() {
        let result = scan("const answer = 42;");
        assert_eq!(result.module_id, None);
        assert!(result.dependencies.is_empty());
    }
}
