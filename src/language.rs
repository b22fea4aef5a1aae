//! Language Support - Shared tree-sitter language configuration
//!
//! Only the languages that can contribute importable modules are supported:
//! TypeScript (including declaration files), TSX and JavaScript.

use anyhow::Result;
use std::path::Path;

/// Get tree-sitter language parser for a given language name
///
/// This is the SINGLE SOURCE OF TRUTH for grammar selection in the surface scanner.
pub fn get_tree_sitter_language(language: &str) -> Result<tree_sitter::Language> {
    match language {
        "typescript" => Ok(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
        "tsx" => Ok(tree_sitter_typescript::LANGUAGE_TSX.into()),
        "javascript" => Ok(tree_sitter_javascript::LANGUAGE.into()),
        _ => Err(anyhow::anyhow!(
            "Unsupported language: '{}'. Supported languages: typescript, tsx, javascript",
            language
        )),
    }
}

/// Detect language from file extension
///
/// Returns the language name that can be passed to `get_tree_sitter_language()`.
pub fn detect_language_from_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "ts" | "mts" | "cts" => Some("typescript"),
        "tsx" => Some("tsx"),
        // JSX parses with the JavaScript grammar
        "js" | "jsx" | "mjs" | "cjs" => Some("javascript"),
        _ => None,
    }
}

/// Detect language from a file name
pub fn detect_language_from_path(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");
    detect_language_from_extension(extension)
}

/// `.d.ts`, `.d.mts`, `.d.cts` and `.d.<ext>.ts` declaration files
pub fn is_declaration_file_name(file_name: &str) -> bool {
    let base = file_name.rsplit('/').next().unwrap_or(file_name);
    if base.ends_with(".d.ts") || base.ends_with(".d.mts") || base.ends_with(".d.cts") {
        return true;
    }
    // Arbitrary-extension declarations, e.g. `styles.d.css.ts`
    base.ends_with(".ts") && base.contains(".d.")
}

/// True for languages where CommonJS `require`/`module.exports` marks a module
pub fn is_javascript(language: &str) -> bool {
    language == "javascript"
}
