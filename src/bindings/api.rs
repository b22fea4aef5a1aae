// API Functions - PyO3-exposed functions for Python
//
// Stateless helpers: surface scanning, content hashing, identifier synthesis
// and the node_modules reachability rule.

use super::program::parse_script_target;
use crate::default_export::module_specifier_to_valid_identifier;
use crate::importable;
use crate::surface::{fingerprint, scan_source_file};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

/// Scan a TypeScript/JavaScript file for its module-affecting surface
///
/// Args:
///     file_name (str): File name (selects the grammar; `.d.ts` marks declarations)
///     content (str): Source text
///
/// Returns:
///     str: JSON object with module indicators, augmentations, ambient modules and imports
///
/// Raises:
///     ValueError: If the language is not supported
#[pyfunction]
#[pyo3(signature = (file_name, content))]
pub fn scan_surface(file_name: &str, content: &str) -> PyResult<String> {
    let surface = scan_source_file(file_name, content)
        .map_err(|e| PyValueError::new_err(format!("Surface scan failed: {}", e)))?;
    serde_json::to_string(&surface)
        .map_err(|e| PyValueError::new_err(format!("Serialization failed: {}", e)))
}

/// Compute the blake3 fingerprint used as a declaration's structural identity
///
/// Returns:
///     str: 64-character hex digest
#[pyfunction]
pub fn hash_content(content: &str) -> String {
    fingerprint(content)
}

/// Camel-case the last segment of a module specifier into an identifier
///
/// Example:
///     >>> module_specifier_to_identifier("lodash/some-module")
///     'someModule'
#[pyfunction]
#[pyo3(signature = (module_specifier, target = "es5"))]
pub fn module_specifier_to_identifier(module_specifier: &str, target: &str) -> PyResult<String> {
    Ok(module_specifier_to_valid_identifier(
        module_specifier,
        parse_script_target(target)?,
    ))
}

/// Whether a file inside node_modules is reachable from an importing file
#[pyfunction]
#[pyo3(signature = (from_path, to_path, use_case_sensitive_file_names = true, global_cache_path = None))]
pub fn is_importable_path(
    from_path: &str,
    to_path: &str,
    use_case_sensitive_file_names: bool,
    global_cache_path: Option<&str>,
) -> bool {
    importable::is_importable_path(
        from_path,
        to_path,
        use_case_sensitive_file_names,
        global_cache_path,
    )
}
