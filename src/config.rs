//! Configuration for the export-info cache and the importability filter.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Configuration for cache rebuilds and change detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportMapConfig {
    /// Number of enumerated modules between cancellation checks
    pub cancellation_check_interval: usize,
    /// Whether the installed-packages program contributes exports
    pub use_installed_packages: bool,
    /// Automatic type acquisition; makes node core imports affect suggestions
    pub type_acquisition_enabled: bool,
    /// Global typings cache whose node_modules are reachable from anywhere
    pub global_typings_cache_location: Option<String>,
    pub use_case_sensitive_file_names: bool,
}

impl Default for ExportMapConfig {
    fn default() -> Self {
        Self {
            cancellation_check_interval: 100,
            use_installed_packages: true,
            type_acquisition_enabled: false,
            global_typings_cache_location: None,
            use_case_sensitive_file_names: true,
        }
    }
}

impl ExportMapConfig {
    /// Parse a (possibly partial) JSON object; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(json)?;
        // An interval of 0 would never check
        config.cancellation_check_interval = config.cancellation_check_interval.max(1);
        Ok(config)
    }
}

/// User preferences that change which module specifiers are produced
///
/// Part of the memo key of the module specifier cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserPreferences {
    pub import_module_specifier_preference: Option<String>,
    pub import_module_specifier_ending: Option<String>,
    pub include_package_json_auto_imports: Option<String>,
}
