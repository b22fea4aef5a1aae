//! Error types for the export-info cache.
//!
//! Expected absences (no default export, wildcard ambient modules) are plain
//! `None`s and never show up here. What does show up is either a cooperative
//! abort or a broken cache invariant.

use crate::checker::Provenance;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExportMapError>;

#[derive(Debug, Error)]
pub enum ExportMapError {
    /// The rebuild observed the cancellation token.
    #[error("operation was cancelled")]
    Cancelled,

    /// A rebuild was requested before the host has a program to enumerate.
    #[error("no program is available yet to collect export info for '{0}'")]
    ProgramNotReady(String),

    /// Rehydration needed a program the host no longer provides.
    #[error("no {0} program is available to rehydrate cached exports")]
    ProgramUnavailable(Provenance),

    /// Rehydration could not re-find a cached module.
    #[error("could not find module '{module_name}' while rehydrating '{symbol_name}'")]
    ModuleNotFound {
        module_name: String,
        symbol_name: String,
    },

    /// Rehydration could not re-find a cached symbol.
    #[error("could not find symbol '{symbol_name}' by key '{symbol_table_key}' in module {module_name}")]
    SymbolNotFound {
        symbol_name: String,
        symbol_table_key: String,
        module_name: String,
    },

    #[error("invalid export map configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

impl ExportMapError {
    /// True for errors that mean the cache was not cleared when it should have been.
    ///
    /// Callers must not retry or fall back on these; the cached suggestions are wrong.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            ExportMapError::ProgramUnavailable(_)
                | ExportMapError::ModuleNotFound { .. }
                | ExportMapError::SymbolNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invariant_classification() {
        assert!(!ExportMapError::Cancelled.is_invariant_violation());
        assert!(!ExportMapError::ProgramNotReady("/app.ts".to_string()).is_invariant_violation());
        assert!(ExportMapError::ProgramUnavailable(Provenance::Primary).is_invariant_violation());
        assert!(ExportMapError::SymbolNotFound {
            symbol_name: "Bar".to_string(),
            symbol_table_key: "Bar".to_string(),
            module_name: "path1".to_string(),
        }
        .is_invariant_violation());
    }

    #[test]
    fn test_symbol_not_found_message() {
        let err = ExportMapError::SymbolNotFound {
            symbol_name: "someModule".to_string(),
            symbol_table_key: "default".to_string(),
            module_name: "\"/someModule\"".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "could not find symbol 'someModule' by key 'default' in module \"/someModule\""
        );
    }
}
