// Export Map Core - export-info cache for auto-import suggestions
//
// Caches every importable (name, module) pairing of a program for one importing
// file, rehydrates symbol handles lazily, and decides which edits invalidate it.
// Architecture: "Rust Sandwich" - Rust for the cache, Python (feature `python`)
// for orchestration.

#[cfg(feature = "python")]
use pyo3::prelude::*;

pub mod cache;
pub mod cancellation;
pub mod checker;
pub mod collect;
pub mod config;
pub mod default_export;
pub mod enumerate;
pub mod error;
pub mod host;
pub mod importable;
pub mod key;
pub mod language;
pub mod memory;
pub mod program;
pub mod surface;
pub mod utils;

mod rehydrate;
mod side_table;
mod store;

// PyO3 bindings layer
#[cfg(feature = "python")]
pub mod bindings;

pub use cache::{ExportInfoMap, SymbolExportInfo};
pub use cancellation::{CancellationFlag, CancellationToken, NeverCancelled};
pub use checker::{ExportKind, Provenance, ScriptTarget, SymbolFlags, SymbolId, TypeChecker};
pub use collect::CacheStatus;
pub use config::{ExportMapConfig, UserPreferences};
pub use error::{ExportMapError, Result};
pub use host::{ExportMapHost, SharedHost};
pub use memory::MemoryProgram;
pub use program::{Program, SourceFile};
pub use surface::{scan_source_file, FileSurface};

/// Export Map Core Python module
#[cfg(feature = "python")]
#[pymodule]
fn export_map_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    // Add Python functions
    m.add_function(wrap_pyfunction!(bindings::scan_surface, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::hash_content, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::module_specifier_to_identifier, m)?)?;
    m.add_function(wrap_pyfunction!(bindings::is_importable_path, m)?)?;

    // Add Python classes
    m.add_class::<bindings::PyProgram>()?;
    m.add_class::<bindings::PyExportInfoMap>()?;
    m.add_class::<bindings::PyExportInfo>()?;

    Ok(())
}
