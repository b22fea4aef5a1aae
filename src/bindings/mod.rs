// PyO3 Bindings Module
//
// Python wrappers around the export-info cache, the in-memory program and the
// surface scanner, so the Python side can drive auto-import suggestions.

mod api;
mod export_info;
mod export_map;
mod program;

// Re-export for lib.rs
pub use api::{hash_content, is_importable_path, module_specifier_to_identifier, scan_surface};
pub use export_info::PyExportInfo;
pub use export_map::PyExportInfoMap;
pub use program::PyProgram;
