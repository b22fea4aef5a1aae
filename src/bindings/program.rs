// PyProgram - PyO3 wrapper for building an in-memory analysis context
//
// Python describes one program generation (files, symbols, exports) and hands
// it to an ExportInfoMap, which takes a snapshot.

use crate::checker::{ScriptTarget, SymbolFlags, SymbolId};
use crate::memory::MemoryProgram;
use crate::surface::scan_source_file;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

/// Python-accessible program builder
///
/// Every `add_*` method returns the integer handle of the new symbol.
#[pyclass(name = "Program", unsendable)]
pub struct PyProgram {
    inner: MemoryProgram,
}

impl PyProgram {
    /// Copy of the program as built so far
    pub fn snapshot(&self) -> MemoryProgram {
        self.inner.clone()
    }
}

pub(super) fn parse_script_target(target: &str) -> PyResult<ScriptTarget> {
    match target.to_ascii_lowercase().as_str() {
        "es3" => Ok(ScriptTarget::Es3),
        "es5" => Ok(ScriptTarget::Es5),
        "es2015" | "es6" => Ok(ScriptTarget::Es2015),
        "es2020" => Ok(ScriptTarget::Es2020),
        "esnext" => Ok(ScriptTarget::EsNext),
        other => Err(PyValueError::new_err(format!(
            "Unsupported script target: '{}'",
            other
        ))),
    }
}

#[pymethods]
impl PyProgram {
    #[new]
    #[pyo3(signature = (target = "es5"))]
    fn new(target: &str) -> PyResult<Self> {
        Ok(PyProgram {
            inner: MemoryProgram::with_target(parse_script_target(target)?),
        })
    }

    /// Declare a symbol
    ///
    /// Args:
    ///     name (str): Unescaped source name
    ///     flags (int): SymbolFlags bits
    #[pyo3(signature = (name, flags))]
    fn add_symbol(&mut self, name: &str, flags: u32) -> u32 {
        self.inner
            .add_symbol(name, SymbolFlags::from_bits_truncate(flags))
            .0
    }

    fn add_alias(&mut self, name: &str, target: u32) -> u32 {
        self.inner.add_alias(name, SymbolId(target)).0
    }

    fn add_module_file(&mut self, file_name: &str) -> u32 {
        self.inner.add_module_file(file_name).0
    }

    /// Add a source file, deriving its module surface from its text
    ///
    /// Returns:
    ///     int | None: Module symbol, or None for a global script
    ///
    /// Raises:
    ///     ValueError: If the file's language is not supported
    fn add_file(&mut self, file_name: &str, content: &str) -> PyResult<Option<u32>> {
        let surface = scan_source_file(file_name, content)
            .map_err(|e| PyValueError::new_err(format!("Surface scan failed: {}", e)))?;
        Ok(self.inner.add_file(file_name, surface).map(|symbol| symbol.0))
    }

    fn add_ambient_module(&mut self, module_name: &str) -> u32 {
        self.inner.add_ambient_module(module_name).0
    }

    fn add_export(&mut self, module: u32, key: &str, symbol: u32) {
        self.inner.add_export(SymbolId(module), key, SymbolId(symbol));
    }

    fn add_member(&mut self, owner: u32, name: &str, symbol: u32) {
        self.inner.add_member(SymbolId(owner), name, SymbolId(symbol));
    }

    fn set_export_equals(&mut self, module: u32, target: u32) {
        self.inner.set_export_equals(SymbolId(module), SymbolId(target));
    }

    fn set_local_symbol_for_export_default(&mut self, symbol: u32, local: u32) {
        self.inner
            .set_local_symbol_for_export_default(SymbolId(symbol), SymbolId(local));
    }

    fn set_export_default_declaration_name(&mut self, symbol: u32, name: &str) {
        self.inner
            .set_export_default_declaration_name(SymbolId(symbol), name);
    }

    fn set_importable(&mut self, symbol: u32, importable: bool) {
        self.inner.set_importable(SymbolId(symbol), importable);
    }

    fn mark_transient(&mut self, symbol: u32) {
        self.inner.mark_transient(SymbolId(symbol));
    }
}
