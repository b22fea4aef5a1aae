// PyExportInfo - PyO3 wrapper for a rehydrated export record

use crate::cache::SymbolExportInfo;
use pyo3::prelude::*;

/// Python-accessible import suggestion
///
/// Symbols are opaque integer handles into the program that produced them.
/// All fields are read-only from Python.
#[pyclass(name = "ExportInfo")]
pub struct PyExportInfo {
    inner: SymbolExportInfo,
}

impl PyExportInfo {
    pub fn from_export_info(info: SymbolExportInfo) -> Self {
        PyExportInfo { inner: info }
    }
}

#[pymethods]
impl PyExportInfo {
    #[getter]
    fn symbol(&self) -> u32 {
        self.inner.symbol.0
    }

    #[getter]
    fn module_symbol(&self) -> u32 {
        self.inner.module_symbol.0
    }

    #[getter]
    fn symbol_name(&self) -> String {
        self.inner.symbol_name.clone()
    }

    #[getter]
    fn module_name(&self) -> String {
        self.inner.module_name.clone()
    }

    #[getter]
    fn module_file_name(&self) -> Option<String> {
        self.inner.module_file_name.clone()
    }

    #[getter]
    fn export_kind(&self) -> String {
        self.inner.export_kind.to_string()
    }

    #[getter]
    fn target_flags(&self) -> u32 {
        self.inner.target_flags.bits()
    }

    #[getter]
    fn provenance(&self) -> String {
        self.inner.provenance.to_string()
    }

    #[getter]
    fn is_from_package_json(&self) -> bool {
        self.inner.provenance.is_from_package_json()
    }

    fn __repr__(&self) -> String {
        format!(
            "ExportInfo(symbol_name='{}', module_name='{}', export_kind='{}')",
            self.inner.symbol_name, self.inner.module_name, self.inner.export_kind
        )
    }
}
