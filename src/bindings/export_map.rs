// PyExportInfoMap - PyO3 wrapper for the export-info cache
//
// Owns the cache together with the host it reads programs from. The cache is
// single-threaded, so the class is unsendable.

use super::{PyExportInfo, PyProgram};
use crate::cache::{ExportInfoMap, SymbolExportInfo};
use crate::cancellation::NeverCancelled;
use crate::collect::CacheStatus;
use crate::config::ExportMapConfig;
use crate::error::ExportMapError;
use crate::host::SharedHost;
use crate::program::SourceFile;
use crate::surface::scan_source_file;
use crate::utils::name_match::characters_fuzzy_match_in_string;
use pyo3::exceptions::{PyAssertionError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use std::rc::Rc;

fn to_py_err(err: ExportMapError) -> PyErr {
    if err.is_invariant_violation() {
        PyAssertionError::new_err(err.to_string())
    } else if matches!(err, ExportMapError::InvalidConfig(_)) {
        PyValueError::new_err(err.to_string())
    } else {
        PyRuntimeError::new_err(err.to_string())
    }
}

fn wrap(infos: &[SymbolExportInfo]) -> Vec<PyExportInfo> {
    infos
        .iter()
        .map(|info| PyExportInfo::from_export_info(info.clone()))
        .collect()
}

/// Python-accessible export-info cache
///
/// Args:
///     config_json (str | None): Partial JSON configuration; missing fields take defaults
#[pyclass(name = "ExportInfoMap", unsendable)]
pub struct PyExportInfoMap {
    host: Rc<SharedHost>,
    inner: ExportInfoMap,
}

#[pymethods]
impl PyExportInfoMap {
    #[new]
    #[pyo3(signature = (config_json = None))]
    fn new(config_json: Option<&str>) -> PyResult<Self> {
        let config = match config_json {
            Some(json) => ExportMapConfig::from_json(json).map_err(to_py_err)?,
            None => ExportMapConfig::default(),
        };
        let host = Rc::new(SharedHost::default());
        let inner = ExportInfoMap::with_config(host.clone(), config);
        Ok(PyExportInfoMap { host, inner })
    }

    /// Install a new generation of the primary program
    fn set_program(&self, program: PyRef<'_, PyProgram>) {
        self.host.set_program(Some(Rc::new(program.snapshot())));
    }

    #[pyo3(signature = (program = None))]
    fn set_installed_packages_program(&self, program: Option<PyRef<'_, PyProgram>>) {
        self.host
            .set_installed_packages_program(program.map(|p| Rc::new(p.snapshot()) as _));
    }

    /// Make the cache usable by `importing_file`
    ///
    /// Returns:
    ///     bool: True if the cache was rebuilt, False on a cache hit
    fn refresh(&mut self, importing_file: &str) -> PyResult<bool> {
        let status = self
            .inner
            .refresh_for_file(importing_file, &NeverCancelled)
            .map_err(to_py_err)?;
        Ok(status == CacheStatus::Rebuilt)
    }

    fn is_usable_by_file(&self, importing_file: &str) -> bool {
        self.inner.is_usable_by_file(importing_file)
    }

    fn get(&mut self, importing_file: &str, key: &str) -> PyResult<Option<Vec<PyExportInfo>>> {
        let infos = self.inner.get(importing_file, key).map_err(to_py_err)?;
        Ok(infos.as_deref().map(wrap))
    }

    /// Every group as (key, display_name, is_from_ambient_module, records)
    fn groups(
        &mut self,
        importing_file: &str,
    ) -> PyResult<Vec<(String, String, bool, Vec<PyExportInfo>)>> {
        let mut groups = Vec::new();
        self.inner
            .for_each(importing_file, |infos, name, is_ambient, key| {
                groups.push((key.to_string(), name.to_string(), is_ambient, wrap(infos)));
            })
            .map_err(to_py_err)?;
        Ok(groups)
    }

    /// Groups whose display name fuzzy-matches a typed fragment
    ///
    /// Only matching groups are rehydrated.
    fn search(
        &mut self,
        importing_file: &str,
        fragment: &str,
    ) -> PyResult<Vec<(String, Vec<PyExportInfo>)>> {
        let fragment = fragment.to_lowercase();
        let mut found = Vec::new();
        self.inner
            .search(
                importing_file,
                |name, _| characters_fuzzy_match_in_string(name, &fragment),
                |infos, name, _, _| found.push((name.to_string(), wrap(infos))),
            )
            .map_err(to_py_err)?;
        Ok(found)
    }

    /// Report an edit; returns True if the cache was cleared
    ///
    /// Raises:
    ///     ValueError: If either text cannot be scanned
    fn on_file_changed(&mut self, file_name: &str, old_content: &str, new_content: &str) -> PyResult<bool> {
        let scan = |content: &str| {
            scan_source_file(file_name, content)
                .map(|surface| SourceFile::new(file_name, surface))
                .map_err(|e| PyValueError::new_err(format!("Surface scan failed: {}", e)))
        };
        let old = scan(old_content)?;
        let new = scan(new_content)?;
        let type_acquisition_enabled = self.inner.config().type_acquisition_enabled;
        Ok(self.inner.on_file_changed(&old, &new, type_acquisition_enabled))
    }

    fn release_symbols(&mut self) {
        self.inner.release_symbols();
    }

    fn clear(&mut self) {
        self.inner.clear();
    }

    fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }
}
