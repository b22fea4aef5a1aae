//! The export-info cache.
//!
//! One [`ExportInfoMap`] belongs to one editing session and is scoped to one
//! importing file at a time. Records are lightweight: symbol handles are kept
//! inline only when they are not transient, and otherwise live in a side table
//! that can be dropped at any time and re-derived through the checker.

use crate::checker::{
    is_external_module_symbol, skip_alias, unescape_leading_underscores, ExportKind, Provenance,
    ScriptTarget, SymbolFlags, SymbolId, TypeChecker,
};
use crate::config::ExportMapConfig;
use crate::default_export::default_export_name;
use crate::error::Result;
use crate::host::ExportMapHost;
use crate::key::{export_info_key, parse_key};
use crate::program::SourceFile;
use crate::rehydrate::rehydrate;
use crate::side_table::SymbolSideTable;
use crate::store::{CachedExportInfo, ExportInfoStore};
use crate::surface::ambient_module_declarations_are_equal;
use crate::utils::paths::{is_external_module_name_relative, strip_quotes};
use serde::Serialize;
use std::rc::Rc;
use tracing::debug;

/// An import suggestion with live handles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolExportInfo {
    pub symbol: SymbolId,
    pub module_symbol: SymbolId,
    /// Name an importer would write
    pub symbol_name: String,
    /// Module name without quotes
    pub module_name: String,
    /// Set when the module is a file rather than an ambient module
    pub module_file_name: Option<String>,
    pub export_kind: ExportKind,
    /// Flags of the alias-skipped target
    pub target_flags: SymbolFlags,
    pub provenance: Provenance,
}

pub struct ExportInfoMap {
    pub(crate) host: Rc<dyn ExportMapHost>,
    pub(crate) config: ExportMapConfig,
    store: ExportInfoStore,
    symbols: SymbolSideTable,
    next_id: u32,
    usable_by_file: Option<String>,
}

impl ExportInfoMap {
    pub fn new(host: Rc<dyn ExportMapHost>) -> Self {
        Self::with_config(host, ExportMapConfig::default())
    }

    pub fn with_config(host: Rc<dyn ExportMapHost>, config: ExportMapConfig) -> Self {
        Self {
            host,
            config,
            store: ExportInfoStore::default(),
            symbols: SymbolSideTable::default(),
            next_id: 1,
            usable_by_file: None,
        }
    }

    pub fn config(&self) -> &ExportMapConfig {
        &self.config
    }

    /// Path of the file the cache currently serves
    pub fn usable_by_file(&self) -> Option<&str> {
        self.usable_by_file.as_deref()
    }

    pub fn is_usable_by_file(&self, importing_file: &str) -> bool {
        self.usable_by_file.as_deref() == Some(importing_file)
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Number of grouping keys
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn clear(&mut self) {
        self.store.clear();
        self.symbols.clear();
        self.usable_by_file = None;
    }

    /// Drops live handles of transient records; the records themselves stay.
    pub fn release_symbols(&mut self) {
        debug!("Releasing {} cached symbol handles", self.symbols.len());
        self.symbols.clear();
    }

    /// Records one export of `module_symbol`.
    ///
    /// A different `importing_file` than the current owner clears the cache first.
    #[allow(clippy::too_many_arguments)]
    pub fn add(
        &mut self,
        importing_file: &str,
        symbol: SymbolId,
        symbol_table_key: &str,
        module_symbol: SymbolId,
        module_file: Option<&SourceFile>,
        export_kind: ExportKind,
        provenance: Provenance,
        script_target: ScriptTarget,
        checker: &dyn TypeChecker,
    ) {
        if !self.is_usable_by_file(importing_file) {
            self.clear();
            self.usable_by_file = Some(importing_file.to_string());
        }

        let named_symbol = match export_kind {
            ExportKind::Default => checker
                .local_symbol_for_export_default(symbol)
                .unwrap_or(symbol),
            _ => symbol,
        };
        // Named exports (and modules re-exported under a name) must be imported by
        // their table key; default-like exports can take any name, so find a good one
        let symbol_name = if export_kind == ExportKind::Named
            || is_external_module_symbol(named_symbol, checker)
        {
            unescape_leading_underscores(symbol_table_key).to_string()
        } else {
            default_export_name(symbol, checker, script_target).1
        };
        let module_name = strip_quotes(&checker.symbol_name(module_symbol)).to_string();

        let id = self.next_id;
        self.next_id += 1;

        let stored_symbol = (!checker.symbol_flags(symbol).contains(SymbolFlags::TRANSIENT))
            .then_some(symbol);
        let stored_module_symbol = (!checker
            .symbol_flags(module_symbol)
            .contains(SymbolFlags::TRANSIENT))
        .then_some(module_symbol);
        if stored_symbol.is_none() || stored_module_symbol.is_none() {
            self.symbols.insert(id, symbol, module_symbol);
        }

        let ambient_module_name =
            (!is_external_module_name_relative(&module_name)).then_some(module_name.as_str());
        let key = export_info_key(&symbol_name, symbol, ambient_module_name, checker);

        self.store.add(
            key,
            CachedExportInfo {
                id,
                symbol_name,
                symbol_table_key: symbol_table_key.to_string(),
                target_flags: checker.symbol_flags(skip_alias(symbol, checker)),
                module_name,
                module_file_name: module_file.map(|file| file.file_name.clone()),
                symbol: stored_symbol,
                module_symbol: stored_module_symbol,
                export_kind,
                provenance,
            },
        );
    }

    /// Every record under `key`, rehydrated, or `None` for a foreign file or unknown key.
    pub fn get(&mut self, importing_file: &str, key: &str) -> Result<Option<Vec<SymbolExportInfo>>> {
        if !self.is_usable_by_file(importing_file) {
            return Ok(None);
        }
        let Some(infos) = self.store.get(key) else {
            return Ok(None);
        };
        let host = self.host.as_ref();
        infos
            .iter()
            .map(|info| rehydrate(info, &mut self.symbols, host))
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    /// Visits every group as `(records, display_name, is_from_ambient_module, key)`.
    pub fn for_each<F>(&mut self, importing_file: &str, action: F) -> Result<()>
    where
        F: FnMut(&[SymbolExportInfo], &str, bool, &str),
    {
        self.search(importing_file, |_, _| true, action)
    }

    /// Like [`for_each`](Self::for_each), but only records whose display name and
    /// target flags pass `matches` are rehydrated. Groups left empty are skipped.
    pub fn search<M, F>(&mut self, importing_file: &str, mut matches: M, mut action: F) -> Result<()>
    where
        M: FnMut(&str, SymbolFlags) -> bool,
        F: FnMut(&[SymbolExportInfo], &str, bool, &str),
    {
        if !self.is_usable_by_file(importing_file) {
            return Ok(());
        }
        let host = self.host.as_ref();
        for (key, infos) in self.store.iter() {
            let parsed = parse_key(key);
            let mut rehydrated = Vec::with_capacity(infos.len());
            for info in infos {
                if matches(parsed.symbol_name, info.target_flags) {
                    rehydrated.push(rehydrate(info, &mut self.symbols, host)?);
                }
            }
            if !rehydrated.is_empty() {
                action(
                    &rehydrated,
                    parsed.symbol_name,
                    parsed.ambient_module_name.is_some(),
                    key,
                );
            }
        }
        Ok(())
    }

    /// Decides whether an edit to `old` (now `new`) invalidates the cache.
    ///
    /// Returns true when the cache was cleared. Otherwise the cache is re-pointed
    /// at `new` and stays usable.
    pub fn on_file_changed(
        &mut self,
        old: &SourceFile,
        new: &SourceFile,
        type_acquisition_enabled: bool,
    ) -> bool {
        if old.surface.is_global_only() && new.surface.is_global_only() {
            return false;
        }

        let owner_changed = self
            .usable_by_file
            .as_deref()
            .is_some_and(|owner| owner != new.path);
        // With type acquisition, node core imports steer whether node modules are suggested
        let node_core_usage_changed = type_acquisition_enabled
            && old.surface.consumes_node_core_modules() != new.surface.consumes_node_core_modules();
        if owner_changed
            || node_core_usage_changed
            || old.surface.module_augmentations != new.surface.module_augmentations
            || !ambient_module_declarations_are_equal(&old.surface, &new.surface)
        {
            debug!("Export info cache invalidated by change to {}", new.path);
            self.clear();
            return true;
        }

        self.usable_by_file = Some(new.path.clone());
        false
    }
}
