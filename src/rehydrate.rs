//! Turning cached records back into records with live handles.

use crate::cache::SymbolExportInfo;
use crate::checker::{unescape_leading_underscores, ExportKind, Provenance, SymbolId};
use crate::error::{ExportMapError, Result};
use crate::host::ExportMapHost;
use crate::side_table::SymbolSideTable;
use crate::store::CachedExportInfo;
use tracing::trace;

impl CachedExportInfo {
    fn with_handles(&self, symbol: SymbolId, module_symbol: SymbolId) -> SymbolExportInfo {
        SymbolExportInfo {
            symbol,
            module_symbol,
            symbol_name: self.symbol_name.clone(),
            module_name: self.module_name.clone(),
            module_file_name: self.module_file_name.clone(),
            export_kind: self.export_kind,
            target_flags: self.target_flags,
            provenance: self.provenance,
        }
    }
}

/// Inline handles, then the side table, then a fresh lookup through the
/// program the record came from (memoised into the side table).
///
/// A record that cannot be re-found is an invariant violation: the cache
/// should have been cleared before its program changed that much.
pub(crate) fn rehydrate(
    info: &CachedExportInfo,
    symbols: &mut SymbolSideTable,
    host: &dyn ExportMapHost,
) -> Result<SymbolExportInfo> {
    if let (Some(symbol), Some(module_symbol)) = (info.symbol, info.module_symbol) {
        return Ok(info.with_handles(symbol, module_symbol));
    }
    let cached = symbols.get(info.id);
    if let Some((symbol, module_symbol)) = cached {
        return Ok(info.with_handles(symbol, module_symbol));
    }

    let program = match info.provenance {
        Provenance::Primary => host.current_program(),
        Provenance::InstalledPackages => host.installed_packages_program(),
    }
    .ok_or(ExportMapError::ProgramUnavailable(info.provenance))?;
    let checker = program.type_checker();

    let module_symbol = match info.module_symbol {
        Some(module_symbol) => Some(module_symbol),
        None => match &info.module_file_name {
            Some(file_name) => program
                .get_source_file(file_name)
                .and_then(|file| file.symbol)
                .map(|symbol| checker.merged_symbol(symbol)),
            None => checker.try_find_ambient_module(&info.module_name),
        },
    }
    .ok_or_else(|| ExportMapError::ModuleNotFound {
        module_name: info.module_name.clone(),
        symbol_name: info.symbol_name.clone(),
    })?;

    let symbol = match info.symbol {
        Some(symbol) => Some(symbol),
        None if info.export_kind == ExportKind::ExportEquals => {
            Some(checker.resolve_external_module_symbol(module_symbol))
        }
        None => checker.try_get_member_in_module_exports_and_properties(
            unescape_leading_underscores(&info.symbol_table_key),
            module_symbol,
        ),
    }
    .ok_or_else(|| ExportMapError::SymbolNotFound {
        symbol_name: info.symbol_name.clone(),
        symbol_table_key: info.symbol_table_key.clone(),
        module_name: checker.symbol_name(module_symbol),
    })?;

    trace!(
        "Rehydrated '{}' from {} (record {})",
        info.symbol_name,
        info.module_name,
        info.id
    );
    symbols.insert(info.id, symbol, module_symbol);
    Ok(info.with_handles(symbol, module_symbol))
}
