//! Rebuilding the cache for an importing file.

use crate::cache::ExportInfoMap;
use crate::cancellation::CancellationToken;
use crate::checker::{ExportKind, ScriptTarget, DEFAULT_EXPORT_NAME, EXPORT_EQUALS_NAME};
use crate::default_export::default_like_export_info;
use crate::enumerate::{for_each_external_module_to_import_from, ExternalModule};
use crate::error::{ExportMapError, Result};
use rustc_hash::FxHashSet;
use std::time::Instant;
use tracing::{debug, info};

/// Outcome of [`ExportInfoMap::refresh_for_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// The cache already served the file
    Hit,
    /// Every module was enumerated again
    Rebuilt,
}

impl ExportInfoMap {
    /// Makes the cache usable by `importing_file`, rebuilding it on a miss.
    ///
    /// A cancelled rebuild clears the cache and returns
    /// [`ExportMapError::Cancelled`]; the next call starts over.
    pub fn refresh_for_file(
        &mut self,
        importing_file: &str,
        cancellation: &dyn CancellationToken,
    ) -> Result<CacheStatus> {
        let start = Instant::now();
        // Producing the installed-packages program can invalidate the cache, so
        // ask for it before checking usability
        let installed_packages = if self.config.use_installed_packages {
            self.host.installed_packages_program()
        } else {
            None
        };

        if self.is_usable_by_file(importing_file) {
            debug!("Export info cache hit for {}", importing_file);
            return Ok(CacheStatus::Hit);
        }

        debug!(
            "Export info cache miss or empty for {}; calculating new results",
            importing_file
        );
        let program = self
            .host
            .current_program()
            .ok_or_else(|| ExportMapError::ProgramNotReady(importing_file.to_string()))?;
        let script_target = program.script_target();
        let check_interval = self.config.cancellation_check_interval;

        let outcome = for_each_external_module_to_import_from(
            &*program,
            installed_packages.as_deref(),
            cancellation,
            check_interval,
            |module| self.add_module_exports(importing_file, module, script_target),
        );

        match outcome {
            Ok(module_count) => {
                info!(
                    "Export info cache for {} rebuilt from {} modules ({} keys) in {:?}",
                    importing_file,
                    module_count,
                    self.len(),
                    start.elapsed()
                );
                Ok(CacheStatus::Rebuilt)
            }
            Err(err) => {
                debug!("Export info rebuild for {} stopped: {}", importing_file, err);
                self.clear();
                Err(err)
            }
        }
    }

    /// Adds the default-like export and every other importable export of one module.
    fn add_module_exports(
        &mut self,
        importing_file: &str,
        module: ExternalModule<'_>,
        script_target: ScriptTarget,
    ) {
        let checker = module.program.type_checker();
        let default_info = default_like_export_info(module.module_symbol, checker, script_target);
        if let Some(default_info) = &default_info {
            if checker.is_importable_symbol(default_info.symbol) {
                let key = match default_info.export_kind {
                    ExportKind::Default => DEFAULT_EXPORT_NAME,
                    _ => EXPORT_EQUALS_NAME,
                };
                self.add(
                    importing_file,
                    default_info.symbol,
                    key,
                    module.module_symbol,
                    module.source_file,
                    default_info.export_kind,
                    module.provenance,
                    script_target,
                    checker,
                );
            }
        }

        let default_symbol = default_info.map(|info| info.symbol);
        let mut seen_exports = FxHashSet::default();
        checker.for_each_export_and_property_of_module(module.module_symbol, &mut |exported, key| {
            if Some(exported) != default_symbol
                && checker.is_importable_symbol(exported)
                && seen_exports.insert(key.to_string())
            {
                self.add(
                    importing_file,
                    exported,
                    key,
                    module.module_symbol,
                    module.source_file,
                    ExportKind::Named,
                    module.provenance,
                    script_target,
                    checker,
                );
            }
        });
    }
}
