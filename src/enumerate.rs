//! Enumeration of every module an import could come from.

use crate::cancellation::CancellationToken;
use crate::checker::{Provenance, SymbolId};
use crate::error::Result;
use crate::program::{Program, SourceFile};
use std::time::Instant;
use tracing::debug;

/// A module found by [`for_each_external_module_to_import_from`].
#[derive(Clone, Copy)]
pub struct ExternalModule<'p> {
    pub module_symbol: SymbolId,
    /// `None` for ambient modules
    pub source_file: Option<&'p SourceFile>,
    /// Program the module belongs to
    pub program: &'p dyn Program,
    pub provenance: Provenance,
}

/// Visits the modules of `program`, then those of `installed_packages`.
///
/// Cancellation is checked before every `check_interval`-th module. Returns the
/// number of modules visited.
pub fn for_each_external_module_to_import_from<'p>(
    program: &'p dyn Program,
    installed_packages: Option<&'p dyn Program>,
    cancellation: &dyn CancellationToken,
    check_interval: usize,
    mut visit: impl FnMut(ExternalModule<'p>),
) -> Result<usize> {
    let interval = check_interval.max(1);
    let mut module_count = 0usize;
    let mut step = |module: ExternalModule<'p>| -> Result<()> {
        module_count += 1;
        if module_count % interval == 0 {
            cancellation.throw_if_cancellation_requested()?;
        }
        visit(module);
        Ok(())
    };

    for_each_external_module(program, Provenance::Primary, &mut step)?;
    if let Some(installed_packages) = installed_packages {
        let start = Instant::now();
        for_each_external_module(installed_packages, Provenance::InstalledPackages, &mut step)?;
        debug!(
            "for_each_external_module_to_import_from installed packages: {:?}",
            start.elapsed()
        );
    }
    Ok(module_count)
}

/// Ambient modules first (wildcard patterns are not importable), then module files.
fn for_each_external_module<'p>(
    program: &'p dyn Program,
    provenance: Provenance,
    visit: &mut impl FnMut(ExternalModule<'p>) -> Result<()>,
) -> Result<()> {
    let checker = program.type_checker();
    for ambient in checker.ambient_modules() {
        if checker.symbol_name(ambient).contains('*') {
            continue;
        }
        visit(ExternalModule {
            module_symbol: ambient,
            source_file: None,
            program,
            provenance,
        })?;
    }
    for source_file in program.source_files() {
        if !source_file.is_external_or_common_js_module() {
            continue;
        }
        let Some(symbol) = source_file.symbol else {
            continue;
        };
        visit(ExternalModule {
            module_symbol: checker.merged_symbol(symbol),
            source_file: Some(source_file),
            program,
            provenance,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancellation::{CancellationFlag, NeverCancelled};
    use crate::error::ExportMapError;
    use crate::memory::MemoryProgram;
    use crate::surface::FileSurface;
    use std::cell::Cell;

    #[derive(Default)]
    struct CountingToken {
        checks: Cell<usize>,
    }

    impl CancellationToken for CountingToken {
        fn is_cancellation_requested(&self) -> bool {
            self.checks.set(self.checks.get() + 1);
            false
        }
    }

    fn names(modules: &[(String, bool, Provenance)]) -> Vec<&str> {
        modules.iter().map(|(name, _, _)| name.as_str()).collect()
    }

    fn collect(
        program: &MemoryProgram,
        installed: Option<&MemoryProgram>,
    ) -> Vec<(String, bool, Provenance)> {
        let mut seen = Vec::new();
        for_each_external_module_to_import_from(
            program,
            installed.map(|p| p as &dyn Program),
            &NeverCancelled,
            100,
            |module| {
                seen.push((
                    module.program.type_checker().symbol_name(module.module_symbol),
                    module.source_file.is_some(),
                    module.provenance,
                ))
            },
        )
        .unwrap();
        seen
    }

    #[test]
    fn test_ambient_modules_then_files() {
        let mut program = MemoryProgram::new();
        program.add_module_file("/a.ts");
        program.add_ambient_module("path1");
        program.add_ambient_module("*.css");
        program.add_file("/globals.d.ts", FileSurface::default());
        program.add_file(
            "/legacy.js",
            FileSurface {
                common_js_module_indicator: true,
                ..Default::default()
            },
        );

        let seen = collect(&program, None);
        assert_eq!(names(&seen), vec!["\"path1\"", "\"/a\"", "\"/legacy\""]);
        assert!(!seen[0].1);
        assert!(seen[1].1 && seen[2].1);
        assert!(seen.iter().all(|(_, _, p)| *p == Provenance::Primary));
    }

    #[test]
    fn test_installed_packages_tagged() {
        let mut program = MemoryProgram::new();
        program.add_module_file("/a.ts");
        let mut installed = MemoryProgram::new();
        installed.add_module_file("/node_modules/lodash/index.d.ts");

        let seen = collect(&program, Some(&installed));
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].2, Provenance::Primary);
        assert_eq!(seen[1].0, "\"/node_modules/lodash/index\"");
        assert_eq!(seen[1].2, Provenance::InstalledPackages);
    }

    #[test]
    fn test_cancellation_checked_at_interval() {
        let mut program = MemoryProgram::new();
        for i in 0..7 {
            program.add_module_file(&format!("/m{}.ts", i));
        }
        let token = CountingToken::default();
        let count =
            for_each_external_module_to_import_from(&program, None, &token, 3, |_| {}).unwrap();
        assert_eq!(count, 7);
        assert_eq!(token.checks.get(), 2);
    }

    #[test]
    fn test_cancelled_enumeration_stops() {
        let mut program = MemoryProgram::new();
        for i in 0..5 {
            program.add_module_file(&format!("/m{}.ts", i));
        }
        let flag = CancellationFlag::new();
        flag.cancel();
        let mut visited = 0;
        let result = for_each_external_module_to_import_from(&program, None, &flag, 2, |_| {
            visited += 1
        });
        assert!(matches!(result, Err(ExportMapError::Cancelled)));
        assert_eq!(visited, 1);
    }
}
