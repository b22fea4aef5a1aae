//! Naming of a module's default-like surface (`export default` / `export =`).

use crate::checker::{
    unescape_leading_underscores, ExportKind, ScriptTarget, SymbolFlags, SymbolId, TypeChecker,
    DEFAULT_EXPORT_NAME, EXPORT_EQUALS_NAME,
};
use crate::utils::paths::{get_base_file_name, remove_file_extension, strip_quotes};
use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;

/// Upper bound on alias hops followed while looking for a name.
const MAX_ALIAS_DEPTH: usize = 64;

/// Words that cannot be used as a binding name in any context.
static RESERVED_WORDS: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
        "do", "else", "enum", "export", "extends", "false", "finally", "for", "function", "if",
        "import", "in", "instanceof", "new", "null", "return", "super", "switch", "this",
        "throw", "true", "try", "typeof", "var", "void", "while", "with", "implements",
        "interface", "let", "package", "private", "protected", "public", "static", "yield",
    ]
    .into_iter()
    .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultLikeExport {
    pub symbol: SymbolId,
    pub export_kind: ExportKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultExportInfo {
    pub symbol: SymbolId,
    pub export_kind: ExportKind,
    /// Symbol whose meaning (value/type/namespace) the import would carry
    pub symbol_for_meaning: SymbolId,
    /// Name an importer would most likely bind
    pub name: String,
}

/// The `export =` target when it differs from the module, else the `default` member.
pub fn default_like_export(module: SymbolId, checker: &dyn TypeChecker) -> Option<DefaultLikeExport> {
    let export_equals = checker.resolve_external_module_symbol(module);
    if export_equals != module {
        return Some(DefaultLikeExport {
            symbol: export_equals,
            export_kind: ExportKind::ExportEquals,
        });
    }
    checker
        .try_get_member_in_module_exports(DEFAULT_EXPORT_NAME, module)
        .map(|symbol| DefaultLikeExport {
            symbol,
            export_kind: ExportKind::Default,
        })
}

pub fn default_like_export_info(
    module: SymbolId,
    checker: &dyn TypeChecker,
    target: ScriptTarget,
) -> Option<DefaultExportInfo> {
    let DefaultLikeExport {
        symbol,
        export_kind,
    } = default_like_export(module, checker)?;
    let (symbol_for_meaning, name) = default_export_name(symbol, checker, target);
    Some(DefaultExportInfo {
        symbol,
        export_kind,
        symbol_for_meaning,
        name,
    })
}

/// Best binding name for a default-like export, with the symbol that name belongs to.
///
/// Tried in order: the local declaration bound by the export, the name written in
/// the export statement, the same procedure on the alias target (only when that
/// target has a parent), the symbol's own name, a name derived from the module.
pub(crate) fn default_export_name(
    default_export: SymbolId,
    checker: &dyn TypeChecker,
    target: ScriptTarget,
) -> (SymbolId, String) {
    let mut symbol = default_export;
    for _ in 0..MAX_ALIAS_DEPTH {
        if let Some(local) = checker.local_symbol_for_export_default(symbol) {
            let name = checker.symbol_name(local);
            return (local, unescape_leading_underscores(&name).to_string());
        }
        if let Some(name) = checker.export_default_declaration_name(symbol) {
            return (symbol, name);
        }
        if !checker.symbol_flags(symbol).contains(SymbolFlags::ALIAS) {
            break;
        }
        // Aliases of globals (`export default globalThis.x`) have no parent and keep the alias
        match checker.immediate_aliased_symbol(symbol) {
            Some(aliased) if checker.symbol_parent(aliased).is_some() => symbol = aliased,
            _ => break,
        }
    }

    let own_name = checker.symbol_name(symbol);
    if own_name != DEFAULT_EXPORT_NAME && own_name != EXPORT_EQUALS_NAME {
        return (symbol, unescape_leading_underscores(&own_name).to_string());
    }
    (symbol, name_for_exported_symbol(symbol, checker, target))
}

/// Name of an exported symbol, looking through the `default`/`export=` sentinels.
///
/// `export default foo` gives `foo`; `export default 0` in `my-module.ts` gives `myModule`.
pub fn name_for_exported_symbol(
    symbol: SymbolId,
    checker: &dyn TypeChecker,
    target: ScriptTarget,
) -> String {
    let name = checker.symbol_name(symbol);
    let is_sentinel = name == DEFAULT_EXPORT_NAME || name == EXPORT_EQUALS_NAME;
    if is_sentinel && !checker.symbol_flags(symbol).contains(SymbolFlags::TRANSIENT) {
        if let Some(declared) = checker.export_default_declaration_name(symbol) {
            return declared;
        }
        if let Some(parent) = checker.symbol_parent(symbol) {
            return module_symbol_to_valid_identifier(parent, checker, target);
        }
    }
    unescape_leading_underscores(&name).to_string()
}

pub fn module_symbol_to_valid_identifier(
    module: SymbolId,
    checker: &dyn TypeChecker,
    target: ScriptTarget,
) -> String {
    let name = checker.symbol_name(module);
    module_specifier_to_valid_identifier(remove_file_extension(strip_quotes(&name)), target)
}

/// Camel-cases the last path segment of a specifier into an identifier.
///
/// ```
/// use export_map_core::checker::ScriptTarget;
/// use export_map_core::default_export::module_specifier_to_valid_identifier;
///
/// assert_eq!(module_specifier_to_valid_identifier("lodash/some-module", ScriptTarget::Es5), "someModule");
/// assert_eq!(module_specifier_to_valid_identifier("./pkg/index", ScriptTarget::Es5), "pkg");
/// assert_eq!(module_specifier_to_valid_identifier("./class", ScriptTarget::Es5), "_class");
/// ```
pub fn module_specifier_to_valid_identifier(module_specifier: &str, target: ScriptTarget) -> String {
    let specifier = module_specifier
        .strip_suffix("/index")
        .unwrap_or(module_specifier);
    let base_name = get_base_file_name(specifier);

    let mut result = String::with_capacity(base_name.len());
    let mut chars = base_name.chars();
    let mut last_char_was_valid = true;
    match chars.next() {
        Some(first) if is_identifier_start(first, target) => result.push(first),
        _ => last_char_was_valid = false,
    }
    for ch in chars {
        let is_valid = is_identifier_part(ch, target);
        if is_valid {
            if last_char_was_valid {
                result.push(ch);
            } else {
                result.extend(ch.to_uppercase());
            }
        }
        last_char_was_valid = is_valid;
    }

    if RESERVED_WORDS.contains(result.as_str()) {
        format!("_{}", result)
    } else if result.is_empty() {
        "_".to_string()
    } else {
        result
    }
}

/// Supplementary-plane characters only count for ES2015 and later targets.
fn is_in_target_plane(ch: char, target: ScriptTarget) -> bool {
    (ch as u32) <= 0xFFFF || target >= ScriptTarget::Es2015
}

fn is_identifier_start(ch: char, target: ScriptTarget) -> bool {
    ch.is_ascii_alphabetic()
        || ch == '$'
        || ch == '_'
        || (!ch.is_ascii() && ch.is_alphabetic() && is_in_target_plane(ch, target))
}

fn is_identifier_part(ch: char, target: ScriptTarget) -> bool {
    is_identifier_start(ch, target)
        || ch.is_ascii_digit()
        || (!ch.is_ascii() && ch.is_alphanumeric() && is_in_target_plane(ch, target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryProgram;

    #[test]
    fn test_no_default_like_export() {
        let mut program = MemoryProgram::new();
        let module = program.add_module_file("/a.ts");
        let named = program.add_symbol("a", SymbolFlags::VARIABLE);
        program.add_export(module, "a", named);

        assert_eq!(default_like_export(module, &program), None);
        assert_eq!(default_like_export_info(module, &program, ScriptTarget::Es5), None);
    }

    #[test]
    fn test_export_equals_wins_over_default() {
        let mut program = MemoryProgram::new();
        let module = program.add_ambient_module("express");
        let target = program.add_symbol("e", SymbolFlags::FUNCTION);
        let default = program.add_symbol("default", SymbolFlags::FUNCTION);
        program.add_export(module, "default", default);
        program.set_export_equals(module, target);

        let found = default_like_export(module, &program).unwrap();
        assert_eq!(found.symbol, target);
        assert_eq!(found.export_kind, ExportKind::ExportEquals);
    }

    #[test]
    fn test_local_symbol_name_first() {
        let mut program = MemoryProgram::new();
        let module = program.add_module_file("/someModule.ts");
        let local = program.add_symbol("someModule", SymbolFlags::FUNCTION);
        let default = program.add_symbol("default", SymbolFlags::FUNCTION);
        program.add_export(module, "default", default);
        program.set_local_symbol_for_export_default(default, local);
        program.set_export_default_declaration_name(default, "ignored");

        let info = default_like_export_info(module, &program, ScriptTarget::Es5).unwrap();
        assert_eq!(info.export_kind, ExportKind::Default);
        assert_eq!(info.symbol, default);
        assert_eq!(info.symbol_for_meaning, local);
        assert_eq!(info.name, "someModule");
    }

    #[test]
    fn test_declaration_name_second() {
        let mut program = MemoryProgram::new();
        let module = program.add_module_file("/a.ts");
        let default = program.add_symbol("default", SymbolFlags::ALIAS);
        program.add_export(module, "default", default);
        program.set_export_default_declaration_name(default, "foo");

        let info = default_like_export_info(module, &program, ScriptTarget::Es5).unwrap();
        assert_eq!(info.name, "foo");
        assert_eq!(info.symbol_for_meaning, default);
    }

    #[test]
    fn test_alias_target_with_parent() {
        let mut program = MemoryProgram::new();
        let source = program.add_module_file("/impl.ts");
        let class = program.add_symbol("Widget", SymbolFlags::CLASS);
        program.add_export(source, "Widget", class);

        let module = program.add_module_file("/index.ts");
        let default = program.add_alias("default", class);
        program.add_export(module, "default", default);

        let info = default_like_export_info(module, &program, ScriptTarget::Es5).unwrap();
        assert_eq!(info.name, "Widget");
        assert_eq!(info.symbol_for_meaning, class);
        assert_eq!(info.symbol, default);
    }

    #[test]
    fn test_alias_to_global_keeps_alias() {
        let mut program = MemoryProgram::new();
        let global = program.add_symbol("setTimeout", SymbolFlags::FUNCTION);
        let module = program.add_module_file("/timers-shim.ts");
        let default = program.add_alias("default", global);
        program.add_export(module, "default", default);

        let info = default_like_export_info(module, &program, ScriptTarget::Es5).unwrap();
        assert_eq!(info.symbol_for_meaning, default);
        assert_eq!(info.name, "timersShim");
    }

    #[test]
    fn test_own_name_when_not_sentinel() {
        let mut program = MemoryProgram::new();
        let module = program.add_ambient_module("lib");
        let namespace = program.add_symbol("Lib", SymbolFlags::NAMESPACE_MODULE);
        program.set_export_equals(module, namespace);

        let info = default_like_export_info(module, &program, ScriptTarget::Es5).unwrap();
        assert_eq!(info.name, "Lib");
        assert_eq!(info.export_kind, ExportKind::ExportEquals);
    }

    #[test]
    fn test_module_name_fallback() {
        let mut program = MemoryProgram::new();
        let module = program.add_module_file("/src/my-widget/index.ts");
        let default = program.add_symbol("default", SymbolFlags::VARIABLE);
        program.add_export(module, "default", default);

        let info = default_like_export_info(module, &program, ScriptTarget::Es5).unwrap();
        assert_eq!(info.name, "myWidget");
    }

    #[test]
    fn test_transient_sentinel_keeps_own_name() {
        let mut program = MemoryProgram::new();
        let module = program.add_module_file("/a.ts");
        let default = program.add_symbol("default", SymbolFlags::VARIABLE);
        program.add_export(module, "default", default);
        program.mark_transient(default);

        assert_eq!(name_for_exported_symbol(default, &program, ScriptTarget::Es5), "default");
    }

    #[test]
    fn test_specifier_to_identifier() {
        let es5 = ScriptTarget::Es5;
        assert_eq!(module_specifier_to_valid_identifier("some-module", es5), "someModule");
        assert_eq!(module_specifier_to_valid_identifier("@scope/pkg.name", es5), "pkgName");
        assert_eq!(module_specifier_to_valid_identifier("2d-canvas", es5), "DCanvas");
        assert_eq!(module_specifier_to_valid_identifier("---", es5), "_");
        assert_eq!(module_specifier_to_valid_identifier("", es5), "_");
        assert_eq!(module_specifier_to_valid_identifier("./default", es5), "_default");
        assert_eq!(module_specifier_to_valid_identifier("./lib/index", es5), "lib");
    }

    #[test]
    fn test_specifier_unicode_depends_on_target() {
        assert_eq!(module_specifier_to_valid_identifier("café", ScriptTarget::Es5), "café");
        assert_eq!(module_specifier_to_valid_identifier("a𝒳b", ScriptTarget::Es5), "aB");
        assert_eq!(module_specifier_to_valid_identifier("a𝒳b", ScriptTarget::Es2015), "a𝒳b");
    }
}
