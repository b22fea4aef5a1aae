//! Symbol handles and the type-checker capability the cache calls into.
//!
//! The resolution engine itself lives outside this crate. Everything the cache
//! needs from it goes through [`TypeChecker`], and every symbol it hands out is
//! an opaque [`SymbolId`] that is only meaningful to the checker that issued it.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Escaped table key of a module's `export default` member.
pub const DEFAULT_EXPORT_NAME: &str = "default";
/// Escaped table key of a module's `export =` member.
pub const EXPORT_EQUALS_NAME: &str = "export=";

/// Opaque handle to a symbol owned by an analysis context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(pub u32);

impl std::fmt::Display for SymbolId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

bitflags! {
    /// Classification bits of a symbol. Bit positions follow the checker's own table.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct SymbolFlags: u32 {
        const FUNCTION_SCOPED_VARIABLE = 1 << 0;
        const BLOCK_SCOPED_VARIABLE = 1 << 1;
        const PROPERTY = 1 << 2;
        const ENUM_MEMBER = 1 << 3;
        const FUNCTION = 1 << 4;
        const CLASS = 1 << 5;
        const INTERFACE = 1 << 6;
        const CONST_ENUM = 1 << 7;
        const REGULAR_ENUM = 1 << 8;
        const VALUE_MODULE = 1 << 9;
        const NAMESPACE_MODULE = 1 << 10;
        const TYPE_LITERAL = 1 << 11;
        const OBJECT_LITERAL = 1 << 12;
        const METHOD = 1 << 13;
        const TYPE_PARAMETER = 1 << 18;
        const TYPE_ALIAS = 1 << 19;
        const ALIAS = 1 << 21;
        /// Synthesised by the checker for the current generation only.
        const TRANSIENT = 1 << 25;

        const VARIABLE = Self::FUNCTION_SCOPED_VARIABLE.bits() | Self::BLOCK_SCOPED_VARIABLE.bits();
        const ENUM = Self::REGULAR_ENUM.bits() | Self::CONST_ENUM.bits();
        const MODULE = Self::VALUE_MODULE.bits() | Self::NAMESPACE_MODULE.bits();
        const VALUE = Self::VARIABLE.bits()
            | Self::PROPERTY.bits()
            | Self::ENUM_MEMBER.bits()
            | Self::OBJECT_LITERAL.bits()
            | Self::FUNCTION.bits()
            | Self::CLASS.bits()
            | Self::ENUM.bits()
            | Self::VALUE_MODULE.bits()
            | Self::METHOD.bits();
        const TYPE = Self::CLASS.bits()
            | Self::INTERFACE.bits()
            | Self::ENUM.bits()
            | Self::ENUM_MEMBER.bits()
            | Self::TYPE_LITERAL.bits()
            | Self::TYPE_PARAMETER.bits()
            | Self::TYPE_ALIAS.bits();
    }
}

/// How an export is imported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    Named,
    Default,
    ExportEquals,
    /// UMD-style global (`export as namespace Foo`).
    Umd,
}

impl std::fmt::Display for ExportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportKind::Named => write!(f, "named"),
            ExportKind::Default => write!(f, "default"),
            ExportKind::ExportEquals => write!(f, "export_equals"),
            ExportKind::Umd => write!(f, "umd"),
        }
    }
}

/// Which analysis context an export was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// The program being edited.
    Primary,
    /// Installed but not yet referenced packages (the package.json provider).
    InstalledPackages,
}

impl Provenance {
    pub fn is_from_package_json(self) -> bool {
        self == Provenance::InstalledPackages
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::Primary => write!(f, "primary"),
            Provenance::InstalledPackages => write!(f, "installed packages"),
        }
    }
}

/// Emit target of the program, which decides what counts as an identifier character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptTarget {
    Es3,
    #[default]
    Es5,
    Es2015,
    Es2020,
    EsNext,
}

/// The symbol-resolution capability of one analysis context.
///
/// Lookups by name take the *unescaped* export name.
pub trait TypeChecker {
    /// Escaped symbol name (`default`, `export=`, `"quoted/module"`, ...).
    fn symbol_name(&self, symbol: SymbolId) -> String;

    fn symbol_flags(&self, symbol: SymbolId) -> SymbolFlags;

    fn symbol_parent(&self, symbol: SymbolId) -> Option<SymbolId>;

    /// Follows an alias chain to its final target.
    fn aliased_symbol(&self, symbol: SymbolId) -> SymbolId;

    /// Resolves exactly one level of aliasing. `None` when the alias target is unresolvable.
    fn immediate_aliased_symbol(&self, symbol: SymbolId) -> Option<SymbolId>;

    /// Merged view of a symbol (declaration merging across files).
    fn merged_symbol(&self, symbol: SymbolId) -> SymbolId {
        symbol
    }

    /// Every `declare module "..."` symbol, including wildcard patterns.
    fn ambient_modules(&self) -> Vec<SymbolId>;

    fn try_find_ambient_module(&self, module_name: &str) -> Option<SymbolId>;

    /// The `export =` target of a module, or the module itself when there is none.
    fn resolve_external_module_symbol(&self, module: SymbolId) -> SymbolId;

    fn try_get_member_in_module_exports(&self, name: &str, module: SymbolId) -> Option<SymbolId>;

    fn try_get_member_in_module_exports_and_properties(
        &self,
        name: &str,
        module: SymbolId,
    ) -> Option<SymbolId>;

    /// Visits every export of `module` (and properties of its `export =` target) with its escaped key.
    fn for_each_export_and_property_of_module(
        &self,
        module: SymbolId,
        visit: &mut dyn FnMut(SymbolId, &str),
    );

    /// The local declaration bound by `export default function foo() {}` style exports.
    fn local_symbol_for_export_default(&self, symbol: SymbolId) -> Option<SymbolId>;

    /// Name recoverable from the export statement itself: the identifier in
    /// `export default foo` / `export = foo`, or the property name of `export { foo as default }`.
    fn export_default_declaration_name(&self, symbol: SymbolId) -> Option<String>;

    /// False for the checker's undefined/unknown symbols, well-known symbols and private names.
    fn is_importable_symbol(&self, _symbol: SymbolId) -> bool {
        true
    }
}

/// `symbol` itself, or its final target when it is an alias.
pub fn skip_alias(symbol: SymbolId, checker: &dyn TypeChecker) -> SymbolId {
    if checker.symbol_flags(symbol).contains(SymbolFlags::ALIAS) {
        checker.aliased_symbol(symbol)
    } else {
        symbol
    }
}

/// A module symbol backed by a file (`"quoted"` name), as opposed to a namespace.
pub fn is_external_module_symbol(symbol: SymbolId, checker: &dyn TypeChecker) -> bool {
    checker.symbol_flags(symbol).contains(SymbolFlags::VALUE_MODULE)
        && checker.symbol_name(symbol).starts_with('"')
}

/// Reverses the checker's escaping of names that start with `__`.
pub fn unescape_leading_underscores(key: &str) -> &str {
    if key.starts_with("___") {
        &key[1..]
    } else {
        key
    }
}

/// Escapes names that start with `__` so they cannot collide with internal keys.
pub fn escape_leading_underscores(name: &str) -> String {
    if name.starts_with("__") {
        format!("_{}", name)
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_underscore_escaping() {
        assert_eq!(escape_leading_underscores("__proto"), "___proto");
        assert_eq!(unescape_leading_underscores("___proto"), "__proto");
        assert_eq!(unescape_leading_underscores("_private"), "_private");
        assert_eq!(unescape_leading_underscores("default"), "default");
        assert_eq!(escape_leading_underscores("plain"), "plain");
    }

    #[test]
    fn test_value_and_type_classification() {
        assert!(SymbolFlags::VALUE.contains(SymbolFlags::FUNCTION));
        assert!(SymbolFlags::TYPE.contains(SymbolFlags::INTERFACE));
        assert!(!SymbolFlags::VALUE.intersects(SymbolFlags::INTERFACE));
        assert!(SymbolFlags::CLASS.intersects(SymbolFlags::VALUE));
        assert!(SymbolFlags::CLASS.intersects(SymbolFlags::TYPE));
    }

    #[test]
    fn test_provenance_display() {
        assert_eq!(Provenance::Primary.to_string(), "primary");
        assert!(Provenance::InstalledPackages.is_from_package_json());
        assert!(!Provenance::Primary.is_from_package_json());
    }
}
