//! In-memory analysis context.
//!
//! A symbol arena plus source files, implementing [`Program`] and
//! [`TypeChecker`]. Hosts that keep their own symbol database (Miller's Python
//! side does) populate one of these per program generation; the tests use it as
//! the reference checker.

use crate::checker::{
    escape_leading_underscores, ScriptTarget, SymbolFlags, SymbolId, TypeChecker,
};
use crate::program::{Program, SourceFile};
use crate::surface::FileSurface;
use crate::utils::paths::remove_file_extension;
use std::cell::Cell;

#[derive(Debug, Clone, Default)]
struct SymbolData {
    /// Escaped name
    name: String,
    flags: SymbolFlags,
    parent: Option<SymbolId>,
    /// Escaped export key -> symbol, in declaration order
    exports: Vec<(String, SymbolId)>,
    /// Properties of the symbol's type (relevant for `export =` targets)
    members: Vec<(String, SymbolId)>,
    alias_target: Option<SymbolId>,
    export_equals: Option<SymbolId>,
    local_default: Option<SymbolId>,
    declaration_name: Option<String>,
    not_importable: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryProgram {
    symbols: Vec<SymbolData>,
    files: Vec<SourceFile>,
    ambient_modules: Vec<SymbolId>,
    target: ScriptTarget,
    /// Export/module lookups served, for observing memoisation
    lookups: Cell<usize>,
}

impl MemoryProgram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(target: ScriptTarget) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    fn data(&self, symbol: SymbolId) -> Option<&SymbolData> {
        self.symbols.get(symbol.0 as usize)
    }

    fn data_mut(&mut self, symbol: SymbolId) -> Option<&mut SymbolData> {
        self.symbols.get_mut(symbol.0 as usize)
    }

    fn push_symbol(&mut self, data: SymbolData) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(data);
        id
    }

    /// Declares a symbol; `name` is the unescaped source name.
    pub fn add_symbol(&mut self, name: &str, flags: SymbolFlags) -> SymbolId {
        self.push_symbol(SymbolData {
            name: escape_leading_underscores(name),
            flags,
            ..Default::default()
        })
    }

    /// Declares an alias (import/export specifier) resolving to `target`.
    pub fn add_alias(&mut self, name: &str, target: SymbolId) -> SymbolId {
        self.push_symbol(SymbolData {
            name: escape_leading_underscores(name),
            flags: SymbolFlags::ALIAS,
            alias_target: Some(target),
            ..Default::default()
        })
    }

    /// Adds a source file; module files get a `"quoted"` module symbol.
    pub fn add_file(&mut self, file_name: &str, surface: FileSurface) -> Option<SymbolId> {
        let symbol = surface.is_external_or_common_js_module().then(|| {
            self.push_symbol(SymbolData {
                name: format!("\"{}\"", remove_file_extension(file_name)),
                flags: SymbolFlags::VALUE_MODULE,
                ..Default::default()
            })
        });
        let mut file = SourceFile::new(file_name, surface);
        file.symbol = symbol;
        self.files.push(file);
        symbol
    }

    /// Adds an ES module file and returns its module symbol.
    pub fn add_module_file(&mut self, file_name: &str) -> SymbolId {
        let surface = FileSurface {
            external_module_indicator: true,
            ..Default::default()
        };
        let name = format!("\"{}\"", remove_file_extension(file_name));
        let symbol = self.push_symbol(SymbolData {
            name,
            flags: SymbolFlags::VALUE_MODULE,
            ..Default::default()
        });
        self.files
            .push(SourceFile::new(file_name, surface).with_symbol(symbol));
        symbol
    }

    /// Declares `declare module "name"`.
    pub fn add_ambient_module(&mut self, module_name: &str) -> SymbolId {
        let symbol = self.push_symbol(SymbolData {
            name: format!("\"{}\"", module_name),
            flags: SymbolFlags::VALUE_MODULE,
            ..Default::default()
        });
        self.ambient_modules.push(symbol);
        symbol
    }

    /// Adds `symbol` to `module`'s export table under `key` (unescaped).
    pub fn add_export(&mut self, module: SymbolId, key: &str, symbol: SymbolId) {
        let key = escape_leading_underscores(key);
        if let Some(data) = self.data_mut(module) {
            data.exports.push((key, symbol));
        }
        if let Some(data) = self.data_mut(symbol) {
            if data.parent.is_none() {
                data.parent = Some(module);
            }
        }
    }

    /// Adds a property to `owner`'s type, visible through `export =`.
    pub fn add_member(&mut self, owner: SymbolId, name: &str, symbol: SymbolId) {
        let name = escape_leading_underscores(name);
        if let Some(data) = self.data_mut(owner) {
            data.members.push((name, symbol));
        }
        if let Some(data) = self.data_mut(symbol) {
            if data.parent.is_none() {
                data.parent = Some(owner);
            }
        }
    }

    pub fn set_export_equals(&mut self, module: SymbolId, target: SymbolId) {
        if let Some(data) = self.data_mut(module) {
            data.export_equals = Some(target);
        }
    }

    pub fn set_local_symbol_for_export_default(&mut self, symbol: SymbolId, local: SymbolId) {
        if let Some(data) = self.data_mut(symbol) {
            data.local_default = Some(local);
        }
    }

    pub fn set_export_default_declaration_name(&mut self, symbol: SymbolId, name: &str) {
        if let Some(data) = self.data_mut(symbol) {
            data.declaration_name = Some(name.to_string());
        }
    }

    pub fn set_parent(&mut self, symbol: SymbolId, parent: Option<SymbolId>) {
        if let Some(data) = self.data_mut(symbol) {
            data.parent = parent;
        }
    }

    pub fn set_importable(&mut self, symbol: SymbolId, importable: bool) {
        if let Some(data) = self.data_mut(symbol) {
            data.not_importable = !importable;
        }
    }

    /// Flags a symbol as synthesised for this generation only.
    pub fn mark_transient(&mut self, symbol: SymbolId) {
        if let Some(data) = self.data_mut(symbol) {
            data.flags |= SymbolFlags::TRANSIENT;
        }
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.get()
    }

    fn count_lookup(&self) {
        self.lookups.set(self.lookups.get() + 1);
    }

    fn find_in(entries: &[(String, SymbolId)], key: &str) -> Option<SymbolId> {
        entries
            .iter()
            .find(|(entry_key, _)| entry_key == key)
            .map(|(_, symbol)| *symbol)
    }

    /// The export= target when it is a different symbol than the module.
    fn export_equals_target(&self, module: SymbolId) -> Option<SymbolId> {
        let target = self.resolve_external_module_symbol(module);
        (target != module).then_some(target)
    }
}

impl TypeChecker for MemoryProgram {
    fn symbol_name(&self, symbol: SymbolId) -> String {
        self.data(symbol).map(|d| d.name.clone()).unwrap_or_default()
    }

    fn symbol_flags(&self, symbol: SymbolId) -> SymbolFlags {
        self.data(symbol).map(|d| d.flags).unwrap_or_default()
    }

    fn symbol_parent(&self, symbol: SymbolId) -> Option<SymbolId> {
        self.data(symbol).and_then(|d| d.parent)
    }

    fn aliased_symbol(&self, symbol: SymbolId) -> SymbolId {
        let mut current = symbol;
        // Alias cycles resolve to wherever the walk stops
        for _ in 0..=self.symbols.len() {
            match self.data(current) {
                Some(data) if data.flags.contains(SymbolFlags::ALIAS) => match data.alias_target {
                    Some(target) => current = target,
                    None => break,
                },
                _ => break,
            }
        }
        current
    }

    fn immediate_aliased_symbol(&self, symbol: SymbolId) -> Option<SymbolId> {
        self.data(symbol).and_then(|d| d.alias_target)
    }

    fn ambient_modules(&self) -> Vec<SymbolId> {
        self.ambient_modules.clone()
    }

    fn try_find_ambient_module(&self, module_name: &str) -> Option<SymbolId> {
        self.count_lookup();
        let quoted = format!("\"{}\"", module_name);
        self.ambient_modules
            .iter()
            .copied()
            .find(|&module| self.data(module).is_some_and(|d| d.name == quoted))
    }

    fn resolve_external_module_symbol(&self, module: SymbolId) -> SymbolId {
        self.data(module)
            .and_then(|d| d.export_equals)
            .unwrap_or(module)
    }

    fn try_get_member_in_module_exports(&self, name: &str, module: SymbolId) -> Option<SymbolId> {
        self.count_lookup();
        let key = escape_leading_underscores(name);
        self.data(module)
            .and_then(|d| Self::find_in(&d.exports, &key))
    }

    fn try_get_member_in_module_exports_and_properties(
        &self,
        name: &str,
        module: SymbolId,
    ) -> Option<SymbolId> {
        self.count_lookup();
        let key = escape_leading_underscores(name);
        if let Some(found) = self.data(module).and_then(|d| Self::find_in(&d.exports, &key)) {
            return Some(found);
        }
        let target = self.data(self.export_equals_target(module)?)?;
        Self::find_in(&target.exports, &key).or_else(|| Self::find_in(&target.members, &key))
    }

    fn for_each_export_and_property_of_module(
        &self,
        module: SymbolId,
        visit: &mut dyn FnMut(SymbolId, &str),
    ) {
        if let Some(data) = self.data(module) {
            for (key, symbol) in &data.exports {
                visit(*symbol, key);
            }
        }
        if let Some(target) = self.export_equals_target(module).and_then(|t| self.data(t)) {
            for (key, symbol) in target.exports.iter().chain(target.members.iter()) {
                visit(*symbol, key);
            }
        }
    }

    fn local_symbol_for_export_default(&self, symbol: SymbolId) -> Option<SymbolId> {
        self.data(symbol).and_then(|d| d.local_default)
    }

    fn export_default_declaration_name(&self, symbol: SymbolId) -> Option<String> {
        self.data(symbol).and_then(|d| d.declaration_name.clone())
    }

    fn is_importable_symbol(&self, symbol: SymbolId) -> bool {
        self.data(symbol).is_some_and(|d| !d.not_importable)
    }
}

impl Program for MemoryProgram {
    fn type_checker(&self) -> &dyn TypeChecker {
        self
    }

    fn source_files(&self) -> &[SourceFile] {
        &self.files
    }

    fn script_target(&self) -> ScriptTarget {
        self.target
    }
}
