//! Module-affecting surface of a source file.
//!
//! Change detection never looks at a whole file. It only compares the parts that
//! can add or remove importable exports: module indicators, module augmentations,
//! ambient module declarations and the specifiers the file imports.

mod node_core;
mod scan;

pub use node_core::is_node_core_module;
pub use scan::scan_source_file;

use serde::{Deserialize, Serialize};

/// A declaration compared by structural identity.
///
/// The fingerprint is a blake3 hash of the declaration text, so an untouched
/// declaration keeps its identity across edits elsewhere in the file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceDeclaration {
    /// Module name as written, without quotes (`global` for global augmentations).
    pub name: String,
    pub fingerprint: String,
}

impl SurfaceDeclaration {
    pub fn new(name: impl Into<String>, text: &str) -> Self {
        Self {
            name: name.into(),
            fingerprint: fingerprint(text),
        }
    }
}

/// Blake3 hex digest of a declaration's text.
pub fn fingerprint(text: &str) -> String {
    blake3::hash(text.as_bytes()).to_hex().to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSurface {
    /// Has top-level `import`/`export` syntax.
    pub external_module_indicator: bool,
    /// JavaScript file using `require`, `module.exports` or `exports.x`.
    pub common_js_module_indicator: bool,
    pub is_declaration_file: bool,
    /// `declare module "x"` / `declare global` blocks that augment other modules, in order.
    pub module_augmentations: Vec<SurfaceDeclaration>,
    /// Names of ambient modules this (global declaration) file declares, in order.
    pub ambient_module_names: Vec<String>,
    /// Every top-level non-global ambient module declaration, in statement order.
    pub ambient_module_declarations: Vec<SurfaceDeclaration>,
    /// Module specifiers this file imports or requires.
    pub imports: Vec<String>,
}

impl FileSurface {
    pub fn is_external_or_common_js_module(&self) -> bool {
        self.external_module_indicator || self.common_js_module_indicator
    }

    /// A purely global file cannot change any export surface.
    pub fn is_global_only(&self) -> bool {
        !self.common_js_module_indicator
            && !self.external_module_indicator
            && self.module_augmentations.is_empty()
            && self.ambient_module_names.is_empty()
    }

    pub fn consumes_node_core_modules(&self) -> bool {
        self.imports.iter().any(|specifier| is_node_core_module(specifier))
    }
}

/// Same ambient module names, and each named declaration structurally unchanged.
///
/// Declarations are matched pairwise in order: for every name, the next
/// declaration with that name after the previous match, in each file.
pub fn ambient_module_declarations_are_equal(old: &FileSurface, new: &FileSurface) -> bool {
    if old.ambient_module_names != new.ambient_module_names {
        return false;
    }

    let mut old_index: Option<usize> = None;
    let mut new_index: Option<usize> = None;
    for name in &new.ambient_module_names {
        old_index = find_declaration(&old.ambient_module_declarations, name, old_index);
        new_index = find_declaration(&new.ambient_module_declarations, name, new_index);
        let old_decl = old_index.map(|i| &old.ambient_module_declarations[i]);
        let new_decl = new_index.map(|i| &new.ambient_module_declarations[i]);
        if old_decl != new_decl {
            return false;
        }
    }
    true
}

fn find_declaration(
    declarations: &[SurfaceDeclaration],
    name: &str,
    after: Option<usize>,
) -> Option<usize> {
    let start = after.map_or(0, |i| i + 1);
    declarations
        .iter()
        .enumerate()
        .skip(start)
        .find(|(_, decl)| decl.name == name)
        .map(|(i, _)| i)
}
