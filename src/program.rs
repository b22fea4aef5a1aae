//! Analysis contexts ("programs") and the source files they contain.

use crate::checker::{ScriptTarget, SymbolId, TypeChecker};
use crate::surface::FileSurface;

/// A source file as seen by an analysis context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// File name as written by the host.
    pub file_name: String,
    /// Canonical path used as cache identity.
    pub path: String,
    /// Module symbol of the file, when it is a module.
    pub symbol: Option<SymbolId>,
    pub surface: FileSurface,
}

impl SourceFile {
    pub fn new(file_name: impl Into<String>, surface: FileSurface) -> Self {
        let file_name = file_name.into();
        Self {
            path: file_name.clone(),
            file_name,
            symbol: None,
            surface,
        }
    }

    pub fn with_symbol(mut self, symbol: SymbolId) -> Self {
        self.symbol = Some(symbol);
        self
    }

    pub fn is_external_or_common_js_module(&self) -> bool {
        self.surface.is_external_or_common_js_module()
    }
}

/// One analysis context: its files plus the checker that resolves their symbols.
pub trait Program {
    fn type_checker(&self) -> &dyn TypeChecker;

    fn source_files(&self) -> &[SourceFile];

    fn get_source_file(&self, file_name: &str) -> Option<&SourceFile> {
        self.source_files()
            .iter()
            .find(|file| file.file_name == file_name || file.path == file_name)
    }

    fn script_target(&self) -> ScriptTarget {
        ScriptTarget::default()
    }
}
