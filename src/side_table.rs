//! Side table of live handles for records whose handles must not be retained inline.
//!
//! Entries are a lookup relation, never ownership: dropping the whole table is
//! always safe because the record store keeps enough to re-resolve them.

use crate::checker::SymbolId;
use rustc_hash::FxHashMap;

#[derive(Debug, Default)]
pub(crate) struct SymbolSideTable {
    entries: FxHashMap<u32, (SymbolId, SymbolId)>,
}

impl SymbolSideTable {
    /// `(symbol, module_symbol)` for a record id
    pub fn get(&self, id: u32) -> Option<(SymbolId, SymbolId)> {
        self.entries.get(&id).copied()
    }

    pub fn insert(&mut self, id: u32, symbol: SymbolId, module_symbol: SymbolId) {
        self.entries.insert(id, (symbol, module_symbol));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
