//! Record store: grouping key -> lightweight export records, in insertion order.

use crate::checker::{ExportKind, Provenance, SymbolFlags, SymbolId};
use rustc_hash::FxHashMap;

/// One cached (name, module) pairing.
///
/// Holds durable coordinates (`symbol_table_key`, `module_name`,
/// `module_file_name`) so the handles can always be re-derived, and the handles
/// themselves only when they are not transient.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CachedExportInfo {
    pub id: u32,
    pub symbol_name: String,
    pub symbol_table_key: String,
    pub module_name: String,
    pub module_file_name: Option<String>,
    pub symbol: Option<SymbolId>,
    pub module_symbol: Option<SymbolId>,
    pub export_kind: ExportKind,
    pub target_flags: SymbolFlags,
    pub provenance: Provenance,
}

/// Multimap; a key holding several records is normal (distinct modules, same name).
#[derive(Debug, Default)]
pub(crate) struct ExportInfoStore {
    slots: FxHashMap<String, usize>,
    groups: Vec<(String, Vec<CachedExportInfo>)>,
}

impl ExportInfoStore {
    pub fn add(&mut self, key: String, info: CachedExportInfo) {
        match self.slots.get(&key) {
            Some(&slot) => self.groups[slot].1.push(info),
            None => {
                self.slots.insert(key.clone(), self.groups.len());
                self.groups.push((key, vec![info]));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&[CachedExportInfo]> {
        self.slots
            .get(key)
            .map(|&slot| self.groups[slot].1.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[CachedExportInfo])> {
        self.groups
            .iter()
            .map(|(key, infos)| (key.as_str(), infos.as_slice()))
    }

    /// Number of distinct grouping keys.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.groups.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(id: u32, module_name: &str) -> CachedExportInfo {
        CachedExportInfo {
            id,
            symbol_name: "Bar".to_string(),
            symbol_table_key: "Bar".to_string(),
            module_name: module_name.to_string(),
            module_file_name: None,
            symbol: Some(SymbolId(id)),
            module_symbol: Some(SymbolId(100 + id)),
            export_kind: ExportKind::Named,
            target_flags: SymbolFlags::CLASS,
            provenance: Provenance::Primary,
        }
    }

    #[test]
    fn test_same_key_appends_in_order() {
        let mut store = ExportInfoStore::default();
        store.add("Bar|1|".to_string(), info(1, "a"));
        store.add("Bar|1|".to_string(), info(2, "b"));

        assert_eq!(store.len(), 1);
        let group = store.get("Bar|1|").unwrap();
        assert_eq!(group.len(), 2);
        assert_eq!(group[0].module_name, "a");
        assert_eq!(group[1].module_name, "b");
    }

    #[test]
    fn test_iteration_follows_first_insertion() {
        let mut store = ExportInfoStore::default();
        store.add("b|2|".to_string(), info(1, "x"));
        store.add("a|1|".to_string(), info(2, "y"));
        store.add("b|2|".to_string(), info(3, "z"));

        let keys: Vec<&str> = store.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["b|2|", "a|1|"]);
    }

    #[test]
    fn test_clear() {
        let mut store = ExportInfoStore::default();
        store.add("Bar|1|".to_string(), info(1, "a"));
        store.clear();
        assert!(store.is_empty());
        assert!(store.get("Bar|1|").is_none());
        store.clear();
        assert_eq!(store.len(), 0);
    }
}
