//! Grouping keys: `displayName|canonicalTargetId|ambientModuleName`.

use crate::checker::{skip_alias, SymbolId, TypeChecker};

pub const KEY_SEPARATOR: char = '|';

/// Identity of the symbol an export ultimately refers to.
///
/// Re-exports of one declaration through different paths canonicalise to the
/// same id, which is what collapses them into one grouping key. Pure: it only
/// reads from the checker.
pub fn canonical_target_identity(symbol: SymbolId, checker: &dyn TypeChecker) -> SymbolId {
    skip_alias(symbol, checker)
}

pub fn export_info_key(
    imported_name: &str,
    symbol: SymbolId,
    ambient_module_name: Option<&str>,
    checker: &dyn TypeChecker,
) -> String {
    format!(
        "{}{sep}{}{sep}{}",
        imported_name,
        canonical_target_identity(symbol, checker),
        ambient_module_name.unwrap_or(""),
        sep = KEY_SEPARATOR
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedKey<'a> {
    pub symbol_name: &'a str,
    pub ambient_module_name: Option<&'a str>,
}

/// Splits a key back into its display name and ambient module name.
///
/// The display name ends at the first separator and the module name starts
/// after the last one, so module names containing the separator are not
/// supported but display names never contain it.
pub fn parse_key(key: &str) -> ParsedKey<'_> {
    let symbol_name = key.split(KEY_SEPARATOR).next().unwrap_or(key);
    let module_key = key
        .rfind(KEY_SEPARATOR)
        .map_or("", |i| &key[i + KEY_SEPARATOR.len_utf8()..]);
    ParsedKey {
        symbol_name,
        ambient_module_name: (!module_key.is_empty()).then_some(module_key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_without_module() {
        let parsed = parse_key("Bar|12|");
        assert_eq!(parsed.symbol_name, "Bar");
        assert_eq!(parsed.ambient_module_name, None);
    }

    #[test]
    fn test_parse_key_with_module() {
        let parsed = parse_key("Bar|12|path2longer");
        assert_eq!(parsed.symbol_name, "Bar");
        assert_eq!(parsed.ambient_module_name, Some("path2longer"));
    }

    #[test]
    fn test_parse_key_without_separator() {
        let parsed = parse_key("Bar");
        assert_eq!(parsed.symbol_name, "Bar");
        assert_eq!(parsed.ambient_module_name, None);
    }
}
