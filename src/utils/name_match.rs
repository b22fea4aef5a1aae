/// Fuzzy match used to pick auto-import candidates for a typed fragment
///
/// Every character of `lowercase_fragment` must appear in `identifier` in order,
/// case-insensitively, and the first matched character must start a "word":
/// the beginning of the identifier, a camelCase hump, or the character after `_`.
///
/// # Examples
///
/// ```
/// use export_map_core::utils::name_match::characters_fuzzy_match_in_string;
///
/// assert!(characters_fuzzy_match_in_string("someModule", "smod"));
/// assert!(characters_fuzzy_match_in_string("readFileSync", "fsy"));
/// assert!(!characters_fuzzy_match_in_string("someModule", "ome"));
/// ```
pub fn characters_fuzzy_match_in_string(identifier: &str, lowercase_fragment: &str) -> bool {
    let fragment: Vec<char> = lowercase_fragment.chars().collect();
    if fragment.is_empty() {
        return true;
    }

    let mut matched_first_character = false;
    let mut prev: Option<char> = None;
    let mut fragment_index = 0;

    for ch in identifier.chars() {
        let test = fragment[fragment_index];
        if ch == test || ch == test.to_ascii_uppercase() {
            matched_first_character = matched_first_character
                || match prev {
                    // Beginning of word
                    None => true,
                    // camelCase transition
                    Some(p) if p.is_ascii_lowercase() && ch.is_ascii_uppercase() => true,
                    // snake_case transition
                    Some('_') => ch != '_',
                    Some(_) => false,
                };
            if matched_first_character {
                fragment_index += 1;
            }
            if fragment_index == fragment.len() {
                return true;
            }
        }
        prev = Some(ch);
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fragment_matches_everything() {
        assert!(characters_fuzzy_match_in_string("anything", ""));
        assert!(characters_fuzzy_match_in_string("", ""));
    }

    #[test]
    fn test_prefix_match() {
        assert!(characters_fuzzy_match_in_string("Bar", "ba"));
        assert!(characters_fuzzy_match_in_string("someModule", "somemo"));
    }

    #[test]
    fn test_camel_case_hump() {
        assert!(characters_fuzzy_match_in_string("readFileSync", "file"));
        assert!(characters_fuzzy_match_in_string("readFileSync", "sync"));
        assert!(!characters_fuzzy_match_in_string("readFileSync", "ile"));
    }

    #[test]
    fn test_snake_case_transition() {
        assert!(characters_fuzzy_match_in_string("read_file", "file"));
        assert!(!characters_fuzzy_match_in_string("read_file", "ead"));
    }

    #[test]
    fn test_characters_must_appear_in_order() {
        assert!(!characters_fuzzy_match_in_string("Bar", "rab"));
        assert!(!characters_fuzzy_match_in_string("Bar", "barx"));
    }
}
