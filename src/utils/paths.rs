// Module Path Utilities
//
// Slash-separated path helpers for module names and file names as the checker
// reports them. These never touch the file system.

/// Extensions stripped by `remove_file_extension`, longest first.
const SUPPORTED_EXTENSIONS: &[&str] = &[
    ".d.mts", ".d.cts", ".d.ts", ".json", ".mts", ".cts", ".mjs", ".cjs", ".tsx", ".jsx", ".ts",
    ".js",
];

/// Convert Windows separators to `/`
pub fn normalize_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

/// Remove one pair of matching quotes (`"`, `'` or `` ` ``) around a module name
///
/// # Examples
/// ```
/// use export_map_core::utils::paths::strip_quotes;
///
/// assert_eq!(strip_quotes("\"path1\""), "path1");
/// assert_eq!(strip_quotes("plain"), "plain");
/// ```
pub fn strip_quotes(name: &str) -> &str {
    let bytes = name.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        if first == bytes[bytes.len() - 1] && matches!(first, b'"' | b'\'' | b'`') {
            return &name[1..name.len() - 1];
        }
    }
    name
}

/// Length of the root of a path: `/`, `//server/`, `c:/`, or 0 for relative paths
fn root_length(path: &str) -> usize {
    let bytes = path.as_bytes();
    if bytes.is_empty() {
        return 0;
    }
    if bytes[0] == b'/' || bytes[0] == b'\\' {
        if bytes.len() > 1 && bytes[1] == bytes[0] {
            // UNC: //server/share
            return match path[2..].find(['/', '\\']) {
                Some(i) => i + 3,
                None => path.len(),
            };
        }
        return 1;
    }
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        if bytes.len() > 2 && (bytes[2] == b'/' || bytes[2] == b'\\') {
            return 3;
        }
        return 2;
    }
    0
}

/// `./x`, `../x`, `.` and `..`
pub fn path_is_relative(path: &str) -> bool {
    path == "." || path == ".." || path.starts_with("./") || path.starts_with("../")
        || path.starts_with(".\\") || path.starts_with("..\\")
}

pub fn is_rooted_disk_path(path: &str) -> bool {
    root_length(path) > 0
}

/// Relative or absolute module names refer to files; everything else is a package or ambient module
///
/// # Examples
/// ```
/// use export_map_core::utils::paths::is_external_module_name_relative;
///
/// assert!(is_external_module_name_relative("./utils"));
/// assert!(is_external_module_name_relative("/someModule"));
/// assert!(!is_external_module_name_relative("path1"));
/// ```
pub fn is_external_module_name_relative(module_name: &str) -> bool {
    path_is_relative(module_name) || is_rooted_disk_path(module_name)
}

/// Parent directory of `path` (the root is its own parent)
pub fn get_directory_path(path: &str) -> String {
    let path = normalize_slashes(path);
    let root = root_length(&path);
    let trimmed = if path.len() > root {
        path.trim_end_matches('/')
    } else {
        path.as_str()
    };
    if trimmed.len() <= root {
        return path[..root.min(path.len())].to_string();
    }
    match trimmed[root..].rfind('/') {
        Some(i) => {
            let end = root + i;
            if end <= root {
                trimmed[..root].to_string()
            } else {
                trimmed[..end].to_string()
            }
        }
        None => trimmed[..root].to_string(),
    }
}

/// Last path component, ignoring a trailing separator
pub fn get_base_file_name(path: &str) -> String {
    let path = normalize_slashes(path);
    let root = root_length(&path);
    if path.len() <= root {
        return String::new();
    }
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(i) if i + 1 >= root => trimmed[i + 1..].to_string(),
        _ => trimmed[root.min(trimmed.len())..].to_string(),
    }
}

/// Drop a known source/declaration extension, if any
pub fn remove_file_extension(path: &str) -> &str {
    for extension in SUPPORTED_EXTENSIONS {
        if let Some(stripped) = path.strip_suffix(extension) {
            return stripped;
        }
    }
    path
}

/// Visit `path` and then each ancestor up to the root, stopping at the first `Some`
pub fn for_each_ancestor_directory<T>(
    path: &str,
    mut visit: impl FnMut(&str) -> Option<T>,
) -> Option<T> {
    let mut directory = normalize_slashes(path);
    loop {
        if let Some(result) = visit(&directory) {
            return Some(result);
        }
        let parent = get_directory_path(&directory);
        if parent == directory {
            return None;
        }
        directory = parent;
    }
}

/// File name used for comparisons: lower-cased on case-insensitive file systems
pub fn to_canonical_file_name(path: &str, use_case_sensitive_file_names: bool) -> String {
    if use_case_sensitive_file_names {
        path.to_string()
    } else {
        path.to_lowercase()
    }
}
