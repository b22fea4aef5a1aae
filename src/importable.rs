//! Whether a file may be suggested as an import target from another file.

use crate::config::{ExportMapConfig, UserPreferences};
use crate::program::{Program, SourceFile};
use crate::utils::paths::{
    for_each_ancestor_directory, get_base_file_name, get_directory_path, normalize_slashes,
    to_canonical_file_name,
};
use rustc_hash::{FxHashMap, FxHashSet};

const NODE_MODULES: &str = "node_modules";

/// File-system view used to find every name a module file can be imported by.
pub trait ModuleSpecifierResolutionHost {
    /// Calls `visit` with each file name `imported_file_name` is reachable by
    /// (itself and its symlinks) until it returns true. Returns whether it did.
    fn for_each_file_name_of_module(
        &self,
        importing_file_name: &str,
        imported_file_name: &str,
        prefer_symlinks: bool,
        visit: &mut dyn FnMut(&str) -> bool,
    ) -> bool;

    fn use_case_sensitive_file_names(&self) -> bool {
        true
    }

    fn global_typings_cache_location(&self) -> Option<String> {
        None
    }
}

/// Memo of importability verdicts per (importer, target, preferences).
pub trait ModuleSpecifierCache {
    fn is_auto_importable(
        &self,
        from_path: &str,
        to_path: &str,
        preferences: &UserPreferences,
    ) -> Option<bool>;

    fn set_is_auto_importable(
        &mut self,
        from_path: &str,
        to_path: &str,
        preferences: &UserPreferences,
        is_auto_importable: bool,
    );
}

/// Restricts suggestions to packages the importing project depends on.
pub trait PackageJsonImportFilter {
    fn allows_importing_source_file(
        &self,
        file: &SourceFile,
        host: &dyn ModuleSpecifierResolutionHost,
    ) -> bool;
}

/// Resolution host backed by an explicit symlink table.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolutionHost {
    use_case_sensitive_file_names: bool,
    global_typings_cache_location: Option<String>,
    /// Real file name -> other names it is reachable by
    symlinks: FxHashMap<String, Vec<String>>,
}

impl MemoryResolutionHost {
    pub fn from_config(config: &ExportMapConfig) -> Self {
        Self {
            use_case_sensitive_file_names: config.use_case_sensitive_file_names,
            global_typings_cache_location: config.global_typings_cache_location.clone(),
            symlinks: FxHashMap::default(),
        }
    }

    pub fn add_symlink(&mut self, real_file_name: &str, link_file_name: &str) {
        self.symlinks
            .entry(normalize_slashes(real_file_name))
            .or_default()
            .push(normalize_slashes(link_file_name));
    }
}

impl ModuleSpecifierResolutionHost for MemoryResolutionHost {
    fn for_each_file_name_of_module(
        &self,
        _importing_file_name: &str,
        imported_file_name: &str,
        prefer_symlinks: bool,
        visit: &mut dyn FnMut(&str) -> bool,
    ) -> bool {
        let real = normalize_slashes(imported_file_name);
        let links = self.symlinks.get(&real).map(Vec::as_slice).unwrap_or(&[]);
        if prefer_symlinks {
            links.iter().any(|link| visit(link)) || visit(&real)
        } else {
            visit(&real) || links.iter().any(|link| visit(link))
        }
    }

    fn use_case_sensitive_file_names(&self) -> bool {
        self.use_case_sensitive_file_names
    }

    fn global_typings_cache_location(&self) -> Option<String> {
        self.global_typings_cache_location.clone()
    }
}

#[derive(Debug, Default)]
pub struct MemorySpecifierCache {
    verdicts: FxHashMap<(String, String, UserPreferences), bool>,
}

impl MemorySpecifierCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.verdicts.clear();
    }
}

impl ModuleSpecifierCache for MemorySpecifierCache {
    fn is_auto_importable(
        &self,
        from_path: &str,
        to_path: &str,
        preferences: &UserPreferences,
    ) -> Option<bool> {
        self.verdicts
            .get(&(from_path.to_string(), to_path.to_string(), preferences.clone()))
            .copied()
    }

    fn set_is_auto_importable(
        &mut self,
        from_path: &str,
        to_path: &str,
        preferences: &UserPreferences,
        is_auto_importable: bool,
    ) {
        self.verdicts.insert(
            (from_path.to_string(), to_path.to_string(), preferences.clone()),
            is_auto_importable,
        );
    }
}

/// Package filter from the dependency names listed in a package.json.
#[derive(Debug, Clone, Default)]
pub struct PackageJsonDependencies {
    dependencies: FxHashSet<String>,
}

impl PackageJsonDependencies {
    pub fn new<I, S>(dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dependencies: dependencies.into_iter().map(Into::into).collect(),
        }
    }
}

impl PackageJsonImportFilter for PackageJsonDependencies {
    fn allows_importing_source_file(
        &self,
        file: &SourceFile,
        _host: &dyn ModuleSpecifierResolutionHost,
    ) -> bool {
        match node_modules_package_name(&file.file_name) {
            Some(name) => {
                self.dependencies.contains(&name)
                    || self.dependencies.contains(&format!("@types/{}", mangle_types_name(&name)))
            }
            None => true,
        }
    }
}

/// Package a file under `node_modules` belongs to, with `@types/` packages
/// mapped back to the package they type (`@types/scope__pkg` is `@scope/pkg`).
fn node_modules_package_name(file_name: &str) -> Option<String> {
    let file_name = normalize_slashes(file_name);
    let marker = format!("/{}/", NODE_MODULES);
    let start = file_name.rfind(&marker)? + marker.len();
    let mut segments = file_name[start..].split('/');
    let first = segments.next().filter(|s| !s.is_empty())?;
    let name = if first.starts_with('@') {
        format!("{}/{}", first, segments.next()?)
    } else {
        first.to_string()
    };
    Some(match name.strip_prefix("@types/") {
        Some(typed) => match typed.split_once("__") {
            Some((scope, package)) => format!("@{}/{}", scope, package),
            None => typed.to_string(),
        },
        None => name,
    })
}

fn mangle_types_name(name: &str) -> String {
    match name.strip_prefix('@').and_then(|scoped| scoped.split_once('/')) {
        Some((scope, package)) => format!("{}__{}", scope, package),
        None => name.to_string(),
    }
}

/// Whether `to` can be imported from `from`.
///
/// Some file name of `to` (itself or a symlink that is not another program
/// file) must pass [`is_importable_path`]. With a package.json filter, the
/// verdict also requires the filter's approval and is memoised.
pub fn is_importable_file(
    program: &dyn Program,
    from: &SourceFile,
    to: &SourceFile,
    preferences: &UserPreferences,
    package_json_filter: Option<&dyn PackageJsonImportFilter>,
    host: &dyn ModuleSpecifierResolutionHost,
    mut specifier_cache: Option<&mut dyn ModuleSpecifierCache>,
) -> bool {
    if from.path == to.path {
        return false;
    }
    if let Some(cached) = specifier_cache
        .as_deref()
        .and_then(|cache| cache.is_auto_importable(&from.path, &to.path, preferences))
    {
        return cached;
    }

    let use_case_sensitive_file_names = host.use_case_sensitive_file_names();
    let global_typings_cache = host.global_typings_cache_location();
    let has_importable_path = host.for_each_file_name_of_module(
        &from.file_name,
        &to.file_name,
        false,
        &mut |to_path| {
            // A symlink only counts when it is not some other file of the program
            let names_target = program
                .get_source_file(to_path)
                .map_or(true, |file| file.path == to.path);
            names_target
                && is_importable_path(
                    &from.file_name,
                    to_path,
                    use_case_sensitive_file_names,
                    global_typings_cache.as_deref(),
                )
        },
    );

    match package_json_filter {
        Some(filter) => {
            let is_auto_importable =
                has_importable_path && filter.allows_importing_source_file(to, host);
            if let Some(cache) = specifier_cache.as_deref_mut() {
                cache.set_is_auto_importable(&from.path, &to.path, preferences, is_auto_importable);
            }
            is_auto_importable
        }
        None => has_importable_path,
    }
}

/// A file inside `node_modules` is only importable from within the directory
/// that contains that `node_modules` (or from the global typings cache).
///
/// ```
/// use export_map_core::importable::is_importable_path;
///
/// assert!(is_importable_path("/app/src/a.ts", "/app/node_modules/lodash/index.d.ts", true, None));
/// assert!(!is_importable_path("/app/src/a.ts", "/app/packages/x/node_modules/y/index.d.ts", true, None));
/// ```
pub fn is_importable_path(
    from_path: &str,
    to_path: &str,
    use_case_sensitive_file_names: bool,
    global_cache_path: Option<&str>,
) -> bool {
    let canonical = |path: &str| to_canonical_file_name(path, use_case_sensitive_file_names);
    let to_node_modules = for_each_ancestor_directory(to_path, |ancestor| {
        (get_base_file_name(ancestor) == NODE_MODULES).then(|| ancestor.to_string())
    });
    let Some(to_node_modules) = to_node_modules else {
        return true;
    };
    let to_node_modules_parent = get_directory_path(&canonical(&to_node_modules));
    canonical(from_path).starts_with(&to_node_modules_parent)
        || global_cache_path
            .is_some_and(|global| canonical(global).starts_with(&to_node_modules_parent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryProgram;
    use crate::surface::FileSurface;

    fn module_surface() -> FileSurface {
        FileSurface {
            external_module_indicator: true,
            ..Default::default()
        }
    }

    fn file(name: &str) -> SourceFile {
        SourceFile::new(name, module_surface())
    }

    fn case_sensitive_host() -> MemoryResolutionHost {
        MemoryResolutionHost::from_config(&ExportMapConfig::default())
    }

    #[test]
    fn test_path_outside_node_modules() {
        assert!(is_importable_path("/app/src/a.ts", "/lib/b.ts", true, None));
    }

    #[test]
    fn test_path_into_foreign_node_modules() {
        assert!(!is_importable_path(
            "/app/src/a.ts",
            "/other/node_modules/pkg/index.d.ts",
            true,
            None
        ));
        assert!(is_importable_path(
            "/app/src/a.ts",
            "/other/node_modules/pkg/index.d.ts",
            true,
            Some("/other/typings-cache")
        ));
    }

    #[test]
    fn test_path_case_sensitivity() {
        let to = "/App/node_modules/pkg/index.d.ts";
        assert!(!is_importable_path("/app/src/a.ts", to, true, None));
        assert!(is_importable_path("/app/src/a.ts", to, false, None));
    }

    #[test]
    fn test_nearest_node_modules_decides() {
        let to = "/app/node_modules/a/node_modules/b/index.d.ts";
        assert!(!is_importable_path("/app/src/x.ts", to, true, None));
        assert!(is_importable_path("/app/node_modules/a/lib.d.ts", to, true, None));
    }

    #[test]
    fn test_file_is_not_importable_from_itself() {
        let program = MemoryProgram::new();
        let a = file("/app/a.ts");
        assert!(!is_importable_file(
            &program,
            &a,
            &a,
            &UserPreferences::default(),
            None,
            &case_sensitive_host(),
            None
        ));
    }

    #[test]
    fn test_symlink_makes_package_reachable() {
        let mut program = MemoryProgram::new();
        program.add_module_file("/app/src/a.ts");
        program.add_module_file("/repo/node_modules/pkg/index.ts");
        let from = file("/app/src/a.ts");
        let to = file("/repo/node_modules/pkg/index.ts");
        let prefs = UserPreferences::default();

        let mut host = case_sensitive_host();
        assert!(!is_importable_file(&program, &from, &to, &prefs, None, &host, None));

        host.add_symlink("/repo/node_modules/pkg/index.ts", "/app/node_modules/pkg/index.ts");
        assert!(is_importable_file(&program, &from, &to, &prefs, None, &host, None));
    }

    #[test]
    fn test_symlink_to_other_program_file_is_ignored() {
        let mut program = MemoryProgram::new();
        program.add_module_file("/app/src/a.ts");
        program.add_module_file("/repo/node_modules/pkg/index.ts");
        program.add_module_file("/app/node_modules/pkg/index.ts");
        let from = file("/app/src/a.ts");
        let to = file("/repo/node_modules/pkg/index.ts");

        let mut host = case_sensitive_host();
        host.add_symlink("/repo/node_modules/pkg/index.ts", "/app/node_modules/pkg/index.ts");
        assert!(!is_importable_file(
            &program,
            &from,
            &to,
            &UserPreferences::default(),
            None,
            &host,
            None
        ));
    }

    #[test]
    fn test_package_json_filter_is_memoised() {
        let program = MemoryProgram::new();
        let from = file("/app/src/a.ts");
        let to = file("/app/node_modules/left-pad/index.d.ts");
        let prefs = UserPreferences::default();
        let host = case_sensitive_host();
        let mut cache = MemorySpecifierCache::new();

        let none = PackageJsonDependencies::new(Vec::<String>::new());
        assert!(!is_importable_file(
            &program,
            &from,
            &to,
            &prefs,
            Some(&none),
            &host,
            Some(&mut cache)
        ));
        assert_eq!(
            cache.is_auto_importable("/app/src/a.ts", "/app/node_modules/left-pad/index.d.ts", &prefs),
            Some(false)
        );

        // The memoised verdict wins over a now-permissive filter
        let left_pad = PackageJsonDependencies::new(["left-pad"]);
        assert!(!is_importable_file(
            &program,
            &from,
            &to,
            &prefs,
            Some(&left_pad),
            &host,
            Some(&mut cache)
        ));

        cache.clear();
        assert!(is_importable_file(
            &program,
            &from,
            &to,
            &prefs,
            Some(&left_pad),
            &host,
            Some(&mut cache)
        ));
    }

    #[test]
    fn test_verdict_without_filter_is_not_memoised() {
        let program = MemoryProgram::new();
        let from = file("/app/src/a.ts");
        let to = file("/app/src/b.ts");
        let prefs = UserPreferences::default();
        let mut cache = MemorySpecifierCache::new();

        assert!(is_importable_file(
            &program,
            &from,
            &to,
            &prefs,
            None,
            &case_sensitive_host(),
            Some(&mut cache)
        ));
        assert_eq!(cache.is_auto_importable("/app/src/a.ts", "/app/src/b.ts", &prefs), None);
    }

    #[test]
    fn test_preferences_are_part_of_memo_key() {
        let mut cache = MemorySpecifierCache::new();
        let relative = UserPreferences {
            import_module_specifier_preference: Some("relative".to_string()),
            ..Default::default()
        };
        cache.set_is_auto_importable("/a.ts", "/b.ts", &relative, true);
        assert_eq!(cache.is_auto_importable("/a.ts", "/b.ts", &relative), Some(true));
        assert_eq!(
            cache.is_auto_importable("/a.ts", "/b.ts", &UserPreferences::default()),
            None
        );
    }

    #[test]
    fn test_package_names() {
        assert_eq!(
            node_modules_package_name("/app/node_modules/lodash/fp/map.d.ts").as_deref(),
            Some("lodash")
        );
        assert_eq!(
            node_modules_package_name("/app/node_modules/@scope/pkg/index.d.ts").as_deref(),
            Some("@scope/pkg")
        );
        assert_eq!(
            node_modules_package_name("/app/node_modules/@types/scope__pkg/index.d.ts").as_deref(),
            Some("@scope/pkg")
        );
        assert_eq!(node_modules_package_name("/app/src/a.ts"), None);

        let deps = PackageJsonDependencies::new(["@types/node"]);
        let host = case_sensitive_host();
        assert!(deps.allows_importing_source_file(&file("/app/node_modules/@types/node/fs.d.ts"), &host));
        assert!(!deps.allows_importing_source_file(&file("/app/node_modules/react/index.d.ts"), &host));
        assert!(deps.allows_importing_source_file(&file("/app/src/local.ts"), &host));
    }
}
