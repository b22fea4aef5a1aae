//! Tree-sitter scan of a file's module surface.
//!
//! Only top-level statements (and the bodies of ambient module blocks) are
//! inspected, plus a walk for `require(...)`/`import(...)` calls.

use super::{FileSurface, SurfaceDeclaration};
use crate::language::{
    detect_language_from_path, get_tree_sitter_language, is_declaration_file_name, is_javascript,
};
use crate::utils::paths::{is_external_module_name_relative, strip_quotes};
use anyhow::Result;
use tracing::debug;
use tree_sitter::{Node, Parser};

/// Parse `content` and summarise everything in it that can affect importable exports.
pub fn scan_source_file(file_name: &str, content: &str) -> Result<FileSurface> {
    let language = detect_language_from_path(file_name)
        .ok_or_else(|| anyhow::anyhow!("Unsupported file type: {}", file_name))?;

    let mut parser = Parser::new();
    let tree_sitter_language = get_tree_sitter_language(language)?;
    parser.set_language(&tree_sitter_language).map_err(|e| {
        anyhow::anyhow!("Failed to set parser language for {}: {}", language, e)
    })?;

    let tree = parser
        .parse(content, None)
        .ok_or_else(|| anyhow::anyhow!("Failed to parse file: {}", file_name))?;

    let mut scanner = SurfaceScanner {
        source: content.as_bytes(),
        is_javascript: is_javascript(language),
        surface: FileSurface {
            is_declaration_file: is_declaration_file_name(file_name),
            ..Default::default()
        },
        ambient_blocks: Vec::new(),
    };

    let root = tree.root_node();
    scanner.scan_statements(root);
    scanner.scan_calls(root);
    let surface = scanner.finish();

    debug!(
        "Scanned surface of {}: module={}, augmentations={}, ambient modules={}, imports={}",
        file_name,
        surface.is_external_or_common_js_module(),
        surface.module_augmentations.len(),
        surface.ambient_module_names.len(),
        surface.imports.len()
    );
    Ok(surface)
}

/// A top-level `declare module "x"` or `declare global` block.
///
/// Whether it is an augmentation depends on the whole file, so it is classified in `finish`.
struct AmbientBlock {
    declaration: SurfaceDeclaration,
    is_global: bool,
    nested_augmentations: Vec<SurfaceDeclaration>,
    nested_imports: Vec<String>,
}

struct SurfaceScanner<'a> {
    source: &'a [u8],
    is_javascript: bool,
    surface: FileSurface,
    ambient_blocks: Vec<AmbientBlock>,
}

impl<'a> SurfaceScanner<'a> {
    fn text(&self, node: &Node) -> &'a str {
        node.utf8_text(self.source).unwrap_or("")
    }

    fn scan_statements(&mut self, root: Node) {
        let mut cursor = root.walk();
        for statement in root.named_children(&mut cursor) {
            match statement.kind() {
                "import_statement" => {
                    self.surface.external_module_indicator = true;
                    if let Some(specifier) = self.import_source(&statement) {
                        self.surface.imports.push(specifier);
                    }
                }
                "export_statement" => {
                    self.surface.external_module_indicator = true;
                    if let Some(specifier) = self.import_source(&statement) {
                        self.surface.imports.push(specifier);
                    }
                }
                "ambient_declaration" => self.scan_ambient_declaration(statement),
                // `module "x" {}` needs no `declare` inside declaration files
                "module" if self.surface.is_declaration_file => {
                    self.scan_module_block(statement, statement)
                }
                "expression_statement" if self.is_javascript => {
                    if self.is_common_js_export(&statement) {
                        self.surface.common_js_module_indicator = true;
                    }
                }
                _ => {}
            }
        }
    }

    /// Source specifier of `import ... from "x"`, `import x = require("x")` or `export ... from "x"`.
    fn import_source(&self, statement: &Node) -> Option<String> {
        if let Some(source) = statement.child_by_field_name("source") {
            return Some(strip_quotes(self.text(&source)).to_string());
        }
        let mut cursor = statement.walk();
        let require_clause = statement
            .named_children(&mut cursor)
            .find(|child| child.kind() == "import_require_clause")?;
        require_clause
            .child_by_field_name("source")
            .map(|source| strip_quotes(self.text(&source)).to_string())
    }

    fn scan_ambient_declaration(&mut self, statement: Node) {
        let mut cursor = statement.walk();
        let children: Vec<Node> = statement.children(&mut cursor).collect();
        for child in children {
            if child.kind() == "global" && !child.is_named() {
                self.ambient_blocks.push(AmbientBlock {
                    declaration: SurfaceDeclaration::new("global", self.text(&statement)),
                    is_global: true,
                    nested_augmentations: Vec::new(),
                    nested_imports: Vec::new(),
                });
                return;
            }
            if child.kind() == "module" {
                self.scan_module_block(child, statement);
                return;
            }
        }
    }

    /// `module` node with a string name; `statement` is the enclosing top-level statement.
    fn scan_module_block(&mut self, module: Node, statement: Node) {
        let Some(name) = module.child_by_field_name("name") else {
            return;
        };
        // `declare module Foo {}` is a namespace, not an ambient module
        if name.kind() != "string" {
            return;
        }

        let mut block = AmbientBlock {
            declaration: SurfaceDeclaration::new(
                strip_quotes(self.text(&name)),
                self.text(&statement),
            ),
            is_global: false,
            nested_augmentations: Vec::new(),
            nested_imports: Vec::new(),
        };

        if let Some(body) = module.child_by_field_name("body") {
            let mut cursor = body.walk();
            for nested in body.named_children(&mut cursor) {
                match nested.kind() {
                    "import_statement" | "export_statement" => {
                        if let Some(specifier) = self.import_source(&nested) {
                            block.nested_imports.push(specifier);
                        }
                    }
                    "ambient_declaration" | "module" => {
                        if let Some(declaration) = self.nested_module_declaration(&nested) {
                            if !is_external_module_name_relative(&declaration.name) {
                                block.nested_augmentations.push(declaration);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        self.ambient_blocks.push(block);
    }

    fn nested_module_declaration(&self, statement: &Node) -> Option<SurfaceDeclaration> {
        let module = if statement.kind() == "module" {
            *statement
        } else {
            let mut cursor = statement.walk();
            let found = statement
                .named_children(&mut cursor)
                .find(|child| child.kind() == "module");
            found?
        };
        let name = module.child_by_field_name("name")?;
        if name.kind() != "string" {
            return None;
        }
        Some(SurfaceDeclaration::new(
            strip_quotes(self.text(&name)),
            self.text(statement),
        ))
    }

    /// `module.exports = ...`, `module.exports.x = ...` or `exports.x = ...`
    fn is_common_js_export(&self, statement: &Node) -> bool {
        let Some(expression) = statement.named_child(0) else {
            return false;
        };
        if expression.kind() != "assignment_expression" {
            return false;
        }
        expression
            .child_by_field_name("left")
            .is_some_and(|left| self.is_exports_reference(&left))
    }

    fn is_exports_reference(&self, node: &Node) -> bool {
        if node.kind() != "member_expression" {
            return false;
        }
        let (Some(object), Some(property)) = (
            node.child_by_field_name("object"),
            node.child_by_field_name("property"),
        ) else {
            return false;
        };
        if object.kind() == "identifier" {
            let object_text = self.text(&object);
            return object_text == "exports"
                || (object_text == "module" && self.text(&property) == "exports");
        }
        self.is_exports_reference(&object)
    }

    /// Collects `require("x")` (JavaScript only) and `import("x")` specifiers anywhere in the file.
    fn scan_calls(&mut self, root: Node) {
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node.kind() == "call_expression" {
                if let Some(specifier) = self.call_specifier(&node) {
                    self.surface.imports.push(specifier);
                }
            }
            // Reversed so calls are visited in source order
            let mut cursor = node.walk();
            let children: Vec<Node> = node.named_children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }

    fn call_specifier(&mut self, call: &Node) -> Option<String> {
        let function = call.child_by_field_name("function")?;
        let is_require = function.kind() == "identifier" && self.text(&function) == "require";
        let is_dynamic_import = function.kind() == "import";
        if !is_dynamic_import && !(is_require && self.is_javascript) {
            return None;
        }

        let arguments = call.child_by_field_name("arguments")?;
        let first = arguments.named_child(0)?;
        if first.kind() != "string" {
            return None;
        }
        if is_require {
            self.surface.common_js_module_indicator = true;
        }
        Some(strip_quotes(self.text(&first)).to_string())
    }

    fn finish(mut self) -> FileSurface {
        let is_external_module = self.surface.external_module_indicator;
        for block in std::mem::take(&mut self.ambient_blocks) {
            if !block.is_global {
                self.surface
                    .ambient_module_declarations
                    .push(block.declaration.clone());
            }

            if is_external_module {
                self.surface.module_augmentations.push(block.declaration);
            } else if !block.is_global {
                if self.surface.is_declaration_file {
                    self.surface
                        .ambient_module_names
                        .push(block.declaration.name.clone());
                }
                self.surface
                    .module_augmentations
                    .extend(block.nested_augmentations);
                self.surface.imports.extend(block.nested_imports);
            }
        }
        self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_script_has_no_module_surface() {
        let surface = scan_source_file("/src/globals.ts", "const x = 1;\nfunction f() {}\n").unwrap();
        assert!(surface.is_global_only());
        assert!(surface.imports.is_empty());
    }

    #[test]
    fn test_es_module_imports() {
        let surface = scan_source_file(
            "/src/m.ts",
            "import { readFile } from 'fs';\nexport { a } from \"./a\";\nexport const b = 1;\n",
        )
        .unwrap();
        assert!(surface.external_module_indicator);
        assert_eq!(surface.imports, vec!["fs".to_string(), "./a".to_string()]);
        assert!(surface.consumes_node_core_modules());
    }

    #[test]
    fn test_ambient_modules_in_declaration_file() {
        let content = "declare namespace foo { class Bar {} }\n\
                       declare module 'path1' {\n  import Bar = foo.Bar;\n  export default Bar;\n}\n\
                       declare module 'path2longer' {\n  import Bar = foo.Bar;\n  export {Bar};\n}\n";
        let surface = scan_source_file("/a.d.ts", content).unwrap();

        assert!(!surface.external_module_indicator);
        assert!(surface.is_declaration_file);
        assert_eq!(
            surface.ambient_module_names,
            vec!["path1".to_string(), "path2longer".to_string()]
        );
        assert_eq!(surface.ambient_module_declarations.len(), 2);
        assert!(surface.module_augmentations.is_empty());
        assert!(!surface.is_global_only());
    }

    #[test]
    fn test_module_augmentation() {
        let content = "import './base';\ndeclare module './base' {\n  interface Foo { x: number }\n}\n";
        let surface = scan_source_file("/src/aug.ts", content).unwrap();

        assert!(surface.external_module_indicator);
        assert_eq!(surface.module_augmentations.len(), 1);
        assert_eq!(surface.module_augmentations[0].name, "./base");
        assert!(surface.ambient_module_names.is_empty());
    }

    #[test]
    fn test_common_js_file() {
        let surface = scan_source_file(
            "/src/index.js",
            "const fs = require('fs');\nmodule.exports = { fs };\n",
        )
        .unwrap();
        assert!(surface.common_js_module_indicator);
        assert!(!surface.external_module_indicator);
        assert_eq!(surface.imports, vec!["fs".to_string()]);
    }

    #[test]
    fn test_fingerprint_survives_unrelated_edits() {
        let before = "declare module 'lib' { export const a: number; }\nconst x = 1;\n";
        let after = "declare module 'lib' { export const a: number; }\nconst x = 2;\nconst y = 3;\n";
        let old = scan_source_file("/types.d.ts", before).unwrap();
        let new = scan_source_file("/types.d.ts", after).unwrap();
        assert_eq!(old.ambient_module_declarations, new.ambient_module_declarations);

        let edited = "declare module 'lib' { export const b: number; }\nconst x = 1;\n";
        let edited = scan_source_file("/types.d.ts", edited).unwrap();
        assert_ne!(old.ambient_module_declarations, edited.ambient_module_declarations);
    }

    #[test]
    fn test_sample_declaration_file() {
        let surface =
            scan_source_file("/types/ambient.d.ts", include_str!("../../test_samples/ambient.d.ts"))
                .unwrap();
        assert_eq!(
            surface.ambient_module_names,
            vec!["path1".to_string(), "path2longer".to_string(), "*.svg".to_string()]
        );
        assert_eq!(surface.ambient_module_declarations.len(), 3);
        assert!(!surface.is_external_or_common_js_module());
    }

    #[test]
    fn test_sample_augmenting_module() {
        let surface =
            scan_source_file("/src/augment.ts", include_str!("../../test_samples/augment.ts"))
                .unwrap();
        let augmented: Vec<&str> = surface
            .module_augmentations
            .iter()
            .map(|decl| decl.name.as_str())
            .collect();
        assert_eq!(augmented, vec!["express", "global"]);
        assert_eq!(surface.ambient_module_declarations.len(), 1);
        assert!(surface.ambient_module_names.is_empty());
        assert_eq!(surface.imports, vec!["express".to_string(), "node:path".to_string()]);
        assert!(surface.consumes_node_core_modules());
    }

    #[test]
    fn test_sample_common_js_file() {
        let surface =
            scan_source_file("/src/legacy.js", include_str!("../../test_samples/legacy.js"))
                .unwrap();
        assert!(surface.common_js_module_indicator);
        assert_eq!(surface.imports, vec!["fs".to_string(), "./helpers".to_string()]);
    }

    #[test]
    fn test_unsupported_file_type() {
        let result = scan_source_file("/src/main.py", "import os\n");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Unsupported file type"));
    }
}
