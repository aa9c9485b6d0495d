//! Parsed file root.
//!
//! [`SourceRoot`] owns the original text of one file together with its swc
//! [`Program`]. swc spans are absolute positions inside a `SourceMap`; the root
//! keeps the start position of its file so any node span can be turned back
//! into a byte range of the original text.

use nodemod_foundation::text::removal_range;
use nodemod_foundation::{commit_edits, Edit, NodemodError, NodemodResult};
use std::ops::Range;
use std::path::{Path, PathBuf};
use swc_common::{sync::Lrc, FileName, FilePathMapping, SourceMap, Span, Spanned};
use swc_ecma_ast::{CallExpr, EsVersion, Ident, MetaPropExpr, MetaPropKind, ModuleItem, Program};
use swc_ecma_parser::{lexer::Lexer, EsSyntax, Parser, StringInput, Syntax, TsSyntax};
use swc_ecma_visit::{Visit, VisitWith};
use tracing::debug;

/// Module system a file is written for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    Esm,
    CommonJs,
}

/// One parsed JavaScript or TypeScript file
pub struct SourceRoot {
    path: PathBuf,
    source: String,
    program: Program,
    base: u32,
}

impl std::fmt::Debug for SourceRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRoot")
            .field("path", &self.path)
            .field("len", &self.source.len())
            .finish()
    }
}

/// Pick the parser syntax from the file extension
fn syntax_for(path: &Path) -> Syntax {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("ts") | Some("mts") | Some("cts") => Syntax::Typescript(TsSyntax {
            tsx: false,
            decorators: true,
            ..Default::default()
        }),
        Some("tsx") => Syntax::Typescript(TsSyntax {
            tsx: true,
            decorators: true,
            ..Default::default()
        }),
        _ => Syntax::Es(EsSyntax {
            jsx: true,
            ..Default::default()
        }),
    }
}

impl SourceRoot {
    /// Parse `source` as the contents of `path`.
    ///
    /// The path only selects the syntax (JavaScript, TypeScript, TSX) and is
    /// used in error messages; nothing is read from disk.
    pub fn parse(path: impl AsRef<Path>, source: impl Into<String>) -> NodemodResult<Self> {
        let path = path.as_ref().to_path_buf();
        let source = source.into();

        let cm = Lrc::new(SourceMap::new(FilePathMapping::empty()));
        let file_name = Lrc::new(FileName::Real(path.clone()));
        let source_file = cm.new_source_file(file_name, source.clone());
        let base = source_file.start_pos.0;

        let lexer = Lexer::new(
            syntax_for(&path),
            EsVersion::latest(),
            StringInput::from(&*source_file),
            None,
        );
        let mut parser = Parser::new_from(lexer);

        let program = parser.parse_program().map_err(|e| {
            let offset = (e.span().lo.0.saturating_sub(base)) as usize;
            let line = source[..offset.min(source.len())].matches('\n').count() + 1;
            NodemodError::parse(
                path.display().to_string(),
                format!("line {}: {:?}", line, e.kind()),
            )
        })?;

        let recovered = parser.take_errors();
        if !recovered.is_empty() {
            debug!(
                path = %path.display(),
                count = recovered.len(),
                "Parser recovered from errors"
            );
        }

        Ok(Self {
            path,
            source,
            program,
            base,
        })
    }

    /// Parse new contents for the same path
    pub fn reparse(&self, source: impl Into<String>) -> NodemodResult<Self> {
        Self::parse(&self.path, source)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn into_source(self) -> String {
        self.source
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Byte range of `span` in the source text
    pub fn range(&self, span: Span) -> Range<usize> {
        let len = self.source.len();
        let start = (span.lo.0.saturating_sub(self.base) as usize).min(len);
        let end = (span.hi.0.saturating_sub(self.base) as usize).min(len);
        start..end
    }

    /// Source text covered by `span`
    pub fn text(&self, span: Span) -> &str {
        &self.source[self.range(span)]
    }

    /// Source text from the start of `first` to the end of `last`
    pub fn text_between(&self, first: Span, last: Span) -> &str {
        &self.source[self.range(first).start..self.range(last).end]
    }

    /// Edit replacing the node at `span` with `replacement`
    pub fn replace(&self, span: Span, replacement: impl Into<String>) -> Edit {
        Edit::replace(self.range(span), replacement)
    }

    /// Byte range of the statement at `span`, including its semicolon
    pub fn statement_range(&self, span: Span) -> Range<usize> {
        let range = self.range(span);
        if self.source[range.clone()].ends_with(';') {
            return range;
        }
        let rest = &self.source[range.end..];
        let gap = rest.len() - rest.trim_start_matches([' ', '\t']).len();
        if rest[gap..].starts_with(';') {
            return range.start..range.end + gap + 1;
        }
        range
    }

    /// Edit replacing the whole statement at `span`
    pub fn replace_statement(&self, span: Span, replacement: impl Into<String>) -> Edit {
        Edit::replace(self.statement_range(span), replacement)
    }

    /// Edit removing the statement at `span`, taking its line when alone on it
    pub fn remove_statement(&self, span: Span) -> Edit {
        Edit::delete(removal_range(&self.source, self.statement_range(span)))
    }

    /// Apply `edits` to the original text
    pub fn commit(&self, edits: Vec<Edit>) -> NodemodResult<String> {
        commit_edits(&self.source, edits)
    }

    /// Walk the whole program with `visitor`
    pub fn visit<V: Visit>(&self, visitor: &mut V) {
        self.program.visit_with(visitor);
    }

    /// Whether the file is an ES module or a CommonJS script.
    ///
    /// The extension decides first (`.mjs`/`.mts` vs `.cjs`/`.cts`), then
    /// import/export declarations and `import.meta`, then CommonJS evidence
    /// (`require()` calls, `module`, `exports`, `__dirname`, `__filename`).
    /// Without either, `.js` and `.jsx` are CommonJS the way Node loads them
    /// outside a `"type": "module"` package; TypeScript files are ES modules.
    pub fn module_kind(&self) -> ModuleKind {
        let extension = self.path.extension().and_then(|ext| ext.to_str());
        match extension {
            Some("mjs") | Some("mts") => return ModuleKind::Esm,
            Some("cjs") | Some("cts") => return ModuleKind::CommonJs,
            _ => {}
        }

        if let Program::Module(module) = &self.program {
            if module
                .body
                .iter()
                .any(|item| matches!(item, ModuleItem::ModuleDecl(_)))
            {
                return ModuleKind::Esm;
            }
        }

        let mut evidence = ModuleEvidence::default();
        self.visit(&mut evidence);
        if evidence.import_meta {
            return ModuleKind::Esm;
        }
        if evidence.commonjs {
            return ModuleKind::CommonJs;
        }

        match extension {
            Some("js") | Some("jsx") => ModuleKind::CommonJs,
            _ => ModuleKind::Esm,
        }
    }
}

/// CommonJS globals that only exist in scripts
const COMMONJS_GLOBALS: &[&str] = &["module", "exports", "__dirname", "__filename"];

#[derive(Default)]
struct ModuleEvidence {
    commonjs: bool,
    import_meta: bool,
}

impl Visit for ModuleEvidence {
    fn visit_call_expr(&mut self, node: &CallExpr) {
        if crate::query::is_require_call(node) {
            self.commonjs = true;
        }
        node.visit_children_with(self);
    }

    fn visit_ident(&mut self, node: &Ident) {
        if COMMONJS_GLOBALS.contains(&node.sym.as_ref()) {
            self.commonjs = true;
        }
    }

    fn visit_meta_prop_expr(&mut self, node: &MetaPropExpr) {
        if matches!(node.kind, MetaPropKind::ImportMeta) {
            self.import_meta = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use swc_ecma_ast::{ModuleDecl, Stmt};

    #[test]
    fn test_span_maps_to_source_text() {
        let root = SourceRoot::parse("a.js", "const x = 1;\nimport y from 'y';\n").unwrap();
        let Program::Module(module) = root.program() else {
            panic!("expected module");
        };
        let ModuleItem::ModuleDecl(ModuleDecl::Import(import)) = &module.body[1] else {
            panic!("expected import");
        };
        assert!(root.text(import.span).starts_with("import y from 'y'"));
        assert_eq!(&root.source()[root.statement_range(import.span)], "import y from 'y';");
        assert_eq!(root.text(import.src.span), "'y'");
    }

    #[test]
    fn test_parse_script_and_typescript() {
        let root = SourceRoot::parse("a.cjs", "const fs = require('fs');\n").unwrap();
        assert!(matches!(root.program(), Program::Script(_)));

        let root = SourceRoot::parse("a.ts", "const n: number = 1;\n").unwrap();
        let Program::Script(script) = root.program() else {
            panic!("expected script");
        };
        let Stmt::Decl(decl) = &script.body[0] else {
            panic!("expected declaration");
        };
        assert!(root.text(decl.span()).starts_with("const n: number = 1"));
    }

    #[test]
    fn test_parse_error_reports_line() {
        let err = SourceRoot::parse("bad.js", "const a = 1;\nconst = ;\n").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("bad.js"), "{message}");
        assert!(message.contains("line 2"), "{message}");
    }

    #[test]
    fn test_module_kind() {
        let esm = SourceRoot::parse("a.js", "import fs from 'fs';").unwrap();
        assert_eq!(esm.module_kind(), ModuleKind::Esm);

        let cjs = SourceRoot::parse("a.js", "const fs = require('fs');").unwrap();
        assert_eq!(cjs.module_kind(), ModuleKind::CommonJs);

        let by_ext = SourceRoot::parse("a.cjs", "foo();").unwrap();
        assert_eq!(by_ext.module_kind(), ModuleKind::CommonJs);

        let plain_ts = SourceRoot::parse("a.ts", "foo();").unwrap();
        assert_eq!(plain_ts.module_kind(), ModuleKind::Esm);
    }

    #[test]
    fn test_plain_js_defaults_to_commonjs() {
        let plain = SourceRoot::parse("bin.js", "foo();").unwrap();
        assert_eq!(plain.module_kind(), ModuleKind::CommonJs);

        let main = SourceRoot::parse("bin.js", "if (process.mainModule === module) main();").unwrap();
        assert_eq!(main.module_kind(), ModuleKind::CommonJs);

        let dirname = SourceRoot::parse("a.ts", "const here = __dirname;").unwrap();
        assert_eq!(dirname.module_kind(), ModuleKind::CommonJs);
    }

    #[test]
    fn test_commit_and_remove_statement() {
        let source = "'use strict';\nconst util = require('util');\nrun();\n";
        let root = SourceRoot::parse("a.js", source).unwrap();
        let start = source.find("const").unwrap();
        let span = Span::new(
            swc_common::BytePos(root.base + start as u32),
            swc_common::BytePos(root.base + (start + 29) as u32),
        );
        let output = root.commit(vec![root.remove_statement(span)]).unwrap();
        assert_eq!(output, "'use strict';\nrun();\n");
    }
}
