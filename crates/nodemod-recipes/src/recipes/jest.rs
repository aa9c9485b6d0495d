//! Jest to the built-in `node:test` runner
//!
//! Test globals are imported from `node:test` (`beforeAll`/`afterAll` become
//! `before`/`after`), `jest.fn()`/`jest.spyOn()` become `mock.fn()`/`mock.method()`
//! and `expect()` assertions with a `node:assert/strict` counterpart are
//! rewritten. Matchers without one are warned about and kept.

use crate::nodemod_recipe;
use crate::recipe::Recipe;
use nodemod_ast::query::{callee_path, calls_to, find_calls, operand_text};
use nodemod_ast::{
    declared_names, is_referenced, module_dependencies, references, ModuleKind, SourceRoot,
};
use nodemod_foundation::text::{detect_eol, insertion_offset};
use nodemod_foundation::{Edit, NodemodResult};
use std::collections::HashSet;
use swc_common::Spanned;
use swc_ecma_ast::{CallExpr, Callee, Expr, ExprOrSpread, Lit, MemberProp};
use swc_ecma_visit::{Visit, VisitWith};
use tracing::{debug, warn};

const JEST_GLOBALS: &str = "@jest/globals";

/// jest global → `node:test` export, in import order
const TEST_GLOBALS: &[(&str, &str)] = &[
    ("describe", "describe"),
    ("it", "it"),
    ("test", "test"),
    ("beforeAll", "before"),
    ("afterAll", "after"),
    ("beforeEach", "beforeEach"),
    ("afterEach", "afterEach"),
];

/// jest mock factory → `node:test` mock tracker method
const MOCKS: &[(&str, &str)] = &[("jest.fn", "mock.fn"), ("jest.spyOn", "mock.method")];

const EXPECT_MODIFIERS: &[&str] = &["not", "rejects", "resolves"];

/// `expect(actual)[.modifiers].matcher(args)`
struct Expectation<'a> {
    actual: &'a Expr,
    /// In source order, e.g. `["resolves", "not"]`
    modifiers: Vec<String>,
    matcher: String,
    args: &'a [ExprOrSpread],
}

fn expectation(call: &CallExpr) -> Option<Expectation<'_>> {
    let Callee::Expr(callee) = &call.callee else {
        return None;
    };
    let Expr::Member(member) = &**callee else {
        return None;
    };
    let MemberProp::Ident(matcher) = &member.prop else {
        return None;
    };

    let mut object = &*member.obj;
    let mut modifiers = Vec::new();
    loop {
        match object {
            Expr::Member(inner) => {
                let MemberProp::Ident(prop) = &inner.prop else {
                    return None;
                };
                if !EXPECT_MODIFIERS.contains(&prop.sym.as_ref()) {
                    return None;
                }
                modifiers.insert(0, prop.sym.to_string());
                object = &*inner.obj;
            }
            Expr::Call(expect) => {
                if callee_path(expect).as_deref() != Some("expect") {
                    return None;
                }
                let [actual] = expect.args.as_slice() else {
                    return None;
                };
                if actual.spread.is_some() {
                    return None;
                }
                return Some(Expectation {
                    actual: &*actual.expr,
                    modifiers,
                    matcher: matcher.sym.to_string(),
                    args: &call.args,
                });
            }
            _ => return None,
        }
    }
}

#[derive(Default)]
struct ExpectCalls {
    calls: Vec<CallExpr>,
}

impl Visit for ExpectCalls {
    fn visit_call_expr(&mut self, node: &CallExpr) {
        if expectation(node).is_some() {
            self.calls.push(node.clone());
            return;
        }
        node.visit_children_with(self);
    }
}

/// `assert` call equivalent to an expectation
fn assertion(root: &SourceRoot, expectation: &Expectation<'_>) -> Option<String> {
    if expectation.args.iter().any(|arg| arg.spread.is_some()) {
        return None;
    }
    let args: Vec<String> = expectation
        .args
        .iter()
        .map(|arg| root.text(arg.expr.span()).to_string())
        .collect();
    let operands: Vec<String> = expectation
        .args
        .iter()
        .map(|arg| operand_text(root, &arg.expr))
        .collect();

    let modifiers: Vec<&str> = expectation.modifiers.iter().map(String::as_str).collect();
    let (negated, awaited) = match modifiers.as_slice() {
        [] => (false, false),
        ["not"] => (true, false),
        ["resolves"] => (false, true),
        ["resolves", "not"] => (true, true),
        ["rejects"] => {
            let actual = root.text(expectation.actual.span());
            return match (expectation.matcher.as_str(), args.as_slice()) {
                ("toThrow" | "toThrowError", []) => Some(format!("assert.rejects({})", actual)),
                ("toThrow" | "toThrowError", [error]) if !is_string_literal(&expectation.args[0].expr) => {
                    Some(format!("assert.rejects({}, {})", actual, error))
                }
                _ => None,
            };
        }
        _ => return None,
    };

    let (actual, operand) = if awaited {
        let value = format!("await {}", operand_text(root, expectation.actual));
        (value.clone(), format!("({})", value))
    } else {
        (
            root.text(expectation.actual.span()).to_string(),
            operand_text(root, expectation.actual),
        )
    };

    let equal = if negated { "notStrictEqual" } else { "strictEqual" };
    let truthy = |condition: String| {
        if negated {
            format!("assert.ok(!({}))", condition)
        } else {
            format!("assert.ok({})", condition)
        }
    };

    let text = match (expectation.matcher.as_str(), args.as_slice()) {
        ("toBe", [expected]) => format!("assert.{}({}, {})", equal, actual, expected),
        ("toEqual" | "toStrictEqual", [expected]) => {
            let deep = if negated { "notDeepStrictEqual" } else { "deepStrictEqual" };
            format!("assert.{}({}, {})", deep, actual, expected)
        }
        ("toBeTruthy", []) if negated => format!("assert.ok(!{})", operand),
        ("toBeTruthy", []) => format!("assert.ok({})", actual),
        ("toBeFalsy", []) if negated => format!("assert.ok({})", actual),
        ("toBeFalsy", []) => format!("assert.ok(!{})", operand),
        ("toBeNull", []) => format!("assert.{}({}, null)", equal, actual),
        ("toBeUndefined", []) => format!("assert.{}({}, undefined)", equal, actual),
        ("toBeDefined", []) => {
            let equal = if negated { "strictEqual" } else { "notStrictEqual" };
            format!("assert.{}({}, undefined)", equal, actual)
        }
        ("toThrow" | "toThrowError", _) if awaited => return None,
        ("toThrow" | "toThrowError", []) if negated => format!("assert.doesNotThrow({})", actual),
        ("toThrow" | "toThrowError", []) => format!("assert.throws({})", actual),
        ("toThrow" | "toThrowError", [error])
            if !negated && !is_string_literal(&expectation.args[0].expr) =>
        {
            format!("assert.throws({}, {})", actual, error)
        }
        ("toMatch", [pattern]) if is_regex_literal(&expectation.args[0].expr) => {
            let method = if negated { "doesNotMatch" } else { "match" };
            format!("assert.{}({}, {})", method, actual, pattern)
        }
        ("toMatch", [_]) if is_string_literal(&expectation.args[0].expr) => {
            includes(&operand, &args[0], negated)
        }
        ("toContain", [expected]) => includes(&operand, expected, negated),
        ("toMatch", [_]) => return None,
        ("toHaveLength", [length]) => format!("assert.{}({}.length, {})", equal, operand, length),
        ("toBeInstanceOf", [_]) => truthy(format!("{} instanceof {}", operand, operands[0])),
        ("toBeGreaterThan", [_]) => truthy(format!("{} > {}", operand, operands[0])),
        ("toBeGreaterThanOrEqual", [_]) => truthy(format!("{} >= {}", operand, operands[0])),
        ("toBeLessThan", [_]) => truthy(format!("{} < {}", operand, operands[0])),
        ("toBeLessThanOrEqual", [_]) => truthy(format!("{} <= {}", operand, operands[0])),
        ("toHaveBeenCalled", []) if negated => {
            format!("assert.strictEqual({}.mock.callCount(), 0)", operand)
        }
        ("toHaveBeenCalled", []) => format!("assert.ok({}.mock.callCount() > 0)", operand),
        ("toHaveBeenCalledTimes", [times]) => {
            format!("assert.{}({}.mock.callCount(), {})", equal, operand, times)
        }
        _ => return None,
    };
    Some(text)
}

fn includes(operand: &str, expected: &str, negated: bool) -> String {
    let bang = if negated { "!" } else { "" };
    format!("assert.ok({}{}.includes({}))", bang, operand, expected)
}

fn is_string_literal(expr: &Expr) -> bool {
    matches!(expr, Expr::Lit(Lit::Str(_))) || matches!(expr, Expr::Tpl(_))
}

fn is_regex_literal(expr: &Expr) -> bool {
    matches!(expr, Expr::Lit(Lit::Regex(_)))
}

/// `node:test` and `node:assert/strict` imports in the file's module style,
/// followed by the `@jest/globals` names that are still in use
fn import_block(kind: ModuleKind, names: &[&str], assert: bool, retained: &[&str], eol: &str) -> String {
    let mut lines = Vec::new();
    if !names.is_empty() {
        let names = names.join(", ");
        lines.push(match kind {
            ModuleKind::Esm => format!("import {{ {} }} from 'node:test';", names),
            ModuleKind::CommonJs => format!("const {{ {} }} = require('node:test');", names),
        });
    }
    if assert {
        lines.push(match kind {
            ModuleKind::Esm => "import assert from 'node:assert/strict';".to_string(),
            ModuleKind::CommonJs => "const assert = require('node:assert/strict');".to_string(),
        });
    }
    if !retained.is_empty() {
        let retained = retained.join(", ");
        lines.push(match kind {
            ModuleKind::Esm => format!("import {{ {} }} from '{}';", retained, JEST_GLOBALS),
            ModuleKind::CommonJs => format!("const {{ {} }} = require('{}');", retained, JEST_GLOBALS),
        });
    }
    lines.join(eol)
}

pub struct JestToNodeTest;

impl Recipe for JestToNodeTest {
    fn name(&self) -> &'static str {
        "jest-to-node-test"
    }

    fn transform(&self, root: &SourceRoot) -> NodemodResult<Option<String>> {
        let jest_imports = module_dependencies(root, JEST_GLOBALS);
        let mut jest_names: Vec<String> = Vec::new();
        for dep in &jest_imports {
            if dep.bindings.default.is_some() || dep.bindings.namespace.is_some() {
                warn!(path = %root.path().display(), "Unsupported @jest/globals import form, skipping");
                return Ok(None);
            }
            for named in &dep.bindings.named {
                if named.local.as_deref() != Some(named.imported.as_str()) {
                    warn!(
                        binding = %named.imported,
                        path = %root.path().display(),
                        "Aliased @jest/globals import, skipping"
                    );
                    return Ok(None);
                }
                if !jest_names.contains(&named.imported) {
                    jest_names.push(named.imported.clone());
                }
            }
        }
        let jest_locals: HashSet<&str> = jest_names.iter().map(String::as_str).collect();

        let declared = declared_names(root);
        let is_global = |name: &str| !declared.contains(name) || jest_locals.contains(name);
        if declared.contains("expect") && !jest_locals.contains("expect") {
            warn!(path = %root.path().display(), "expect comes from another library, skipping");
            return Ok(None);
        }

        let used_globals: Vec<(&str, &str)> = TEST_GLOBALS
            .iter()
            .copied()
            .filter(|&(jest, _)| is_global(jest) && is_referenced(root, jest))
            .collect();
        if jest_imports.is_empty() && used_globals.is_empty() {
            return Ok(None);
        }

        let mut edits: Vec<Edit> = Vec::new();

        for (jest, node) in &used_globals {
            if jest != node {
                edits.extend(
                    calls_to(root, jest)
                        .iter()
                        .map(|call| root.replace(call.callee.span(), *node)),
                );
            }
        }

        let mut uses_mock = false;
        if is_global("jest") {
            for (jest, node) in MOCKS {
                for call in calls_to(root, jest) {
                    edits.push(root.replace(call.callee.span(), *node));
                    uses_mock = true;
                }
            }
            let others = find_calls(root, |call| {
                callee_path(call).is_some_and(|path| {
                    path.starts_with("jest.") && !MOCKS.iter().any(|(jest, _)| *jest == path)
                })
            });
            for call in others {
                warn!(call = %root.text(call.span), "No node:test equivalent for this jest API, leaving call unchanged");
            }
        }

        let mut converted = 0;
        let mut collector = ExpectCalls::default();
        root.visit(&mut collector);
        for call in &collector.calls {
            let Some(expectation) = expectation(call) else {
                continue;
            };
            match assertion(root, &expectation) {
                Some(text) => {
                    edits.push(root.replace(call.span, text));
                    converted += 1;
                }
                None => warn!(
                    matcher = %expectation.matcher,
                    call = %root.text(call.span),
                    "No node:assert equivalent for this matcher, leaving assertion unchanged"
                ),
            }
        }
        if references(root, "expect").len() > converted {
            warn!(path = %root.path().display(), "expect is still used after the rewrite");
        }

        let mut names: Vec<&str> = used_globals.iter().map(|(_, node)| *node).collect();
        if uses_mock {
            names.push("mock");
        }
        let assert = converted > 0 && !declared.contains("assert");

        // Imports are decided on the rewritten file: any @jest/globals name
        // that is still referenced keeps its import
        let updated = root.reparse(root.commit(edits)?)?;
        let retained: Vec<&str> = jest_names
            .iter()
            .map(String::as_str)
            .filter(|name| !used_globals.iter().any(|(jest, _)| jest == name))
            .filter(|name| is_referenced(&updated, name))
            .collect();
        if !retained.is_empty() {
            warn!(
                names = ?retained,
                path = %root.path().display(),
                "Keeping @jest/globals import for names still in use"
            );
        }

        let kind = updated.module_kind();
        let eol = detect_eol(updated.source());
        let block = import_block(kind, &names, assert, &retained, eol);
        debug!(names = ?names, assert, "Importing node:test globals");

        let mut statements: Vec<_> = module_dependencies(&updated, JEST_GLOBALS)
            .iter()
            .map(|dep| dep.statement)
            .collect();
        statements.dedup();
        let mut import_edits = Vec::new();
        match statements.split_first() {
            Some((first, rest)) if !block.is_empty() => {
                import_edits.push(updated.replace_statement(*first, block));
                import_edits.extend(rest.iter().map(|span| updated.remove_statement(*span)));
            }
            _ => {
                import_edits.extend(statements.iter().map(|span| updated.remove_statement(*span)));
                if !block.is_empty() {
                    import_edits.push(Edit::insert(
                        insertion_offset(updated.source()),
                        format!("{}{}", block, eol),
                    ));
                }
            }
        }

        let output = updated.commit(import_edits)?;
        Ok((output != root.source()).then_some(output))
    }

    fn obsolete_dependencies(&self) -> &'static [&'static str] {
        &["@jest/globals"]
    }
}

nodemod_recipe! {
    name: "jest-to-node-test",
    description: "Migrate jest tests to node:test and node:assert/strict",
    deprecations: [],
    factory: || Box::new(JestToNodeTest),
}
