//! `util.is*()` type checks (DEP0044 to DEP0058)

use super::support::{export_calls, finish_inner_first};
use crate::nodemod_recipe;
use crate::recipe::Recipe;
use nodemod_ast::query::{args_text, operand_text, standalone_expression_spans};
use nodemod_ast::SourceRoot;
use nodemod_foundation::{Edit, NodemodResult};
use tracing::warn;

const EXPORTS: &[&str] = &[
    "isArray",
    "isBoolean",
    "isBuffer",
    "isDate",
    "isError",
    "isFunction",
    "isNull",
    "isNullOrUndefined",
    "isNumber",
    "isObject",
    "isPrimitive",
    "isRegExp",
    "isString",
    "isSymbol",
    "isUndefined",
];

/// Replacement of a check on `value` (full text) / `operand` (parenthesized
/// when needed). The flag tells whether the result is an operator
/// expression.
fn replacement(export: &str, value: &str, operand: &str) -> Option<(String, bool)> {
    let typeof_check = |kind: &str| (format!("typeof {} === '{}'", operand, kind), true);
    Some(match export {
        "isArray" => (format!("Array.isArray({})", value), false),
        "isBoolean" => typeof_check("boolean"),
        "isBuffer" => (format!("Buffer.isBuffer({})", value), false),
        "isDate" => (format!("{} instanceof Date", operand), true),
        "isError" => (format!("Error.isError({})", value), false),
        "isFunction" => typeof_check("function"),
        "isNull" => (format!("{} === null", operand), true),
        "isNullOrUndefined" => (
            format!("{} === null || {} === undefined", operand, operand),
            true,
        ),
        "isNumber" => typeof_check("number"),
        "isObject" => (
            format!("{} !== null && typeof {} === 'object'", operand, operand),
            true,
        ),
        "isPrimitive" => (
            format!(
                "{} === null || (typeof {} !== 'object' && typeof {} !== 'function')",
                operand, operand, operand
            ),
            true,
        ),
        "isRegExp" => (format!("{} instanceof RegExp", operand), true),
        "isString" => typeof_check("string"),
        "isSymbol" => typeof_check("symbol"),
        "isUndefined" => (format!("{} === undefined", operand), true),
        _ => return None,
    })
}

pub struct UtilIs;

impl Recipe for UtilIs {
    fn name(&self) -> &'static str {
        "util-is"
    }

    fn transform(&self, root: &SourceRoot) -> NodemodResult<Option<String>> {
        finish_inner_first(root, &["util"], checks)
    }
}

fn checks(root: &SourceRoot) -> Vec<Edit> {
    let calls = export_calls(root, "util", EXPORTS);
    if calls.is_empty() {
        return Vec::new();
    }

    let standalone = standalone_expression_spans(root);
    let mut edits = Vec::new();
    for found in &calls {
        let call = &found.call;
        if call.args.len() != 1 || call.args[0].spread.is_some() {
            warn!(
                call = %root.text(call.span),
                "Expected exactly one argument, leaving call unchanged"
            );
            continue;
        }

        let value = args_text(root, &call.args);
        let operand = operand_text(root, &call.args[0].expr);
        let Some((text, is_operator)) = replacement(found.export, value, &operand) else {
            continue;
        };
        let text = if is_operator && !standalone.contains(&call.span) {
            format!("({})", text)
        } else {
            text
        };
        edits.push(root.replace(call.span, text));
    }
    edits
}

nodemod_recipe! {
    name: "util-is",
    description: "Replace deprecated util.is*() type checks with native checks",
    deprecations: [
        "DEP0044", "DEP0045", "DEP0046", "DEP0047", "DEP0048", "DEP0049", "DEP0050", "DEP0051",
        "DEP0052", "DEP0053", "DEP0054", "DEP0055", "DEP0056", "DEP0057", "DEP0058",
    ],
    factory: || Box::new(UtilIs),
}
