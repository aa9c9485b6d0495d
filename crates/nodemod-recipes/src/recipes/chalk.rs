//! `chalk` to `util.styleText()`
//!
//! `chalk.red(text)` becomes `styleText('red', text)` and chained styles
//! become a format array, `chalk.red.bold(text)` → `styleText(['red', 'bold'], text)`.
//! Once nothing uses chalk anymore its import is replaced by `styleText`
//! from `node:util` and the runner drops the package from package.json.

use crate::nodemod_recipe;
use crate::recipe::Recipe;
use nodemod_ast::query::{callee_path, find_calls};
use nodemod_ast::{
    declared_names, ensure_named_import, is_referenced, module_dependencies,
    prune_unused_bindings, SourceRoot,
};
use nodemod_foundation::{Edit, NodemodResult};
use swc_common::Spanned;
use swc_ecma_ast::CallExpr;
use tracing::{debug, warn};

const UTIL: &str = "node:util";
const STYLE_TEXT: &str = "styleText";

/// chalk styles `util.styleText()` has no format for
const UNSUPPORTED: &[&str] = &[
    "hex", "rgb", "ansi256", "bgHex", "bgRgb", "bgAnsi256", "visible",
];

const MODIFIERS: &[&str] = &[
    "reset", "bold", "dim", "italic", "underline", "inverse", "hidden", "strikethrough",
];

const COLORS: &[&str] = &[
    "black", "red", "green", "yellow", "blue", "magenta", "cyan", "white", "gray",
    "redBright", "greenBright", "yellowBright", "blueBright", "magentaBright", "cyanBright",
    "whiteBright",
];

/// `util.styleText()` format for a chalk style
fn style_format(style: &str) -> Option<String> {
    let format = match style {
        "overline" => "overlined",
        "grey" | "blackBright" => "gray",
        "bgGrey" | "bgBlackBright" => "bgGray",
        style if MODIFIERS.contains(&style) || COLORS.contains(&style) => style,
        style => {
            let color = style.strip_prefix("bg")?;
            let mut chars = color.chars();
            let first = chars.next()?.to_ascii_lowercase();
            let color = format!("{}{}", first, chars.as_str());
            if !COLORS.contains(&color.as_str()) {
                return None;
            }
            style
        }
    };
    Some(format!("'{}'", format))
}

/// Local names bound to the chalk instance
fn chalk_locals(root: &SourceRoot) -> Vec<String> {
    let mut locals = Vec::new();
    for dep in module_dependencies(root, "chalk") {
        let names = [dep.module_object(), dep.named_local("default")];
        for name in names.into_iter().flatten() {
            if !locals.iter().any(|local| local == name) {
                locals.push(name.to_string());
            }
        }
    }
    locals
}

/// Styles of a call like `chalk.red.bold(...)`, `None` when the callee is
/// not a chalk style chain
fn chain_styles(call: &CallExpr, locals: &[String]) -> Option<Vec<String>> {
    let path = callee_path(call)?;
    let (object, styles) = path.split_once('.')?;
    locals
        .iter()
        .any(|local| local == object)
        .then(|| styles.split('.').map(str::to_string).collect())
}

pub struct ChalkToUtilStyleText;

impl ChalkToUtilStyleText {
    fn rewrite(&self, root: &SourceRoot, call: &CallExpr, styles: &[String]) -> Option<Vec<Edit>> {
        if let Some(style) = styles.iter().find(|style| UNSUPPORTED.contains(&style.as_str())) {
            warn!(
                style = %style,
                call = %root.text(call.span),
                "util.styleText() has no equivalent for this chalk style, leaving call unchanged"
            );
            return None;
        }

        let mut formats = Vec::with_capacity(styles.len());
        for style in styles {
            let Some(format) = style_format(style) else {
                warn!(style = %style, call = %root.text(call.span), "Unknown chalk style, leaving call unchanged");
                return None;
            };
            formats.push(format);
        }
        let format = match formats.as_slice() {
            [single] => single.clone(),
            _ => format!("[{}]", formats.join(", ")),
        };

        let callee = root.range(call.callee.span());
        let open = callee.end + root.source()[callee.end..].find('(')? + 1;

        let mut edits = vec![root.replace(call.callee.span(), STYLE_TEXT)];
        match call.args.as_slice() {
            [] => edits.push(Edit::insert(open, format!("{}, ''", format))),
            [_] => edits.push(Edit::insert(open, format!("{}, ", format))),
            [.., last] => {
                edits.push(Edit::insert(open, format!("{}, [", format)));
                edits.push(Edit::insert(root.range(last.expr.span()).end, "].join(' ')"));
            }
        }
        Some(edits)
    }
}

impl Recipe for ChalkToUtilStyleText {
    fn name(&self) -> &'static str {
        "chalk-to-util-styletext"
    }

    fn transform(&self, root: &SourceRoot) -> NodemodResult<Option<String>> {
        let locals = chalk_locals(root);
        if locals.is_empty() {
            return Ok(None);
        }

        let bound_from_util = module_dependencies(root, UTIL)
            .iter()
            .any(|dep| dep.named_local(STYLE_TEXT) == Some(STYLE_TEXT));
        if !bound_from_util && declared_names(root).contains(STYLE_TEXT) {
            warn!(
                path = %root.path().display(),
                "styleText is already declared in this file, skipping"
            );
            return Ok(None);
        }

        let calls = find_calls(root, |call| chain_styles(call, &locals).is_some());
        let mut edits = Vec::new();
        for call in &calls {
            let Some(styles) = chain_styles(call, &locals) else {
                continue;
            };
            if let Some(call_edits) = self.rewrite(root, call, &styles) {
                edits.extend(call_edits);
            }
        }
        if edits.is_empty() {
            return Ok(None);
        }

        let used: Vec<String> = locals
            .iter()
            .filter(|local| is_referenced(root, local))
            .cloned()
            .collect();

        let mut updated = root.reparse(root.commit(edits)?)?;
        if let Some(edit) = ensure_named_import(&updated, UTIL, STYLE_TEXT) {
            updated = updated.reparse(updated.commit(vec![edit])?)?;
        }
        updated = prune_unused_bindings(updated, "chalk", &used)?;

        if chalk_locals(&updated)
            .iter()
            .any(|local| is_referenced(&updated, local))
        {
            warn!(
                path = %root.path().display(),
                "chalk is still used after the rewrite, keeping its import"
            );
        } else {
            debug!(path = %root.path().display(), "Replaced every chalk call");
        }

        Ok(Some(updated.into_source()))
    }

    fn obsolete_dependencies(&self) -> &'static [&'static str] {
        &["chalk"]
    }
}

nodemod_recipe! {
    name: "chalk-to-util-styletext",
    description: "Replace chalk with util.styleText() from node:util",
    deprecations: [],
    factory: || Box::new(ChalkToUtilStyleText),
}
