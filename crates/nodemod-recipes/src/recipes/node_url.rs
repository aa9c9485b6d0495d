//! Legacy `url` API to WHATWG `URL` (DEP0116)
//!
//! - `url.parse(input)` → `new URL(input)`
//! - `url.resolve(from, to)` → `new URL(to, from).href`
//! - `url.format({ ... })` with an object literal → template literal
//!
//! Anything else (`parse` with extra arguments, `format` of a variable,
//! `query` objects, spreads) is warned about and left for a human.

use super::support::{escape_template, export_calls, finish_inner_first};
use crate::nodemod_recipe;
use crate::recipe::Recipe;
use nodemod_ast::query::{string_value, unquote};
use nodemod_ast::SourceRoot;
use nodemod_foundation::NodemodResult;
use std::collections::HashMap;
use swc_common::Spanned;
use swc_ecma_ast::{CallExpr, Expr, Lit, ObjectLit, Prop, PropName, PropOrSpread};
use tracing::warn;

/// Protocols `url.format()` writes `//` after
const SLASHED_PROTOCOLS: &[&str] = &["http", "https", "ftp", "gopher", "file", "ws", "wss"];

const FORMAT_KEYS: &[&str] = &[
    "protocol", "slashes", "auth", "host", "hostname", "port", "pathname", "search", "hash",
];

/// One component of a formatted URL
enum Part {
    Literal(String),
    Expr(String),
}

impl Part {
    fn render(&self) -> String {
        match self {
            Part::Literal(text) => escape_template(text),
            Part::Expr(text) => format!("${{{}}}", text),
        }
    }

    /// Literal with `prefix` ensured in front
    fn prefixed(self, prefix: char) -> Part {
        match self {
            Part::Literal(text) if !text.is_empty() && !text.starts_with(prefix) => {
                Part::Literal(format!("{}{}", prefix, text))
            }
            part => part,
        }
    }
}

fn part(root: &SourceRoot, expr: &Expr) -> Part {
    match string_value(root, expr) {
        Some(text) => Part::Literal(text),
        None => Part::Expr(root.text(expr.span()).to_string()),
    }
}

/// Template literal for a `url.format()` object literal
fn format_template(root: &SourceRoot, object: &ObjectLit) -> Result<String, String> {
    let mut parts: HashMap<String, &Expr> = HashMap::new();
    for prop in &object.props {
        let PropOrSpread::Prop(prop) = prop else {
            return Err("spread in url object".to_string());
        };
        let (key, value) = match &**prop {
            Prop::KeyValue(kv) => {
                let key = match &kv.key {
                    PropName::Ident(ident) => ident.sym.to_string(),
                    PropName::Str(s) => unquote(root.text(s.span)),
                    _ => return Err("computed key in url object".to_string()),
                };
                (key, &*kv.value)
            }
            _ => return Err("unsupported property in url object".to_string()),
        };
        if !FORMAT_KEYS.contains(&key.as_str()) {
            return Err(format!("unsupported url object key `{}`", key));
        }
        parts.insert(key, value);
    }

    let mut template = String::new();

    let mut slashes = parts
        .get("slashes")
        .is_some_and(|value| matches!(value, Expr::Lit(Lit::Bool(b)) if b.value));
    if let Some(protocol) = parts.get("protocol") {
        let Some(protocol) = string_value(root, protocol) else {
            return Err("protocol is not a string literal".to_string());
        };
        let protocol = protocol.trim_end_matches(':');
        slashes |= SLASHED_PROTOCOLS.contains(&protocol);
        template.push_str(&escape_template(protocol));
        template.push(':');
    }
    if slashes {
        template.push_str("//");
    }

    if let Some(auth) = parts.get("auth") {
        template.push_str(&part(root, auth).render());
        template.push('@');
    }

    if let Some(host) = parts.get("host") {
        template.push_str(&part(root, host).render());
    } else if let Some(hostname) = parts.get("hostname") {
        template.push_str(&part(root, hostname).render());
        if let Some(port) = parts.get("port") {
            template.push(':');
            template.push_str(&part(root, port).render());
        }
    }

    if let Some(pathname) = parts.get("pathname") {
        template.push_str(&part(root, pathname).prefixed('/').render());
    }
    if let Some(search) = parts.get("search") {
        template.push_str(&part(root, search).prefixed('?').render());
    }
    if let Some(hash) = parts.get("hash") {
        template.push_str(&part(root, hash).prefixed('#').render());
    }

    Ok(format!("`{}`", template))
}

fn args(root: &SourceRoot, call: &CallExpr) -> Vec<String> {
    call.args
        .iter()
        .map(|arg| root.text(arg.expr.span()).to_string())
        .collect()
}

pub struct NodeUrlToWhatwgUrl;

impl NodeUrlToWhatwgUrl {
    fn replacement(&self, root: &SourceRoot, export: &str, call: &CallExpr) -> Option<String> {
        if call.args.iter().any(|arg| arg.spread.is_some()) {
            warn!(call = %root.text(call.span), "Spread arguments, leaving call unchanged");
            return None;
        }
        let args = args(root, call);

        match (export, args.as_slice()) {
            ("parse", [input]) => Some(format!("new URL({})", input)),
            ("parse", _) => {
                warn!(
                    call = %root.text(call.span),
                    "url.parse() with extra arguments has no URL equivalent, leaving call unchanged"
                );
                None
            }
            ("resolve", [from, to]) => Some(format!("new URL({}, {}).href", to, from)),
            ("format", [_]) => match &*call.args[0].expr {
                Expr::Object(object) => match format_template(root, object) {
                    Ok(template) => Some(template),
                    Err(reason) => {
                        warn!(call = %root.text(call.span), %reason, "Leaving url.format() unchanged");
                        None
                    }
                },
                _ => {
                    warn!(
                        call = %root.text(call.span),
                        "url.format() of a non literal object, leaving call unchanged"
                    );
                    None
                }
            },
            _ => {
                warn!(call = %root.text(call.span), "Unexpected arguments, leaving call unchanged");
                None
            }
        }
    }
}

impl Recipe for NodeUrlToWhatwgUrl {
    fn name(&self) -> &'static str {
        "node-url-to-whatwg-url"
    }

    fn transform(&self, root: &SourceRoot) -> NodemodResult<Option<String>> {
        finish_inner_first(root, &["url"], |root| {
            export_calls(root, "url", &["parse", "resolve", "format"])
                .iter()
                .filter_map(|found| {
                    self.replacement(root, found.export, &found.call)
                        .map(|text| root.replace(found.call.span, text))
                })
                .collect()
        })
    }
}

nodemod_recipe! {
    name: "node-url-to-whatwg-url",
    description: "Replace the legacy url.parse/resolve/format API with WHATWG URL",
    deprecations: ["DEP0116"],
    factory: || Box::new(NodeUrlToWhatwgUrl),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes::support::testing::transform;
    use pretty_assertions::assert_eq;

    fn run(source: &str) -> Option<String> {
        transform(&NodeUrlToWhatwgUrl, "test.js", source)
    }

    #[test]
    fn test_parse_and_resolve() {
        let input = "const url = require('node:url');\nconst parsed = url.parse(input);\nconst next = url.resolve(base, '/two');\n";
        let expected = "const parsed = new URL(input);\nconst next = new URL('/two', base).href;\n";
        assert_eq!(run(input).unwrap(), expected);
    }

    #[test]
    fn test_format_literal_object() {
        let input = r#"import { format } from 'url';
const link = format({
  protocol: 'https:',
  hostname: 'example.com',
  port: port,
  pathname: 'docs',
  search: 'q=1',
  hash: 'top',
});
"#;
        let expected = "const link = `https://example.com:${port}/docs?q=1#top`;\n";
        assert_eq!(run(input).unwrap(), expected);
    }

    #[test]
    fn test_format_with_host_and_auth() {
        let input = "import url from 'url';\nurl.format({ protocol: 'ftp', auth: 'me:pw', host: 'files.local', pathname: '/a`b' });\n";
        let expected = "`ftp://me:pw@files.local/a\\`b`;\n";
        assert_eq!(run(input).unwrap(), expected);
    }

    #[test]
    fn test_unsupported_calls_are_kept() {
        let input = "const url = require('url');\nurl.parse(input, true);\nurl.format(parts);\nurl.format({ query: { a: 1 } });\n";
        assert_eq!(run(input), None);
    }

    #[test]
    fn test_binding_kept_while_still_used() {
        let input = "const url = require('url');\nurl.parse(a);\nurl.fileURLToPath(b);\n";
        let expected = "const url = require('url');\nnew URL(a);\nurl.fileURLToPath(b);\n";
        assert_eq!(run(input).unwrap(), expected);
    }

    #[test]
    fn test_nested_calls_rewrite_inner_first() {
        let input = "const url = require('url');\nconst target = url.parse(url.resolve(base, rel));\n";
        let expected = "const target = new URL(new URL(rel, base).href);\n";
        assert_eq!(run(input).unwrap(), expected);
    }
}
