//! RSA-PSS key generation options (DEP0154)
//!
//! `hash` and `mgf1Hash` of `generateKeyPair('rsa-pss', {...})` became
//! `hashAlgorithm` and `mgf1HashAlgorithm`.

use super::support::export_calls;
use crate::nodemod_recipe;
use crate::recipe::Recipe;
use nodemod_ast::query::{string_value, unquote};
use nodemod_ast::SourceRoot;
use nodemod_foundation::{Edit, NodemodResult};
use swc_ecma_ast::{CallExpr, Expr, ObjectLit, Prop, PropName, PropOrSpread};
use tracing::debug;

const RENAMES: &[(&str, &str)] = &[("hash", "hashAlgorithm"), ("mgf1Hash", "mgf1HashAlgorithm")];

fn key_name(root: &SourceRoot, key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(s) => Some(unquote(root.text(s.span))),
        _ => None,
    }
}

fn keys(root: &SourceRoot, options: &ObjectLit) -> Vec<String> {
    options
        .props
        .iter()
        .filter_map(|prop| match prop {
            PropOrSpread::Prop(prop) => match &**prop {
                Prop::KeyValue(kv) => key_name(root, &kv.key),
                Prop::Shorthand(ident) => Some(ident.sym.to_string()),
                _ => None,
            },
            PropOrSpread::Spread(_) => None,
        })
        .collect()
}

fn renamed(name: &str) -> Option<&'static str> {
    RENAMES.iter().find(|(old, _)| *old == name).map(|(_, new)| *new)
}

/// Edit renaming one option, with the name of the new key
fn rename_prop(root: &SourceRoot, prop: &Prop) -> Option<(&'static str, Edit)> {
    match prop {
        Prop::KeyValue(kv) => {
            let new = renamed(&key_name(root, &kv.key)?)?;
            match &kv.key {
                PropName::Ident(ident) => Some((new, root.replace(ident.span, new))),
                PropName::Str(s) => Some((new, root.replace(s.span, format!("'{}'", new)))),
                _ => None,
            }
        }
        Prop::Shorthand(ident) => {
            let new = renamed(ident.sym.as_ref())?;
            Some((new, root.replace(ident.span, format!("{}: {}", new, ident.sym))))
        }
        _ => None,
    }
}

fn rename_keys(root: &SourceRoot, options: &ObjectLit) -> Vec<Edit> {
    let present = keys(root, options);
    let mut edits = Vec::new();

    for prop in &options.props {
        let PropOrSpread::Prop(prop) = prop else {
            continue;
        };
        let Some((new, edit)) = rename_prop(root, prop) else {
            continue;
        };
        if present.iter().any(|key| key == new) {
            debug!(key = new, "Option already present, keeping the deprecated key");
            continue;
        }
        edits.push(edit);
    }
    edits
}

fn rsa_pss_options<'a>(root: &SourceRoot, call: &'a CallExpr) -> Option<&'a ObjectLit> {
    let kind = call.args.first()?;
    match string_value(root, &kind.expr) {
        Some(kind) if kind == "rsa-pss" => {}
        Some(_) => return None,
        None => {
            debug!(
                call = %root.text(call.span),
                "Key type is not a literal, leaving call unchanged"
            );
            return None;
        }
    }
    match &*call.args.get(1)?.expr {
        Expr::Object(object) => Some(object),
        _ => None,
    }
}

pub struct CryptoRsaPssUpdate;

impl Recipe for CryptoRsaPssUpdate {
    fn name(&self) -> &'static str {
        "crypto-rsa-pss-update"
    }

    fn transform(&self, root: &SourceRoot) -> NodemodResult<Option<String>> {
        let edits: Vec<Edit> = export_calls(root, "crypto", &["generateKeyPair", "generateKeyPairSync"])
            .iter()
            .filter_map(|found| rsa_pss_options(root, &found.call))
            .flat_map(|options| rename_keys(root, options))
            .collect();

        if edits.is_empty() {
            return Ok(None);
        }
        root.commit(edits).map(Some)
    }
}

nodemod_recipe! {
    name: "crypto-rsa-pss-update",
    description: "Rename the hash and mgf1Hash options of RSA-PSS key generation",
    deprecations: ["DEP0154"],
    factory: || Box::new(CryptoRsaPssUpdate),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes::support::testing::transform;
    use pretty_assertions::assert_eq;

    fn run(source: &str) -> Option<String> {
        transform(&CryptoRsaPssUpdate, "test.js", source)
    }

    #[test]
    fn test_renames_options() {
        let input = r#"const crypto = require('node:crypto');
crypto.generateKeyPairSync('rsa-pss', {
  modulusLength: 2048,
  hash: 'sha256',
  mgf1Hash: 'sha1',
  saltLength: 32,
});
"#;
        let expected = r#"const crypto = require('node:crypto');
crypto.generateKeyPairSync('rsa-pss', {
  modulusLength: 2048,
  hashAlgorithm: 'sha256',
  mgf1HashAlgorithm: 'sha1',
  saltLength: 32,
});
"#;
        assert_eq!(run(input).unwrap(), expected);
    }

    #[test]
    fn test_shorthand_and_named_import() {
        let input = "import { generateKeyPair } from 'crypto';\ngenerateKeyPair('rsa-pss', { modulusLength, hash }, done);\n";
        let expected = "import { generateKeyPair } from 'crypto';\ngenerateKeyPair('rsa-pss', { modulusLength, hashAlgorithm: hash }, done);\n";
        assert_eq!(run(input).unwrap(), expected);
    }

    #[test]
    fn test_other_key_types_are_untouched() {
        let input = "const { generateKeyPairSync } = require('crypto');\ngenerateKeyPairSync('rsa', { modulusLength: 2048, hash: 'sha256' });\n";
        assert_eq!(run(input), None);
    }

    #[test]
    fn test_existing_new_key_wins() {
        let input = "const crypto = require('crypto');\ncrypto.generateKeyPairSync('rsa-pss', { hash: 'sha1', hashAlgorithm: 'sha256' });\n";
        assert_eq!(run(input), None);
    }

    #[test]
    fn test_variable_key_type_is_not_followed() {
        let input = "const crypto = require('crypto');\nconst kind = 'rsa-pss';\ncrypto.generateKeyPairSync(kind, { hash: 'sha256' });\n";
        assert_eq!(run(input), None);
    }
}
