//! Small queries over swc expressions: dotted member paths, string
//! literals, call lookup by callee path.

use crate::root::SourceRoot;
use swc_common::{Span, Spanned};
use std::collections::HashSet;
use swc_ecma_ast::{
    ArrayLit, ArrowExpr, AssignExpr, BlockStmtOrExpr, CallExpr, Callee, CondExpr, DoWhileStmt,
    Expr, ExprOrSpread, ExprStmt, ForStmt, IfStmt, KeyValueProp, Lit, MemberExpr, MemberProp,
    NewExpr, ParenExpr, ReturnStmt, ThrowStmt, Tpl, VarDeclarator, WhileStmt,
};
use swc_ecma_visit::{Visit, VisitWith};

/// Dotted path of an identifier or a chain of static member accesses.
///
/// `util.types.isNativeError` → `"util.types.isNativeError"`. Computed
/// members with a string literal key (`fs['F_OK']`) are accepted, any other
/// computed member, call or literal in the chain yields `None`.
pub fn member_path(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Ident(ident) => Some(ident.sym.to_string()),
        Expr::Member(member) => member_expr_path(member),
        Expr::Paren(paren) => member_path(&paren.expr),
        _ => None,
    }
}

/// Dotted path of a member expression, see [`member_path`]
pub fn member_expr_path(member: &MemberExpr) -> Option<String> {
    let object = member_path(&member.obj)?;
    let prop = member_prop_name(&member.prop)?;
    Some(format!("{}.{}", object, prop))
}

/// Static name of a member property
pub fn member_prop_name(prop: &MemberProp) -> Option<String> {
    match prop {
        MemberProp::Ident(ident) => Some(ident.sym.to_string()),
        MemberProp::Computed(computed) => match &*computed.expr {
            Expr::Lit(Lit::Str(s)) => s.raw.as_ref().map(|raw| unquote(raw)),
            _ => None,
        },
        MemberProp::PrivateName(_) => None,
    }
}

/// Strip one pair of matching quotes or backticks
pub fn unquote(text: &str) -> String {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && matches!(first, b'\'' | b'"' | b'`') {
            return text[1..text.len() - 1].to_string();
        }
    }
    text.to_string()
}

/// Value of a string literal or a template literal without substitutions
pub fn string_value(root: &SourceRoot, expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(Lit::Str(s)) => Some(unquote(root.text(s.span))),
        Expr::Tpl(Tpl { exprs, span, .. }) if exprs.is_empty() => Some(unquote(root.text(*span))),
        _ => None,
    }
}

/// Dotted path of a call's callee
pub fn callee_path(call: &CallExpr) -> Option<String> {
    match &call.callee {
        Callee::Expr(expr) => member_path(expr),
        _ => None,
    }
}

/// `require('…')` with a single literal argument
pub fn is_require_call(call: &CallExpr) -> bool {
    matches!(&call.callee, Callee::Expr(expr) if matches!(&**expr, Expr::Ident(ident) if ident.sym.as_ref() == "require"))
        && call.args.len() == 1
        && call.args[0].spread.is_none()
        && matches!(&*call.args[0].expr, Expr::Lit(Lit::Str(_)) | Expr::Tpl(_))
}

/// `import('…')` with a literal first argument
pub fn is_import_call(call: &CallExpr) -> bool {
    matches!(call.callee, Callee::Import(_))
        && !call.args.is_empty()
        && matches!(&*call.args[0].expr, Expr::Lit(Lit::Str(_)) | Expr::Tpl(_))
}

/// Source text of all arguments, from the first to the last, as written
pub fn args_text<'a>(root: &'a SourceRoot, args: &[ExprOrSpread]) -> &'a str {
    match (args.first(), args.last()) {
        (Some(first), Some(last)) => root.text_between(first.span(), last.span()),
        _ => "",
    }
}

/// Whether an expression can be repeated or embedded in an operator
/// expression without parentheses
pub fn is_simple_expr(expr: &Expr) -> bool {
    match expr {
        Expr::Ident(_) | Expr::Lit(_) | Expr::This(_) | Expr::Paren(_) | Expr::Array(_) => true,
        Expr::Member(member) => is_simple_expr(&member.obj),
        Expr::Call(call) => match &call.callee {
            Callee::Expr(callee) => is_simple_expr(callee),
            _ => false,
        },
        _ => false,
    }
}

/// Source text of `expr`, wrapped in parentheses unless it is simple
pub fn operand_text(root: &SourceRoot, expr: &Expr) -> String {
    let text = root.text(expr.span());
    if is_simple_expr(expr) {
        text.to_string()
    } else {
        format!("({})", text)
    }
}

struct CallCollector<F> {
    predicate: F,
    calls: Vec<CallExpr>,
}

impl<F: Fn(&CallExpr) -> bool> Visit for CallCollector<F> {
    fn visit_call_expr(&mut self, node: &CallExpr) {
        if (self.predicate)(node) {
            self.calls.push(node.clone());
        }
        node.visit_children_with(self);
    }
}

/// Every call expression accepted by `predicate`, in source order
pub fn find_calls<F: Fn(&CallExpr) -> bool>(root: &SourceRoot, predicate: F) -> Vec<CallExpr> {
    let mut collector = CallCollector {
        predicate,
        calls: Vec::new(),
    };
    root.visit(&mut collector);
    collector.calls
}

/// Calls whose callee path is exactly `path`
pub fn calls_to(root: &SourceRoot, path: &str) -> Vec<CallExpr> {
    find_calls(root, |call| callee_path(call).as_deref() == Some(path))
}

struct MemberCollector<'p> {
    path: &'p str,
    members: Vec<MemberExpr>,
}

impl Visit for MemberCollector<'_> {
    fn visit_member_expr(&mut self, node: &MemberExpr) {
        if member_expr_path(node).as_deref() == Some(self.path) {
            self.members.push(node.clone());
            return;
        }
        node.visit_children_with(self);
    }
}

/// Member expressions whose full path is exactly `path`
pub fn member_exprs(root: &SourceRoot, path: &str) -> Vec<MemberExpr> {
    let mut collector = MemberCollector {
        path,
        members: Vec::new(),
    };
    root.visit(&mut collector);
    collector.members
}

#[derive(Default)]
struct NewCollector {
    callees: Vec<Span>,
}

impl Visit for NewCollector {
    fn visit_new_expr(&mut self, node: &NewExpr) {
        self.callees.push(node.callee.span());
        node.visit_children_with(self);
    }
}

/// Spans of callees that appear as the target of `new`
pub fn constructed_callees(root: &SourceRoot) -> Vec<Span> {
    let mut collector = NewCollector::default();
    root.visit(&mut collector);
    collector.callees
}

/// Collects expressions sitting where any expression fits without
/// parentheses: statements, initializers, arguments, conditions
#[derive(Default)]
struct StandaloneCollector {
    spans: HashSet<Span>,
}

impl StandaloneCollector {
    fn add(&mut self, expr: &Expr) {
        self.spans.insert(expr.span());
    }
}

impl Visit for StandaloneCollector {
    fn visit_expr_stmt(&mut self, node: &ExprStmt) {
        self.add(&node.expr);
        node.visit_children_with(self);
    }

    fn visit_var_declarator(&mut self, node: &VarDeclarator) {
        if let Some(init) = &node.init {
            self.add(init);
        }
        node.visit_children_with(self);
    }

    fn visit_return_stmt(&mut self, node: &ReturnStmt) {
        if let Some(arg) = &node.arg {
            self.add(arg);
        }
        node.visit_children_with(self);
    }

    fn visit_throw_stmt(&mut self, node: &ThrowStmt) {
        self.add(&node.arg);
        node.visit_children_with(self);
    }

    fn visit_if_stmt(&mut self, node: &IfStmt) {
        self.add(&node.test);
        node.visit_children_with(self);
    }

    fn visit_while_stmt(&mut self, node: &WhileStmt) {
        self.add(&node.test);
        node.visit_children_with(self);
    }

    fn visit_do_while_stmt(&mut self, node: &DoWhileStmt) {
        self.add(&node.test);
        node.visit_children_with(self);
    }

    fn visit_for_stmt(&mut self, node: &ForStmt) {
        if let Some(test) = &node.test {
            self.add(test);
        }
        node.visit_children_with(self);
    }

    fn visit_cond_expr(&mut self, node: &CondExpr) {
        self.add(&node.test);
        node.visit_children_with(self);
    }

    fn visit_call_expr(&mut self, node: &CallExpr) {
        for arg in &node.args {
            self.add(&arg.expr);
        }
        node.visit_children_with(self);
    }

    fn visit_new_expr(&mut self, node: &NewExpr) {
        for arg in node.args.iter().flatten() {
            self.add(&arg.expr);
        }
        node.visit_children_with(self);
    }

    fn visit_array_lit(&mut self, node: &ArrayLit) {
        for elem in node.elems.iter().flatten() {
            self.add(&elem.expr);
        }
        node.visit_children_with(self);
    }

    fn visit_assign_expr(&mut self, node: &AssignExpr) {
        self.add(&node.right);
        node.visit_children_with(self);
    }

    fn visit_arrow_expr(&mut self, node: &ArrowExpr) {
        if let BlockStmtOrExpr::Expr(body) = &*node.body {
            self.add(body);
        }
        node.visit_children_with(self);
    }

    fn visit_key_value_prop(&mut self, node: &KeyValueProp) {
        self.add(&node.value);
        node.visit_children_with(self);
    }

    fn visit_paren_expr(&mut self, node: &ParenExpr) {
        self.add(&node.expr);
        node.visit_children_with(self);
    }

    fn visit_tpl(&mut self, node: &Tpl) {
        for expr in &node.exprs {
            self.add(expr);
        }
        node.visit_children_with(self);
    }
}

/// Spans of expressions that can be replaced by an operator expression
/// without wrapping it in parentheses
pub fn standalone_expression_spans(root: &SourceRoot) -> HashSet<Span> {
    let mut collector = StandaloneCollector::default();
    root.visit(&mut collector);
    collector.spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> SourceRoot {
        SourceRoot::parse("test.js", source).unwrap()
    }

    #[test]
    fn test_calls_to_member_path() {
        let root = parse("util.isArray(a);\nutil.types.isNativeError(e);\nfoo(util.isArray(b));\n");
        let calls = calls_to(&root, "util.isArray");
        assert_eq!(calls.len(), 2);
        assert_eq!(root.text(calls[0].span), "util.isArray(a)");
        assert_eq!(root.text(calls[1].span), "util.isArray(b)");

        let nested = calls_to(&root, "util.types.isNativeError");
        assert_eq!(nested.len(), 1);
        assert_eq!(args_text(&root, &nested[0].args), "e");
    }

    #[test]
    fn test_member_path_variants() {
        let root = parse("fs['F_OK'];\nfs.F_OK.toString();\nget().x;\n");
        assert_eq!(member_exprs(&root, "fs.F_OK").len(), 2);
        assert!(member_exprs(&root, "get.x").is_empty());
    }

    #[test]
    fn test_require_and_import_calls() {
        let root = parse(
            "const a = require('a');\nasync function f() {\n  const b = await import('b');\n}\nrequire(name);\n",
        );
        assert_eq!(find_calls(&root, is_require_call).len(), 1);
        assert_eq!(find_calls(&root, is_import_call).len(), 1);
    }

    #[test]
    fn test_string_value() {
        let root = parse("f('a', \"b\", `c`, `d${e}`);");
        let call = &find_calls(&root, |_| true)[0];
        let values: Vec<_> = call
            .args
            .iter()
            .map(|arg| string_value(&root, &arg.expr))
            .collect();
        assert_eq!(
            values,
            vec![Some("a".to_string()), Some("b".to_string()), Some("c".to_string()), None]
        );
    }

    #[test]
    fn test_operand_text_parenthesizes_compound_expressions() {
        let root = parse("f(a.b, x + y, g(z));");
        let call = &find_calls(&root, |call| callee_path(call).as_deref() == Some("f"))[0];
        let operands: Vec<_> = call
            .args
            .iter()
            .map(|arg| operand_text(&root, &arg.expr))
            .collect();
        assert_eq!(operands, vec!["a.b", "(x + y)", "g(z)"]);
    }

    #[test]
    fn test_standalone_expression_spans() {
        let root = parse("if (f(a)) {}\nconst x = !g(b);\nh(c) && k;\n");
        let spans = standalone_expression_spans(&root);
        let texts: HashSet<_> = spans.iter().map(|span| root.text(*span)).collect();
        assert!(texts.contains("f(a)"));
        assert!(texts.contains("!g(b)"));
        assert!(!texts.contains("g(b)"));
        assert!(!texts.contains("h(c)"));
    }

    #[test]
    fn test_constructed_callees() {
        let root = parse("new http.Agent();\nhttp.Agent();\n");
        let spans = constructed_callees(&root);
        assert_eq!(spans.len(), 1);
        assert_eq!(root.text(spans[0]), "http.Agent");
    }
}
