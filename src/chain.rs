//! Leftmost roots of member-access and call chains.
//!
//! `a.b.c()`, `a[b]()` and `a?.b` are all governed by `a`. Only the object and
//! callee edges are followed; computed indexes and arguments are values in
//! their own right and get classified separately.

use oxc_ast::ast::{ChainElement, Expression};
use oxc_span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainRoot<'e> {
    Identifier { name: &'e str, span: Span },
    /// `this`, or an identifier spelled like the configured receiver.
    Receiver,
    /// Any other expression, e.g. `[1, 2]`, `new X()` or `(a || b)`.
    Other,
}

/// True for expressions that carry an object or callee edge.
pub fn is_link(expr: &Expression<'_>) -> bool {
    next_link(expr).is_some()
}

/// The child that leftmost-root resolution follows, if any.
pub fn next_link<'e, 'a>(expr: &'e Expression<'a>) -> Option<&'e Expression<'a>> {
    match expr {
        Expression::StaticMemberExpression(member) => Some(&member.object),
        Expression::ComputedMemberExpression(member) => Some(&member.object),
        Expression::PrivateFieldExpression(member) => Some(&member.object),
        Expression::CallExpression(call) => Some(&call.callee),
        Expression::ChainExpression(chain) => Some(chain_element_link(&chain.expression)),
        Expression::TSNonNullExpression(non_null) => Some(&non_null.expression),
        _ => None,
    }
}

fn chain_element_link<'e, 'a>(element: &'e ChainElement<'a>) -> &'e Expression<'a> {
    match element {
        ChainElement::CallExpression(call) => &call.callee,
        ChainElement::TSNonNullExpression(non_null) => &non_null.expression,
        ChainElement::StaticMemberExpression(member) => &member.object,
        ChainElement::ComputedMemberExpression(member) => &member.object,
        ChainElement::PrivateFieldExpression(member) => &member.object,
    }
}

/// Follows object/callee edges until a node has neither.
pub fn leftmost<'e, 'a>(expr: &'e Expression<'a>) -> &'e Expression<'a> {
    let mut current = expr;
    while let Some(next) = next_link(current) {
        current = next;
    }
    current
}

pub fn root_of<'e>(expr: &'e Expression<'_>, receiver: &str) -> ChainRoot<'e> {
    match leftmost(expr) {
        Expression::ThisExpression(_) => ChainRoot::Receiver,
        Expression::Identifier(ident) if ident.name.as_str() == receiver => ChainRoot::Receiver,
        Expression::Identifier(ident) => ChainRoot::Identifier {
            name: ident.name.as_str(),
            span: ident.span,
        },
        _ => ChainRoot::Other,
    }
}

/// Number of links between `expr` and its root.
#[cfg(test)]
fn depth(expr: &Expression<'_>) -> usize {
    let mut current = expr;
    let mut links = 0;
    while let Some(next) = next_link(current) {
        current = next;
        links += 1;
    }
    links
}
