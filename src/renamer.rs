use crate::chain::{self, ChainRoot};
use crate::globals::GlobalSet;
use crate::options::{AssignmentPolicy, DEFAULT_RECEIVER};
use crate::scope::{Resolution, ScopeChain, ScopeResolver};
use oxc_allocator::Allocator;
use oxc_ast::ast::{
    AssignmentTarget, AssignmentTargetMaybeDefault, AssignmentTargetProperty, BindingIdentifier,
    BindingPattern, ChainElement, Expression, LabelIdentifier, MemberExpression, ObjectProperty,
    PropertyKey, SimpleAssignmentTarget, StaticMemberExpression, VariableDeclarator,
};
use oxc_ast::AstBuilder;
use oxc_ast_visit::{walk_mut, VisitMut};
use oxc_span::{Atom, Span, SPAN};
use oxc_syntax::scope::{ScopeFlags, ScopeId};
use oxc_syntax::symbol::SymbolId;
use serde::Serialize;
use std::cell::Cell;
use tracing::trace;

/// Positions where an identifier names a slot instead of reading a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    DeclarationTarget,
    PropertyKey,
    Label,
    MemberProperty,
    /// Only under `AssignmentPolicy::Preserve`.
    AssignmentTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Bound,
    Global,
    Receiver,
    Exempt(Slot),
    Synthetic,
    Free,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RewriteStats {
    pub bound: usize,
    pub global: usize,
    pub receiver: usize,
    pub exempt: usize,
    pub synthetic: usize,
    pub free: usize,
}

impl RewriteStats {
    fn record(&mut self, classification: Classification) {
        let counter = match classification {
            Classification::Bound => &mut self.bound,
            Classification::Global => &mut self.global,
            Classification::Receiver => &mut self.receiver,
            Classification::Exempt(_) => &mut self.exempt,
            Classification::Synthetic => &mut self.synthetic,
            Classification::Free => &mut self.free,
        };
        *counter += 1;
    }

    /// References that were qualified with the receiver.
    pub fn rewritten(&self) -> usize {
        self.free
    }
}

/// Qualifies free identifier references with the receiver.
///
/// The tree is mutated in place. Every mutation is also recorded as a
/// `(start, end, text)` replacement against the original source, so callers
/// can produce output without a code generator.
pub struct ImplicitReceiverRenamer<'a, 's, C: ScopeChain + ?Sized> {
    pub ast: AstBuilder<'a>,
    pub resolver: ScopeResolver<'s, C>,
    pub globals: &'s GlobalSet,
    pub receiver: &'s str,
    pub policy: AssignmentPolicy,
    pub scope_stack: Vec<Option<ScopeId>>,
    pub replacements: Vec<(u32, u32, String)>,
    pub stats: RewriteStats,
    /// Symbol declared by `var x = x;` while its initializer is visited.
    self_initializer: Option<SymbolId>,
}

impl<'a, 's, C: ScopeChain + ?Sized> ImplicitReceiverRenamer<'a, 's, C> {
    pub fn new(
        allocator: &'a Allocator,
        scopes: &'s C,
        globals: &'s GlobalSet,
        receiver: &'s str,
        policy: AssignmentPolicy,
    ) -> Self {
        Self {
            ast: AstBuilder::new(allocator),
            resolver: ScopeResolver::new(scopes),
            globals,
            receiver,
            policy,
            scope_stack: Vec::new(),
            replacements: Vec::new(),
            stats: RewriteStats::default(),
            self_initializer: None,
        }
    }

    fn current_scope(&self) -> Option<ScopeId> {
        self.scope_stack.last().copied().flatten()
    }

    pub fn classify(&self, name: &str, span: Span) -> Classification {
        if span.is_unspanned() {
            return Classification::Synthetic;
        }
        if name == self.receiver {
            return Classification::Receiver;
        }
        if let Some(scope) = self.current_scope() {
            match self.resolver.resolve(name, scope) {
                Some(Resolution::Symbol(symbol)) if Some(symbol) == self.self_initializer => {}
                Some(_) => return Classification::Bound,
                None => {}
            }
        }
        if self.globals.contains(name) {
            return Classification::Global;
        }
        Classification::Free
    }

    fn note(&mut self, name: &str, classification: Classification) -> Classification {
        trace!(name, ?classification, "identifier");
        self.stats.record(classification);
        classification
    }

    fn classify_reference(&mut self, name: &str, span: Span) -> Classification {
        let classification = self.classify(name, span);
        self.note(name, classification)
    }

    fn receiver_object(&self) -> Expression<'a> {
        if self.receiver == DEFAULT_RECEIVER {
            self.ast.expression_this(SPAN)
        } else {
            self.ast.expression_identifier(SPAN, self.ast.atom(self.receiver))
        }
    }

    /// Builds `receiver.name` and records the matching source edit.
    fn qualify(&mut self, span: Span, name: Atom<'a>, text: String) -> MemberExpression<'a> {
        self.replacements.push((span.start, span.end, text));
        self.ast.member_expression_static(
            span,
            self.receiver_object(),
            self.ast.identifier_name(SPAN, name),
            false,
        )
    }

    fn qualified_text(&self, name: &str) -> String {
        format!("{}.{}", self.receiver, name)
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // CHAINS
    // ═══════════════════════════════════════════════════════════════════════════════

    /// `a.b.c()`: classify the root once, then walk only computed indexes and arguments.
    fn visit_chain(&mut self, expr: &mut Expression<'a>) {
        let root_is_free = match chain::root_of(expr, self.receiver) {
            ChainRoot::Identifier { name, span } => {
                self.classify_reference(name, span) == Classification::Free
            }
            ChainRoot::Receiver => {
                self.note(self.receiver, Classification::Receiver);
                false
            }
            ChainRoot::Other => false,
        };
        self.walk_links(expr, root_is_free);
    }

    fn walk_links(&mut self, expr: &mut Expression<'a>, root_is_free: bool) {
        match expr {
            Expression::StaticMemberExpression(member) => {
                self.walk_links(&mut member.object, root_is_free);
                self.stats.record(Classification::Exempt(Slot::MemberProperty));
            }
            Expression::ComputedMemberExpression(member) => {
                self.walk_links(&mut member.object, root_is_free);
                self.visit_expression(&mut member.expression);
            }
            Expression::PrivateFieldExpression(member) => {
                self.walk_links(&mut member.object, root_is_free);
            }
            Expression::CallExpression(call) => {
                self.walk_links(&mut call.callee, root_is_free);
                self.visit_arguments(&mut call.arguments);
            }
            Expression::TSNonNullExpression(non_null) => {
                self.walk_links(&mut non_null.expression, root_is_free);
            }
            Expression::ChainExpression(chain) => {
                self.walk_chain_element(&mut chain.expression, root_is_free);
            }
            Expression::Identifier(ident) => {
                // Already classified by `visit_chain`.
                if root_is_free {
                    let (span, name) = (ident.span, ident.name);
                    let text = self.qualified_text(&name);
                    *expr = Expression::from(self.qualify(span, name, text));
                }
            }
            Expression::ThisExpression(_) => {}
            _ => self.visit_expression(expr),
        }
    }

    fn walk_chain_element(&mut self, element: &mut ChainElement<'a>, root_is_free: bool) {
        match element {
            ChainElement::CallExpression(call) => {
                self.walk_links(&mut call.callee, root_is_free);
                self.visit_arguments(&mut call.arguments);
            }
            ChainElement::TSNonNullExpression(non_null) => {
                self.walk_links(&mut non_null.expression, root_is_free);
            }
            ChainElement::StaticMemberExpression(member) => {
                self.walk_links(&mut member.object, root_is_free);
                self.stats.record(Classification::Exempt(Slot::MemberProperty));
            }
            ChainElement::ComputedMemberExpression(member) => {
                self.walk_links(&mut member.object, root_is_free);
                self.visit_expression(&mut member.expression);
            }
            ChainElement::PrivateFieldExpression(member) => {
                self.walk_links(&mut member.object, root_is_free);
            }
        }
    }
}

impl<'a, 's, C: ScopeChain + ?Sized> VisitMut<'a> for ImplicitReceiverRenamer<'a, 's, C> {
    fn enter_scope(&mut self, _flags: ScopeFlags, scope_id: &Cell<Option<ScopeId>>) {
        let scope = scope_id.get().or_else(|| self.current_scope());
        self.scope_stack.push(scope);
    }

    fn leave_scope(&mut self) {
        self.scope_stack.pop();
    }

    fn visit_expression(&mut self, expr: &mut Expression<'a>) {
        if let Expression::Identifier(ident) = expr {
            let (span, name) = (ident.span, ident.name);
            if self.classify_reference(&name, span) == Classification::Free {
                let text = self.qualified_text(&name);
                *expr = Expression::from(self.qualify(span, name, text));
            }
            // A replacement is never descended into.
            return;
        }
        if chain::is_link(expr) {
            self.visit_chain(expr);
            return;
        }
        walk_mut::walk_expression(self, expr);
    }

    fn visit_simple_assignment_target(&mut self, target: &mut SimpleAssignmentTarget<'a>) {
        let SimpleAssignmentTarget::AssignmentTargetIdentifier(ident) = target else {
            walk_mut::walk_simple_assignment_target(self, target);
            return;
        };
        let (span, name) = (ident.span, ident.name);
        if self.policy == AssignmentPolicy::Preserve {
            self.note(&name, Classification::Exempt(Slot::AssignmentTarget));
            return;
        }
        if self.classify_reference(&name, span) == Classification::Free {
            let text = self.qualified_text(&name);
            *target = SimpleAssignmentTarget::from(self.qualify(span, name, text));
        }
    }

    // `({ x } = o)` and `({ x = 1 } = o)`
    fn visit_assignment_target_property(&mut self, property: &mut AssignmentTargetProperty<'a>) {
        let AssignmentTargetProperty::AssignmentTargetPropertyIdentifier(shorthand) = property
        else {
            walk_mut::walk_assignment_target_property(self, property);
            return;
        };
        let outer_span = shorthand.span;
        let (span, name) = (shorthand.binding.span, shorthand.binding.name);
        let free = if self.policy == AssignmentPolicy::Preserve {
            self.note(&name, Classification::Exempt(Slot::AssignmentTarget));
            false
        } else {
            self.classify_reference(&name, span) == Classification::Free
        };
        if let Some(init) = &mut shorthand.init {
            self.visit_expression(init);
        }
        if !free {
            return;
        }

        let init = shorthand.init.take();
        let text = format!("{}: {}", name, self.qualified_text(&name));
        let member = self.qualify(span, name, text);
        let target = AssignmentTarget::from(SimpleAssignmentTarget::from(member));
        let binding = match init {
            Some(init) => self.ast.assignment_target_maybe_default_assignment_target_with_default(
                outer_span, target, init,
            ),
            None => AssignmentTargetMaybeDefault::from(target),
        };
        let key = self.ast.property_key_static_identifier(span, name);
        *property = self.ast.assignment_target_property_assignment_target_property_property(
            outer_span, key, binding, false,
        );
    }

    // `{ car }` becomes `{ car: this.car }`
    fn visit_object_property(&mut self, property: &mut ObjectProperty<'a>) {
        if property.shorthand {
            if let Expression::Identifier(ident) = &property.value {
                let (span, name) = (ident.span, ident.name);
                self.stats.record(Classification::Exempt(Slot::PropertyKey));
                if self.classify_reference(&name, span) == Classification::Free {
                    let text = format!("{}: {}", name, self.qualified_text(&name));
                    property.value = Expression::from(self.qualify(span, name, text));
                    property.shorthand = false;
                }
                return;
            }
        }
        walk_mut::walk_object_property(self, property);
    }

    fn visit_property_key(&mut self, key: &mut PropertyKey<'a>) {
        if let PropertyKey::StaticIdentifier(ident) = key {
            self.note(&ident.name, Classification::Exempt(Slot::PropertyKey));
            return;
        }
        walk_mut::walk_property_key(self, key);
    }

    fn visit_static_member_expression(&mut self, member: &mut StaticMemberExpression<'a>) {
        self.visit_expression(&mut member.object);
        self.stats.record(Classification::Exempt(Slot::MemberProperty));
    }

    fn visit_variable_declarator(&mut self, declarator: &mut VariableDeclarator<'a>) {
        let self_initializer = match (&declarator.id, &declarator.init) {
            (BindingPattern::BindingIdentifier(id), Some(Expression::Identifier(init)))
                if id.name == init.name =>
            {
                id.symbol_id.get()
            }
            _ => None,
        };
        let outer = std::mem::replace(&mut self.self_initializer, self_initializer);
        walk_mut::walk_variable_declarator(self, declarator);
        self.self_initializer = outer;
    }

    fn visit_binding_identifier(&mut self, ident: &mut BindingIdentifier<'a>) {
        self.note(&ident.name, Classification::Exempt(Slot::DeclarationTarget));
    }

    fn visit_label_identifier(&mut self, ident: &mut LabelIdentifier<'a>) {
        self.note(&ident.name, Classification::Exempt(Slot::Label));
    }
}
