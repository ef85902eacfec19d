use oxc_semantic::Scoping;
use oxc_syntax::scope::{ScopeFlags, ScopeId};
use oxc_syntax::symbol::SymbolId;

/// Implicitly declared inside every non-arrow function.
pub const ARGUMENTS: &str = "arguments";

/// The frame structure the resolver needs from whoever built the scopes.
pub trait ScopeChain {
    fn parent(&self, scope: ScopeId) -> Option<ScopeId>;
    /// A binding declared directly in `scope`, not in its ancestors.
    fn binding(&self, scope: ScopeId, name: &str) -> Option<SymbolId>;
    fn flags(&self, scope: ScopeId) -> ScopeFlags;
}

impl ScopeChain for Scoping {
    fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scope_parent_id(scope)
    }

    fn binding(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.get_binding(scope, name)
    }

    fn flags(&self, scope: ScopeId) -> ScopeFlags {
        self.scope_flags(scope)
    }
}

/// What a scope-chain walk found for a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Symbol(SymbolId),
    /// `arguments` inside a non-arrow function.
    Implicit,
}

pub struct ScopeResolver<'s, C: ScopeChain + ?Sized> {
    chain: &'s C,
}

impl<'s, C: ScopeChain + ?Sized> ScopeResolver<'s, C> {
    pub fn new(chain: &'s C) -> Self {
        Self { chain }
    }

    /// Walks from `scope` to the root and returns the first frame's binding.
    pub fn resolve(&self, name: &str, scope: ScopeId) -> Option<Resolution> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(symbol) = self.chain.binding(id, name) {
                return Some(Resolution::Symbol(symbol));
            }
            if name == ARGUMENTS {
                let flags = self.chain.flags(id);
                if flags.is_function() && !flags.is_arrow() {
                    return Some(Resolution::Implicit);
                }
            }
            current = self.chain.parent(id);
        }
        None
    }

    pub fn is_bound(&self, name: &str, scope: ScopeId) -> bool {
        self.resolve(name, scope).is_some()
    }
}
