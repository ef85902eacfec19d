//! # Implicit receiver rewriting
//!
//! Turns free identifier references into receiver-qualified property
//! accesses: `a.b()` becomes `this.a.b()` unless `a` is bound or global.
//!
//! ## Classification
//!
//! Every identifier is classified exactly once:
//!
//! 1. **Synthetic**: no source position. Never rewritten.
//! 2. **Receiver**: `this`, or an identifier spelled like the configured receiver.
//! 3. **Exempt**: declaration targets, non-computed keys, labels, member properties.
//! 4. **Bound**: a binding exists in the reference's scope chain.
//! 5. **Global**: present in the unit's frozen global set.
//! 6. **Free**: everything else. Rewritten to `receiver.name`.
//!
//! For `a.b.c()` only the leftmost root `a` is classified. Computed indexes
//! and call arguments are separate references.
//!
//! ## Globals
//!
//! Built-ins, then user globals, then environments, then `global` directives.
//! An `env none` selection drops every environment. The set is built before
//! the tree is touched, so configuration errors never leave a unit half
//! rewritten.

mod cache;
mod chain;
mod directives;
mod discovery;
mod environments;
mod error;
mod globals;
mod options;
mod renamer;
mod scope;
mod transform;

#[cfg(test)]
mod rewrite_tests;

pub use cache::{resolve_globals_path, GlobalsCache};
pub use chain::{is_link, leftmost, next_link, root_of, ChainRoot};
pub use directives::{comment_texts, extract, DirectiveTag, Directives};
pub use discovery::{discover_sources, rewrite_files, rewrite_files_with_cache, FileRewrite};
pub use environments::{builtin_globals, environment, environment_names, is_known};
pub use error::{Result, RewriteError};
pub use globals::{
    build_globals, build_unit_globals, load_user_globals, EnvironmentSelection, GlobalFragment,
    GlobalSet, GlobalSetBuilder, UnitGlobals,
};
pub use options::{AssignmentPolicy, GlobalsOption, RewriteOptions, SourceKind, DEFAULT_RECEIVER};
pub use renamer::{Classification, ImplicitReceiverRenamer, RewriteStats, Slot};
pub use scope::{Resolution, ScopeChain, ScopeResolver, ARGUMENTS};
pub use transform::{
    apply_replacements, rewrite_program, rewrite_source, rewrite_source_with_cache,
    ProgramRewrite, RewriteOutput,
};
