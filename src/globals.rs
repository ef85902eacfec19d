//! The set of names a compilation unit treats as already bound.
//!
//! Layers, later ones winning: built-ins, user globals, environments,
//! `global` directives. The result is frozen before the rewrite starts.

use crate::cache::{resolve_globals_path, GlobalsCache};
use crate::directives::Directives;
use crate::environments::{self, NO_ENV};
use crate::error::{Result, RewriteError};
use crate::options::{GlobalsOption, RewriteOptions};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Name to writable flag. Only membership affects rewriting.
pub type GlobalFragment = HashMap<String, bool>;

// ═══════════════════════════════════════════════════════════════════════════════
// GLOBAL SET
// ═══════════════════════════════════════════════════════════════════════════════

/// Frozen global names for one unit. There is no way to add names once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalSet {
    names: GlobalFragment,
}

impl GlobalSet {
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    pub fn is_writable(&self, name: &str) -> bool {
        self.names.get(name).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }
}

#[derive(Debug, Default)]
pub struct GlobalSetBuilder {
    names: GlobalFragment,
}

impl GlobalSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later merges overwrite earlier flags for the same name.
    pub fn merge(&mut self, fragment: &GlobalFragment) -> &mut Self {
        self.names
            .extend(fragment.iter().map(|(name, flag)| (name.clone(), *flag)));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, writable: bool) -> &mut Self {
        self.names.insert(name.into(), writable);
        self
    }

    pub fn freeze(self) -> GlobalSet {
        GlobalSet { names: self.names }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENVIRONMENT SELECTION
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentSelection {
    /// Known environments in encounter order. May contain the `none` sentinel.
    pub names: Vec<String>,
    /// One message per dropped environment name.
    pub warnings: Vec<String>,
}

impl EnvironmentSelection {
    pub fn resolve<'s, I>(defaults: &'s [String], directive_envs: I) -> Self
    where
        I: IntoIterator<Item = &'s str>,
    {
        let mut selection = EnvironmentSelection::default();
        let requested = defaults
            .iter()
            .map(String::as_str)
            .chain(directive_envs);
        for env in requested {
            if env == NO_ENV || environments::is_known(env) {
                selection.names.push(env.to_string());
            } else {
                warn!(env, "unknown environment ignored");
                selection
                    .warnings
                    .push(format!("Unknown env '{}' specified", env));
            }
        }
        selection
    }

    /// True when the `none` sentinel was selected.
    pub fn is_disabled(&self) -> bool {
        self.names.iter().any(|env| env == NO_ENV)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REGISTRY
// ═══════════════════════════════════════════════════════════════════════════════

pub fn build_globals(
    builtins: &GlobalFragment,
    selection: &EnvironmentSelection,
    user: Option<&GlobalFragment>,
    directive_globals: &[String],
) -> GlobalSet {
    let mut builder = GlobalSetBuilder::new();
    builder.merge(builtins);
    if let Some(user) = user {
        builder.merge(user);
    }

    if !selection.is_disabled() {
        for env in &selection.names {
            if let Some(fragment) = environments::environment(env) {
                builder.merge(fragment);
            }
        }
    }

    for name in directive_globals {
        builder.insert(name.as_str(), true);
    }
    builder.freeze()
}

/// Turns the `globals` option into a fragment. File paths go through `cache`.
pub fn load_user_globals(
    option: Option<&GlobalsOption>,
    options: &RewriteOptions,
    cache: &GlobalsCache,
) -> Result<Option<Arc<GlobalFragment>>> {
    let Some(option) = option else {
        return Ok(None);
    };
    let fragment = match option {
        GlobalsOption::Names(names) => {
            Arc::new(names.iter().map(|name| (name.clone(), true)).collect())
        }
        GlobalsOption::Map(map) => Arc::new(map.clone()),
        GlobalsOption::File(path) => {
            let cwd = match &options.cwd {
                Some(cwd) => cwd.clone(),
                None => std::env::current_dir().map_err(|source| {
                    RewriteError::GlobalsUnreadable {
                        path: path.clone(),
                        source,
                    }
                })?,
            };
            let resolved: PathBuf = resolve_globals_path(path, &cwd);
            cache.load(&resolved)?
        }
    };
    Ok(Some(fragment))
}

/// Everything the registry decided for one unit.
#[derive(Debug, Clone)]
pub struct UnitGlobals {
    pub globals: GlobalSet,
    pub environments: Vec<String>,
    pub warnings: Vec<String>,
}

/// Registry entry point: built-ins, `options` and the unit's directives.
///
/// With `strict`, directives are ignored and only the caller's `env` and
/// `globals` apply.
pub fn build_unit_globals(
    directives: &Directives,
    options: &RewriteOptions,
    cache: &GlobalsCache,
) -> Result<UnitGlobals> {
    let user = load_user_globals(options.globals.as_ref(), options, cache)?;

    let empty = Directives::default();
    let directives = if options.strict { &empty } else { directives };

    let selection = EnvironmentSelection::resolve(&options.env, directives.environments());
    let globals = build_globals(
        environments::builtin_globals(),
        &selection,
        user.as_deref(),
        &directives.globals,
    );
    debug!(
        environments = ?selection.names,
        globals = globals.len(),
        strict = options.strict,
        "built unit globals"
    );

    Ok(UnitGlobals {
        globals,
        environments: selection.names,
        warnings: selection.warnings,
    })
}
