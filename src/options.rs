//! Caller configuration for a rewrite.
//!
//! Mirrors the option object the host compiler hands to the transform:
//! `env`, `globals`, `strict`, plus the receiver and policy knobs.

use oxc_span::SourceType;
use oxc_syntax::identifier::is_identifier_name;
use oxc_syntax::keyword::is_reserved_keyword;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::{Result, RewriteError};
use crate::globals::GlobalFragment;

pub const DEFAULT_RECEIVER: &str = "this";

// ═══════════════════════════════════════════════════════════════════════════════
// OPTION TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// How simple assignment targets (`x = 10`, `x++`, `({ x } = o)`) are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentPolicy {
    /// Assignment targets are ordinary references.
    #[default]
    Rewrite,
    /// Assignment targets are never qualified.
    Preserve,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Module,
    Script,
}

impl SourceKind {
    pub fn source_type(self) -> SourceType {
        match self {
            SourceKind::Module => SourceType::mjs(),
            SourceKind::Script => SourceType::cjs(),
        }
    }
}

/// User-supplied globals: inline names, an inline name/flag object, or a JSON file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub enum GlobalsOption {
    Names(Vec<String>),
    Map(GlobalFragment),
    File(PathBuf),
}

impl TryFrom<Value> for GlobalsOption {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(path) => Ok(GlobalsOption::File(PathBuf::from(path))),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(name) => Ok(name),
                    other => Err(format!("globals list entries must be strings, got {}", other)),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(GlobalsOption::Names),
            Value::Object(map) => Ok(GlobalsOption::Map(
                map.into_iter()
                    .map(|(name, flag)| (name, flag_is_writable(&flag)))
                    .collect(),
            )),
            other => Err(format!(
                "globals must be a list, an object or a file path, got {}",
                other
            )),
        }
    }
}

/// Flags follow the eslint conventions; membership is what matters to the rewrite.
pub(crate) fn flag_is_writable(flag: &Value) -> bool {
    match flag {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(s.as_str(), "writable" | "writeable" | "true"),
        _ => false,
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct RewriteOptions {
    /// Default environments, merged with `env`/`eslint-env` directives.
    #[serde(deserialize_with = "one_or_many")]
    pub env: Vec<String>,
    pub globals: Option<GlobalsOption>,
    /// Ignore directive comments entirely.
    pub strict: bool,
    pub receiver: String,
    pub assignment_targets: AssignmentPolicy,
    pub source_type: SourceKind,
    /// Base directory for relative globals paths. Defaults to the process working directory.
    pub cwd: Option<PathBuf>,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        RewriteOptions {
            env: Vec::new(),
            globals: None,
            strict: false,
            receiver: DEFAULT_RECEIVER.to_string(),
            assignment_targets: AssignmentPolicy::default(),
            source_type: SourceKind::default(),
            cwd: None,
        }
    }
}

impl RewriteOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| RewriteError::invalid_options(e.to_string()))
    }

    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| RewriteError::invalid_options(e.to_string()))
    }

    pub fn with_env<I, S>(mut self, envs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.env = envs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_globals(mut self, globals: GlobalsOption) -> Self {
        self.globals = Some(globals);
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_receiver(mut self, receiver: impl Into<String>) -> Self {
        self.receiver = receiver.into();
        self
    }

    pub fn with_assignment_targets(mut self, policy: AssignmentPolicy) -> Self {
        self.assignment_targets = policy;
        self
    }

    pub fn with_source_type(mut self, kind: SourceKind) -> Self {
        self.source_type = kind;
        self
    }

    pub fn with_cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Checks that cannot be expressed through serde alone.
    pub fn validate(&self) -> Result<()> {
        if self.receiver.trim().is_empty() {
            return Err(RewriteError::invalid_options("receiver must not be empty"));
        }
        if self.receiver == DEFAULT_RECEIVER {
            return Ok(());
        }
        if !is_identifier_name(&self.receiver) {
            return Err(RewriteError::invalid_options(format!(
                "receiver '{}' is not a valid identifier",
                self.receiver
            )));
        }
        if is_reserved_keyword(&self.receiver) {
            return Err(RewriteError::invalid_options(format!(
                "receiver '{}' is a reserved word",
                self.receiver
            )));
        }
        Ok(())
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(env)) => vec![env],
        Some(OneOrMany::Many(envs)) => envs,
        None => Vec::new(),
    })
}
