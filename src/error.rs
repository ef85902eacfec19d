use std::path::PathBuf;
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_INVALID_OPTIONS: &str = "IT-ERR-CONFIG-001";
pub const ERR_GLOBALS_UNREADABLE: &str = "IT-ERR-CONFIG-002";
pub const ERR_GLOBALS_NOT_JSON: &str = "IT-ERR-CONFIG-003";
pub const ERR_GLOBALS_NOT_OBJECT: &str = "IT-ERR-CONFIG-004";
pub const ERR_PARSE: &str = "IT-ERR-PARSE-001";
pub const ERR_SOURCE_UNREADABLE: &str = "IT-ERR-IO-001";

// ═══════════════════════════════════════════════════════════════════════════════
// REWRITE ERROR
// ═══════════════════════════════════════════════════════════════════════════════

/// Everything that can abort a compilation unit.
///
/// All configuration variants are raised while the global set is being built,
/// before the tree is touched, so a failed unit is never half rewritten.
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Cannot read globals file {}: {source}", path.display())]
    GlobalsUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Globals file {} is not valid JSON: {source}", path.display())]
    GlobalsNotJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Globals file {} must contain an object of name/flag pairs", path.display())]
    GlobalsNotObject { path: PathBuf },

    #[error("Failed to parse {file}: {}", messages.join("; "))]
    Parse { file: String, messages: Vec<String> },

    #[error("Cannot read source {}: {source}", path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RewriteError {
    pub fn invalid_options(msg: impl Into<String>) -> Self {
        Self::InvalidOptions(msg.into())
    }

    /// Stable code for tooling that matches on failures.
    pub fn code(&self) -> &'static str {
        match self {
            RewriteError::InvalidOptions(_) => ERR_INVALID_OPTIONS,
            RewriteError::GlobalsUnreadable { .. } => ERR_GLOBALS_UNREADABLE,
            RewriteError::GlobalsNotJson { .. } => ERR_GLOBALS_NOT_JSON,
            RewriteError::GlobalsNotObject { .. } => ERR_GLOBALS_NOT_OBJECT,
            RewriteError::Parse { .. } => ERR_PARSE,
            RewriteError::SourceUnreadable { .. } => ERR_SOURCE_UNREADABLE,
        }
    }

    /// Configuration errors are setup mistakes, not properties of the source.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            RewriteError::InvalidOptions(_)
                | RewriteError::GlobalsUnreadable { .. }
                | RewriteError::GlobalsNotJson { .. }
                | RewriteError::GlobalsNotObject { .. }
        )
    }
}

pub type Result<T, E = RewriteError> = std::result::Result<T, E>;
