//! Directive comments: `global a, b`, `env node`, `eslint-env browser`.

use oxc_ast::ast::Program;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveTag {
    Global,
    Env,
    EslintEnv,
}

impl DirectiveTag {
    pub fn as_str(self) -> &'static str {
        match self {
            DirectiveTag::Global => "global",
            DirectiveTag::Env => "env",
            DirectiveTag::EslintEnv => "eslint-env",
        }
    }

    /// Returns the text following `"<tag> "` if the comment carries this tag.
    fn strip<'c>(self, comment: &'c str) -> Option<&'c str> {
        comment
            .trim()
            .strip_prefix(self.as_str())
            .and_then(|rest| rest.strip_prefix(' '))
    }
}

/// Names listed under `tag`, in source order. Duplicates are kept.
pub fn extract<S: AsRef<str>>(tag: DirectiveTag, comments: &[S]) -> Vec<String> {
    let mut names = Vec::new();
    for comment in comments {
        let Some(list) = tag.strip(comment.as_ref()) else {
            continue;
        };
        names.extend(
            list.split(',')
                .map(str::trim)
                .filter(|piece| !piece.is_empty())
                .map(str::to_string),
        );
    }
    names
}

/// Comment bodies without their `//` or `/* */` delimiters, in source order.
pub fn comment_texts<'a>(program: &Program<'a>) -> Vec<&'a str> {
    program
        .comments
        .iter()
        .map(|comment| comment.content_span().source_text(program.source_text))
        .collect()
}

/// Every directive in a unit, split by tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directives {
    pub globals: Vec<String>,
    pub eslint_envs: Vec<String>,
    pub envs: Vec<String>,
}

impl Directives {
    pub fn from_comments<S: AsRef<str>>(comments: &[S]) -> Self {
        Directives {
            globals: extract(DirectiveTag::Global, comments),
            eslint_envs: extract(DirectiveTag::EslintEnv, comments),
            envs: extract(DirectiveTag::Env, comments),
        }
    }

    /// `eslint-env` names first, then `env` names.
    pub fn environments(&self) -> impl Iterator<Item = &str> {
        self.eslint_envs
            .iter()
            .chain(self.envs.iter())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.globals.is_empty() && self.eslint_envs.is_empty() && self.envs.is_empty()
    }
}
