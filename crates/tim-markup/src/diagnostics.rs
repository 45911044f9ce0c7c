//! Non-fatal parse diagnostics.
//!
//! Parsing never fails: every input produces output, and anything suspicious
//! is reported alongside the result instead of aborting it. Callers that want
//! strictness can treat a non-empty diagnostic list as an error.

use std::fmt;

use thiserror::Error;

/// What went wrong with one tag or macro.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    /// The tag matched no style keyword, color syntax, alias or pseudo tag.
    #[error("unknown tag")]
    UnknownTag,

    /// A macro was invoked or cleared by a name no definition exists for.
    #[error("unknown macro")]
    UnknownMacro,

    /// Literal text contained an unescaped `[` that never formed a group.
    #[error("unescaped '[' outside any tag group")]
    MalformedTagGroup,

    /// The tag looked like a color but a component was out of range.
    #[error("invalid color literal")]
    InvalidColorLiteral,

    /// Alias expansion hit the recursion limit, almost always a cycle.
    #[error("alias expansion exceeded {0} levels")]
    AliasCycleExceeded(usize),

    /// Macro output kept producing further macro calls past the limit.
    #[error("macro expansion exceeded {0} levels")]
    MacroRecursionExceeded(usize),

    /// A macro ran and returned an error; its input text was kept as-is.
    #[error("macro failed: {0}")]
    MacroFailed(String),
}

/// One diagnostic: the error kind plus the offending tag text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: MarkupError,
    pub tag: String,
}

impl Diagnostic {
    pub(crate) fn new(kind: MarkupError, tag: impl Into<String>) -> Self {
        Self {
            kind,
            tag: tag.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]: {}", self.tag, self.kind)
    }
}

// ---
