//! The result of a parse.
//!
//! A [`StyledText`] bundles the compiled ANSI string with the plain visible
//! text, the token stream it came from, and any diagnostics. Printing one
//! prints the ANSI form.

use std::fmt;

use unicode_width::UnicodeWidthStr;

use crate::diagnostics::Diagnostic;
use crate::token::Token;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledText {
    /// The terminal-ready string: text interleaved with escape sequences.
    pub ansi: String,
    /// The visible text alone: markup stripped, macros applied.
    pub plain: String,
    /// The token stream the markup scanned into.
    pub tokens: Vec<Token>,
    /// Everything non-fatal the parse noticed, in source order.
    pub diagnostics: Vec<Diagnostic>,
}

impl StyledText {
    /// Terminal column width of the visible text.
    #[must_use]
    pub fn width(&self) -> usize {
        self.plain.width()
    }

    /// True when parsing raised no diagnostics.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl fmt::Display for StyledText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ansi)
    }
}

// ---
