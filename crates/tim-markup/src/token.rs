// SPDX-License-Identifier: MIT
//
// Token stream for markup text.
//
// Tokens are flat: a bracket group never owns another token. The tokenizer
// resolves nesting up front by always taking the innermost complete group,
// so everything downstream is a plain left-to-right walk.

use std::fmt;

use crate::tokenizer::escape;

/// One unit of tokenized markup.
///
/// Consecutive style-ish tags of a bracket group collect into a single
/// [`Token::TagGroup`]; structural tags (clearers, macro calls, cursor
/// positions, hyperlinks) stand alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Literal text, already unescaped.
    PlainText(String),

    /// Space-separated tag names awaiting resolution, e.g. `["bold", "141"]`.
    TagGroup(Vec<String>),

    /// A `/`-prefixed tag: `None` for the bare full clear, otherwise the
    /// target (`"bold"`, `"fg"`, `"!macro"`, `"~"`).
    Clearer(Option<String>),

    /// An inline macro invocation, `[!name(arg:arg)]`.
    MacroCall { name: String, args: Vec<String> },

    /// A cursor position directive, `[({x};{y})]`.
    Position(i32, i32),

    /// A hyperlink opener, `[~{protocol}://{uri}]`.
    Link { protocol: String, uri: String },
}

impl fmt::Display for Token {
    /// Writes the markup form of this token. Plain text is re-escaped, so
    /// concatenating the display of a token stream yields markup that
    /// tokenizes back to the same stream.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlainText(text) => f.write_str(&escape(text)),

            Self::TagGroup(tags) => write!(f, "[{}]", tags.join(" ")),

            Self::Clearer(None) => f.write_str("[/]"),
            Self::Clearer(Some(target)) => write!(f, "[/{target}]"),

            Self::MacroCall { name, args } => {
                if args.is_empty() {
                    write!(f, "[!{name}]")
                } else {
                    write!(f, "[!{name}({})]", args.join(":"))
                }
            }

            Self::Position(x, y) => write!(f, "[({x};{y})]"),

            Self::Link { protocol, uri } => write!(f, "[~{protocol}://{uri}]"),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn display_reconstructs_markup() {
        let cases: [(Token, &str); 6] = [
            (Token::PlainText("hello".into()), "hello"),
            (Token::TagGroup(vec!["bold".into(), "141".into()]), "[bold 141]"),
            (Token::Clearer(None), "[/]"),
            (Token::Clearer(Some("bold".into())), "[/bold]"),
            (
                Token::MacroCall {
                    name: "align".into(),
                    args: vec!["20".into(), "center".into()],
                },
                "[!align(20:center)]",
            ),
            (Token::Position(10, 2), "[(10;2)]"),
        ];

        for (token, expected) in cases {
            assert_eq!(token.to_string(), expected);
        }
    }

    #[test]
    fn macro_without_args_has_no_parens() {
        let token = Token::MacroCall {
            name: "upper".into(),
            args: Vec::new(),
        };
        assert_eq!(token.to_string(), "[!upper]");
    }

    #[test]
    fn link_display_includes_scheme() {
        let token = Token::Link {
            protocol: "https".into(),
            uri: "example.com/docs".into(),
        };
        assert_eq!(token.to_string(), "[~https://example.com/docs]");
    }

    #[test]
    fn plain_text_is_re_escaped() {
        let token = Token::PlainText("literal [bold] bracket".into());
        assert_eq!(token.to_string(), "literal \\[bold] bracket");
    }
}
