// SPDX-License-Identifier: MIT
//
// The markup tokenizer.
//
// Scanning is regex-driven: every complete `[...]` group is found in one
// pass, and because the group body excludes both bracket characters, an
// overlapping pair like `[red [blue]` resolves to the innermost complete
// group. Text the scanner cannot form into a group stays literal.
//
// Tokenizing is total. Nothing here returns an error; shapes that almost
// parse (a macro call with a malformed body, a link without a scheme, a
// position with a non-numeric coordinate) fall back to ordinary tags and
// are reported later by the resolver.

use std::sync::LazyLock;

use regex::Regex;

use crate::diagnostics::{Diagnostic, MarkupError};
use crate::token::Token;

/// Zero or more escaping backslashes, then a bracket group that contains no
/// bracket of either kind.
static RE_MARKUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\\*)\[([^\[\]]*)\]").expect("markup pattern is valid"));

/// A whole tag of the form `!name` or `!name(arg:arg)`.
static RE_MACRO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^!([a-z0-9_-]+)(?:\(([\w/.?=:-]+)\))?$").expect("macro pattern is valid")
});

/// Tokenizes markup, discarding diagnostics.
#[must_use]
pub fn tokenize(markup: &str) -> Vec<Token> {
    tokenize_full(markup).0
}

/// Tokenizes markup and reports every stretch of literal text that holds an
/// unescaped `[` which never became a group.
pub(crate) fn tokenize_full(markup: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut tokens = Vec::new();
    let mut diagnostics = Vec::new();
    let mut cursor = 0;

    for caps in RE_MARKUP.captures_iter(markup) {
        let Some(full) = caps.get(0) else { continue };

        if cursor < full.start() {
            push_plain(
                &mut tokens,
                &mut diagnostics,
                &markup[cursor..full.start()],
                true,
            );
        }

        if caps[1].is_empty() {
            consume_group(&caps[2], &mut tokens);
        } else {
            // One backslash is consumed; whatever remains of the match is
            // literal text, and the group is not interpreted.
            push_plain(&mut tokens, &mut diagnostics, &full.as_str()[1..], false);
        }

        cursor = full.end();
    }

    if cursor < markup.len() {
        push_plain(&mut tokens, &mut diagnostics, &markup[cursor..], true);
    }

    (tokens, diagnostics)
}

/// Appends literal text, merging into a preceding [`Token::PlainText`].
/// `from_source` text never passed through an escape, so a `[` inside it is
/// one the scanner failed to close.
fn push_plain(
    tokens: &mut Vec<Token>,
    diagnostics: &mut Vec<Diagnostic>,
    text: &str,
    from_source: bool,
) {
    if text.is_empty() {
        return;
    }
    if from_source && text.contains('[') {
        diagnostics.push(Diagnostic::new(MarkupError::MalformedTagGroup, text));
    }
    if let Some(Token::PlainText(last)) = tokens.last_mut() {
        last.push_str(text);
    } else {
        tokens.push(Token::PlainText(text.to_owned()));
    }
}

/// Splits a group body on whitespace and sorts each tag into its token.
/// Plain tags accumulate; each structural tag flushes them first so token
/// order matches source order.
fn consume_group(body: &str, tokens: &mut Vec<Token>) {
    let mut pending: Vec<String> = Vec::new();

    for tag in body.split_whitespace() {
        let special = classify(tag);
        if let Some(token) = special {
            if !pending.is_empty() {
                tokens.push(Token::TagGroup(std::mem::take(&mut pending)));
            }
            tokens.push(token);
        } else {
            pending.push(tag.to_owned());
        }
    }

    if !pending.is_empty() {
        tokens.push(Token::TagGroup(pending));
    }
}

/// Returns the structural token a tag maps to, or `None` for tags that go
/// through ordinary resolution. Also used on tags surfacing out of alias
/// expansion, so those follow the same shape rules as source markup.
pub(crate) fn classify(tag: &str) -> Option<Token> {
    if tag == "/" {
        return Some(Token::Clearer(None));
    }
    if let Some(target) = tag.strip_prefix('/') {
        return Some(Token::Clearer(Some(target.to_owned())));
    }

    if tag.starts_with('!') {
        if let Some(caps) = RE_MACRO.captures(tag) {
            let args = caps
                .get(2)
                .map_or_else(Vec::new, |m| m.as_str().split(':').map(str::to_owned).collect());
            return Some(Token::MacroCall {
                name: caps[1].to_owned(),
                args,
            });
        }
        return None;
    }

    if let Some(rest) = tag.strip_prefix('~') {
        if let Some((protocol, uri)) = rest.split_once("://") {
            if !protocol.is_empty() && !uri.is_empty() {
                return Some(Token::Link {
                    protocol: protocol.to_owned(),
                    uri: uri.to_owned(),
                });
            }
        }
        return None;
    }

    if let Some(body) = tag.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        if let Some((x, y)) = body.split_once(';') {
            if let (Ok(x), Ok(y)) = (x.parse(), y.parse()) {
                return Some(Token::Position(x, y));
            }
        }
        return None;
    }

    None
}

/// Escapes markup so that parsing it reproduces `text` verbatim: every
/// would-be group gains one leading backslash.
#[must_use]
pub fn escape(text: &str) -> String {
    RE_MARKUP
        .replace_all(text, |caps: &regex::Captures<'_>| format!("\\{}", &caps[0]))
        .into_owned()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
