// SPDX-License-Identifier: MIT
//
// Tag resolution: from tag text to meaning.
//
// A tag out of a group resolves in a fixed order: structural shape first
// (clearer, macro, link, position, for tags re-entering through an alias),
// then style keyword, the `#auto` pseudo tag, color syntax, and finally the
// alias table. Whatever matches first wins; nothing matching is reported as
// an unknown tag and dropped.
//
// Aliases expand recursively with a shared depth cap, so a cyclic alias
// table degrades into a diagnostic instead of a hang.

use rustc_hash::FxHashMap;
use tim_color::{Color, ColorError};

use crate::diagnostics::{Diagnostic, MarkupError};
use crate::style::Attributes;
use crate::token::Token;
use crate::tokenizer::classify;

/// Recursion limit shared by alias expansion and macro re-scanning.
pub(crate) const MAX_DEPTH: usize = 32;

/// What one applied tag does to the compile state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TagMeaning {
    Attributes(Attributes),
    SetColor(Color),
    /// Defer foreground choice to the end of the group, then pick a
    /// contrasting color for the background in effect.
    AutoForeground,
    Clear(Clear),
    ActivateMacro { name: String, args: Vec<String> },
    OpenLink(String),
    MoveCursor(i32, i32),
}

/// The scope of one clearing tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Clear {
    /// `[/]`: attributes, colors, link and all active macros.
    All,
    Attributes(Attributes),
    Foreground,
    Background,
    /// `[/~]`
    Link,
    /// `[/!]`
    AllMacros,
    /// `[/!name]`, oldest activation first.
    Macro(String),
}

/// Resolves one tag into zero or more meanings. `depth` counts alias hops.
pub(crate) fn resolve_tag(
    tag: &str,
    aliases: &FxHashMap<String, String>,
    depth: usize,
    out: &mut Vec<TagMeaning>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if depth > MAX_DEPTH {
        diagnostics.push(Diagnostic::new(
            MarkupError::AliasCycleExceeded(MAX_DEPTH),
            tag,
        ));
        return;
    }

    // Alias values are whole tags, so expansion can surface any shape the
    // tokenizer itself would have produced.
    match classify(tag) {
        Some(Token::Clearer(target)) => {
            resolve_clearer(target.as_deref(), aliases, depth, out, diagnostics);
            return;
        }
        Some(Token::MacroCall { name, args }) => {
            out.push(TagMeaning::ActivateMacro { name, args });
            return;
        }
        Some(Token::Link { protocol, uri }) => {
            out.push(TagMeaning::OpenLink(format!("{protocol}://{uri}")));
            return;
        }
        Some(Token::Position(x, y)) => {
            out.push(TagMeaning::MoveCursor(x, y));
            return;
        }
        _ => {}
    }

    if let Some(flag) = Attributes::from_keyword(tag) {
        out.push(TagMeaning::Attributes(flag));
        return;
    }

    if tag == "#auto" {
        out.push(TagMeaning::AutoForeground);
        return;
    }

    match Color::parse(tag) {
        Ok(color) => {
            out.push(TagMeaning::SetColor(color));
            return;
        }
        Err(ColorError::OutOfRange(_)) => {
            // Committed color syntax with a bad component, e.g. `#ab` or
            // `256`. Report it rather than silently trying the alias table.
            diagnostics.push(Diagnostic::new(MarkupError::InvalidColorLiteral, tag));
            return;
        }
        Err(_) => {}
    }

    if let Some(value) = aliases.get(tag) {
        for sub in value.split_whitespace() {
            resolve_tag(sub, aliases, depth + 1, out, diagnostics);
        }
        return;
    }

    diagnostics.push(Diagnostic::new(MarkupError::UnknownTag, tag));
}

/// Resolves a `/`-prefixed tag. Builtin scopes are checked before the alias
/// table, so a user alias can never shadow `/fg` or `/bold`; a target that is
/// neither builtin nor aliased but parses as a color clears that color's
/// channel, which is what makes `[/blue]` undo `[blue]`.
pub(crate) fn resolve_clearer(
    target: Option<&str>,
    aliases: &FxHashMap<String, String>,
    depth: usize,
    out: &mut Vec<TagMeaning>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(rest) = target else {
        out.push(TagMeaning::Clear(Clear::All));
        return;
    };

    match rest {
        "~" => {
            out.push(TagMeaning::Clear(Clear::Link));
            return;
        }
        "!" => {
            out.push(TagMeaning::Clear(Clear::AllMacros));
            return;
        }
        "fg" => {
            out.push(TagMeaning::Clear(Clear::Foreground));
            return;
        }
        "bg" => {
            out.push(TagMeaning::Clear(Clear::Background));
            return;
        }
        _ => {}
    }

    if let Some(name) = rest.strip_prefix('!') {
        let name = name.split('(').next().unwrap_or(name);
        out.push(TagMeaning::Clear(Clear::Macro(name.to_owned())));
        return;
    }

    if let Some(flag) = Attributes::from_keyword(rest) {
        out.push(TagMeaning::Clear(Clear::Attributes(flag)));
        return;
    }

    if let Some(value) = aliases.get(&format!("/{rest}")) {
        for sub in value.split_whitespace() {
            resolve_tag(sub, aliases, depth + 1, out, diagnostics);
        }
        return;
    }

    if let Ok(color) = Color::parse(rest) {
        let scope = if color.background {
            Clear::Background
        } else {
            Clear::Foreground
        };
        out.push(TagMeaning::Clear(scope));
        return;
    }

    diagnostics.push(Diagnostic::new(MarkupError::UnknownTag, format!("/{rest}")));
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn resolve(tag: &str, aliases: &FxHashMap<String, String>) -> (Vec<TagMeaning>, Vec<Diagnostic>) {
        let mut out = Vec::new();
        let mut diagnostics = Vec::new();
        resolve_tag(tag, aliases, 0, &mut out, &mut diagnostics);
        (out, diagnostics)
    }

    fn no_aliases() -> FxHashMap<String, String> {
        FxHashMap::default()
    }

    // ── Direct tags ──

    #[test]
    fn style_keywords_resolve_to_flags() {
        let (out, diagnostics) = resolve("bold", &no_aliases());
        assert_eq!(out, vec![TagMeaning::Attributes(Attributes::BOLD)]);
        assert_eq!(diagnostics, vec![]);
    }

    #[test]
    fn colors_resolve_through_the_color_parser() {
        let (out, _) = resolve("@60", &no_aliases());
        assert_eq!(
            out,
            vec![TagMeaning::SetColor(
                Color::from_indexed(60).with_background(true)
            )],
        );
    }

    #[test]
    fn auto_pseudo_tag_defers() {
        let (out, _) = resolve("#auto", &no_aliases());
        assert_eq!(out, vec![TagMeaning::AutoForeground]);
    }

    #[test]
    fn committed_color_syntax_reports_bad_components() {
        let (out, diagnostics) = resolve("#ab", &no_aliases());
        assert_eq!(out, vec![]);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::new(MarkupError::InvalidColorLiteral, "#ab")],
        );

        let (_, diagnostics) = resolve("256", &no_aliases());
        assert_eq!(diagnostics[0].kind, MarkupError::InvalidColorLiteral);
    }

    #[test]
    fn unknown_tags_are_reported() {
        let (out, diagnostics) = resolve("bolf", &no_aliases());
        assert_eq!(out, vec![]);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::new(MarkupError::UnknownTag, "bolf")],
        );
    }

    // ── Aliases ──

    #[test]
    fn aliases_expand_to_every_tag_they_hold() {
        let aliases: FxHashMap<String, String> =
            [("warning".to_owned(), "208 bold".to_owned())].into_iter().collect();
        let (out, diagnostics) = resolve("warning", &aliases);
        assert_eq!(
            out,
            vec![
                TagMeaning::SetColor(Color::from_indexed(208)),
                TagMeaning::Attributes(Attributes::BOLD),
            ],
        );
        assert_eq!(diagnostics, vec![]);
    }

    #[test]
    fn aliases_chain() {
        let aliases: FxHashMap<String, String> = [
            ("outer".to_owned(), "inner italic".to_owned()),
            ("inner".to_owned(), "blue".to_owned()),
        ]
        .into_iter()
        .collect();
        let (out, _) = resolve("outer", &aliases);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1], TagMeaning::Attributes(Attributes::ITALIC));
    }

    #[test]
    fn alias_values_may_hold_structural_tags() {
        let aliases: FxHashMap<String, String> = [(
            "docs".to_owned(),
            "~https://example.com underline".to_owned(),
        )]
        .into_iter()
        .collect();
        let (out, _) = resolve("docs", &aliases);
        assert_eq!(
            out,
            vec![
                TagMeaning::OpenLink("https://example.com".into()),
                TagMeaning::Attributes(Attributes::UNDERLINE),
            ],
        );
    }

    #[test]
    fn cyclic_aliases_hit_the_depth_cap() {
        let aliases: FxHashMap<String, String> = [
            ("ping".to_owned(), "pong".to_owned()),
            ("pong".to_owned(), "ping".to_owned()),
        ]
        .into_iter()
        .collect();
        let (out, diagnostics) = resolve("ping", &aliases);
        assert_eq!(out, vec![]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].kind,
            MarkupError::AliasCycleExceeded(MAX_DEPTH),
        );
    }

    // ── Clearers ──

    fn clear(target: Option<&str>, aliases: &FxHashMap<String, String>) -> Vec<TagMeaning> {
        let mut out = Vec::new();
        let mut diagnostics = Vec::new();
        resolve_clearer(target, aliases, 0, &mut out, &mut diagnostics);
        out
    }

    #[test]
    fn builtin_clearers_resolve() {
        let aliases = no_aliases();
        assert_eq!(clear(None, &aliases), vec![TagMeaning::Clear(Clear::All)]);
        assert_eq!(
            clear(Some("bold"), &aliases),
            vec![TagMeaning::Clear(Clear::Attributes(Attributes::BOLD))],
        );
        assert_eq!(
            clear(Some("fg"), &aliases),
            vec![TagMeaning::Clear(Clear::Foreground)],
        );
        assert_eq!(
            clear(Some("~"), &aliases),
            vec![TagMeaning::Clear(Clear::Link)],
        );
        assert_eq!(
            clear(Some("!"), &aliases),
            vec![TagMeaning::Clear(Clear::AllMacros)],
        );
        assert_eq!(
            clear(Some("!gradient"), &aliases),
            vec![TagMeaning::Clear(Clear::Macro("gradient".into()))],
        );
    }

    #[test]
    fn color_shaped_targets_clear_their_channel() {
        let aliases = no_aliases();
        assert_eq!(
            clear(Some("blue"), &aliases),
            vec![TagMeaning::Clear(Clear::Foreground)],
        );
        assert_eq!(
            clear(Some("@blue"), &aliases),
            vec![TagMeaning::Clear(Clear::Background)],
        );
    }

    #[test]
    fn unsetter_aliases_expand() {
        let aliases: FxHashMap<String, String> =
            [("/danger".to_owned(), "/fg /bold".to_owned())].into_iter().collect();
        assert_eq!(
            clear(Some("danger"), &aliases),
            vec![
                TagMeaning::Clear(Clear::Foreground),
                TagMeaning::Clear(Clear::Attributes(Attributes::BOLD)),
            ],
        );
    }

    #[test]
    fn unknown_clearers_are_reported() {
        let mut out = Vec::new();
        let mut diagnostics = Vec::new();
        resolve_clearer(Some("bolf"), &no_aliases(), 0, &mut out, &mut diagnostics);
        assert_eq!(out, vec![]);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::new(MarkupError::UnknownTag, "/bolf")],
        );
    }
}
