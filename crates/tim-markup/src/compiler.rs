// SPDX-License-Identifier: MIT
//
// The compiler: token stream in, ANSI and plain text out.
//
// State is a single forward pass. Tags mutate a target style; nothing is
// written until a text run arrives, at which point the writer emits one
// minimal transition sequence. Runs pass through every active macro first,
// and macro output containing markup is re-scanned in place, under a depth
// cap, with the producing macros taken out of scope so they cannot feed on
// their own output.

use std::sync::Arc;

use tim_color::contrast::contrast_foreground;
use tim_color::Color;

use crate::ansi::{cursor_to, osc8_open, StyleWriter, OSC8_CLOSE, RESET};
use crate::context::ContextInner;
use crate::diagnostics::{Diagnostic, MarkupError};
use crate::macros::MacroFn;
use crate::resolver::{resolve_clearer, resolve_tag, Clear, TagMeaning, MAX_DEPTH};
use crate::style::Style;
use crate::styled::StyledText;
use crate::token::Token;
use crate::tokenizer::tokenize_full;

/// A macro activation in effect, its definition resolved up front.
struct ActiveMacro {
    name: String,
    args: Vec<String>,
    func: MacroFn,
}

/// Compiles markup against one snapshot of context state.
pub(crate) fn compile(markup: &str, ctx: &ContextInner) -> StyledText {
    let (tokens, diagnostics) = tokenize_full(markup);

    let mut compiler = Compiler {
        ctx,
        writer: StyleWriter::new(ctx.color_system),
        target: Style::default(),
        active_macros: Vec::new(),
        link: None,
        ansi: String::new(),
        plain: String::new(),
        diagnostics,
    };
    compiler.walk(&tokens, 0);
    compiler.finish(tokens)
}

struct Compiler<'a> {
    ctx: &'a ContextInner,
    writer: StyleWriter,
    target: Style,
    active_macros: Vec<ActiveMacro>,
    link: Option<String>,
    ansi: String,
    plain: String,
    diagnostics: Vec<Diagnostic>,
}

impl Compiler<'_> {
    fn walk(&mut self, tokens: &[Token], depth: usize) {
        for token in tokens {
            match token {
                Token::PlainText(text) => self.text_run(text, depth),
                Token::TagGroup(tags) => self.apply_group(tags),
                Token::Clearer(target) => {
                    let mut meanings = Vec::new();
                    resolve_clearer(
                        target.as_deref(),
                        &self.ctx.aliases,
                        0,
                        &mut meanings,
                        &mut self.diagnostics,
                    );
                    self.apply_meanings(meanings);
                }
                Token::MacroCall { name, args } => self.activate_macro(name, args),
                Token::Position(x, y) => self.ansi.push_str(&cursor_to(*x, *y)),
                Token::Link { protocol, uri } => {
                    self.link = Some(format!("{protocol}://{uri}"));
                }
            }
        }
    }

    fn apply_group(&mut self, tags: &[String]) {
        let mut meanings = Vec::new();
        for tag in tags {
            resolve_tag(tag, &self.ctx.aliases, 0, &mut meanings, &mut self.diagnostics);
        }
        self.apply_meanings(meanings);
    }

    fn apply_meanings(&mut self, meanings: Vec<TagMeaning>) {
        let mut auto = false;
        for meaning in meanings {
            self.apply(meaning, &mut auto);
        }
        self.resolve_auto(auto);
    }

    fn apply(&mut self, meaning: TagMeaning, auto: &mut bool) {
        match meaning {
            TagMeaning::Attributes(flags) => self.target.attributes |= flags,
            TagMeaning::SetColor(color) => self.target.set_color(color),
            TagMeaning::AutoForeground => *auto = true,
            TagMeaning::Clear(clear) => self.apply_clear(clear),
            TagMeaning::ActivateMacro { name, args } => self.activate_macro(&name, &args),
            TagMeaning::OpenLink(uri) => self.link = Some(uri),
            TagMeaning::MoveCursor(x, y) => self.ansi.push_str(&cursor_to(x, y)),
        }
    }

    /// Clearing state that is not set is a no-op, never an error.
    fn apply_clear(&mut self, clear: Clear) {
        match clear {
            Clear::All => {
                self.target = Style::default();
                self.active_macros.clear();
                self.link = None;
            }
            Clear::Attributes(flags) => self.target.attributes -= flags,
            Clear::Foreground => self.target.foreground = None,
            Clear::Background => self.target.background = None,
            Clear::Link => self.link = None,
            Clear::AllMacros => self.active_macros.clear(),
            Clear::Macro(name) => {
                // Oldest matching activation goes first.
                if let Some(index) = self.active_macros.iter().position(|m| m.name == name) {
                    self.active_macros.remove(index);
                }
            }
        }
    }

    fn activate_macro(&mut self, name: &str, args: &[String]) {
        match self.ctx.macros.get(name) {
            Some(func) => self.active_macros.push(ActiveMacro {
                name: name.to_owned(),
                args: args.to_vec(),
                func: Arc::clone(func),
            }),
            None => self.diagnostics.push(Diagnostic::new(
                MarkupError::UnknownMacro,
                format!("!{name}"),
            )),
        }
    }

    /// Deferred `#auto`: once the whole group has applied, pick a readable
    /// foreground for the background in effect. An explicit foreground or a
    /// missing background makes this a no-op.
    fn resolve_auto(&mut self, auto: bool) {
        if !auto || self.target.foreground.is_some() {
            return;
        }
        let Some(background) = self.target.background else {
            return;
        };
        let (r, g, b) = contrast_foreground(background.rgb());
        self.target.foreground = Some(Color::from_rgb(r, g, b));
    }

    fn text_run(&mut self, text: &str, depth: usize) {
        if text.is_empty() {
            return;
        }
        if self.active_macros.is_empty() {
            self.emit_text(text);
            return;
        }

        let mut value = text.to_owned();
        let mut transformed = false;
        for index in 0..self.active_macros.len() {
            let active = &self.active_macros[index];
            match (active.func)(&active.args, &value) {
                Ok(output) => {
                    value = output;
                    transformed = true;
                }
                Err(reason) => {
                    let tag = format!("!{}", self.active_macros[index].name);
                    self.diagnostics
                        .push(Diagnostic::new(MarkupError::MacroFailed(reason), tag));
                }
            }
        }

        if transformed && value.contains('[') {
            if depth >= MAX_DEPTH {
                let tag = format!("!{}", self.active_macros[0].name);
                self.diagnostics.push(Diagnostic::new(
                    MarkupError::MacroRecursionExceeded(MAX_DEPTH),
                    tag,
                ));
                self.emit_text(&value);
                return;
            }

            let (sub_tokens, sub_diagnostics) = tokenize_full(&value);
            self.diagnostics.extend(sub_diagnostics);

            // The expansion runs outside the macros that produced it, or
            // they would transform their own output again.
            let saved = std::mem::take(&mut self.active_macros);
            self.walk(&sub_tokens, depth + 1);
            self.active_macros = saved;
        } else {
            self.emit_text(&value);
        }
    }

    fn emit_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.writer.transition(&mut self.ansi, &self.target);

        match &self.link {
            Some(uri) => {
                self.ansi.push_str(&osc8_open(uri));
                self.ansi.push_str(text);
                self.ansi.push_str(OSC8_CLOSE);
            }
            None => self.ansi.push_str(text),
        }
        self.plain.push_str(text);
    }

    fn finish(mut self, tokens: Vec<Token>) -> StyledText {
        if self.writer.needs_final_reset() {
            self.ansi.push_str(RESET);
        }
        StyledText {
            ansi: self.ansi,
            plain: self.plain,
            tokens,
            diagnostics: self.diagnostics,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
