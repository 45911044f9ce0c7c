// SPDX-License-Identifier: MIT
//
// Shared parse state: aliases, macro definitions, the color system, and the
// parse cache.
//
// Everything mutable sits behind one RwLock, so parses run concurrently and
// mutations are serialized. Each mutation bumps a generation counter; the
// cache remembers the generation it was filled under and empties itself the
// first time it is consulted after the counter moves. A cached entry can
// therefore never outlive the state it was compiled against.
//
// Lock order is inner before cache, everywhere.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use tim_color::{Color, ColorSystem};

use crate::compiler::compile;
use crate::macros::{builtins, MacroFn};
use crate::resolver::MAX_DEPTH;
use crate::styled::StyledText;

/// Aliases installed by [`MarkupContext::with_default_aliases`], the tag
/// vocabulary used when highlighting source code.
const DEFAULT_ALIASES: [(&str, &str); 12] = [
    ("code.str", "142"),
    ("code.multiline_str", "142"),
    ("code.keyword", "203"),
    ("code.none", "167"),
    ("code.global", "214"),
    ("code.number", "175"),
    ("code.identifier", "109"),
    ("code.name", "214"),
    ("code.comment", "240 italic"),
    ("code.builtin", "214"),
    ("code.file", "109"),
    ("code.symbol", "code.file"),
];

/// A markup language instance: the tag vocabulary, macro set and color
/// system that parses resolve against, plus a cache of their results.
///
/// Contexts are fully thread safe; share one behind an [`Arc`].
///
/// ```
/// use tim_markup::MarkupContext;
/// use tim_color::ColorSystem;
///
/// let ctx = MarkupContext::with_color_system(ColorSystem::True);
/// ctx.alias("title", "bold underline");
///
/// let styled = ctx.parse("[title]hello[/title] world");
/// assert_eq!(styled.plain, "hello world");
/// assert_eq!(styled.ansi, "\x1b[1;4mhello\x1b[0m world");
/// ```
pub struct MarkupContext {
    inner: RwLock<ContextInner>,
    cache: Mutex<ParseCache>,
}

/// The lockable part of a context. The compiler borrows this for the whole
/// of one parse, which keeps mutations out until the parse finishes.
pub(crate) struct ContextInner {
    pub(crate) aliases: FxHashMap<String, String>,
    pub(crate) macros: FxHashMap<String, MacroFn>,
    pub(crate) color_system: ColorSystem,
    pub(crate) generation: u64,
}

impl ContextInner {
    pub(crate) fn with_system(color_system: ColorSystem) -> Self {
        Self {
            aliases: FxHashMap::default(),
            macros: builtins(),
            color_system,
            generation: 0,
        }
    }
}

struct ParseCache {
    generation: u64,
    entries: FxHashMap<String, Arc<StyledText>>,
}

impl MarkupContext {
    /// A context using the color system detected from the environment.
    #[must_use]
    pub fn new() -> Self {
        Self::with_color_system(ColorSystem::detect())
    }

    /// A context pinned to one color system, environment ignored.
    #[must_use]
    pub fn with_color_system(system: ColorSystem) -> Self {
        Self {
            inner: RwLock::new(ContextInner::with_system(system)),
            cache: Mutex::new(ParseCache {
                generation: 0,
                entries: FxHashMap::default(),
            }),
        }
    }

    /// A detected-system context preloaded with the `code.*` alias group.
    #[must_use]
    pub fn with_default_aliases() -> Self {
        let ctx = Self::new();
        for (name, value) in DEFAULT_ALIASES {
            ctx.alias(name, value);
        }
        ctx
    }

    // ─── Parsing ─────────────────────────────────────────────────────────────

    /// Parses markup, serving repeats from the cache. The returned handle is
    /// shared: two calls with the same input against unchanged state yield
    /// the same allocation.
    #[must_use]
    pub fn parse(&self, markup: &str) -> Arc<StyledText> {
        let inner = self.inner.read();
        let generation = inner.generation;

        {
            let cache = self.cache.lock();
            if cache.generation == generation {
                if let Some(hit) = cache.entries.get(markup) {
                    tracing::trace!(generation, "parse cache hit");
                    return Arc::clone(hit);
                }
            }
        }

        let styled = Arc::new(compile(markup, &inner));

        let mut cache = self.cache.lock();
        if cache.generation != generation {
            cache.entries.clear();
            cache.generation = generation;
        }
        cache.entries.insert(markup.to_owned(), Arc::clone(&styled));
        tracing::trace!(generation, "stored parse");

        styled
    }

    /// Parses without touching the cache. Mostly useful for one-off inputs
    /// that would otherwise crowd it.
    #[must_use]
    pub fn parse_uncached(&self, markup: &str) -> StyledText {
        compile(markup, &self.inner.read())
    }

    /// Drops every cached parse. State mutations already do this on their
    /// own; this is for explicit memory reclamation.
    pub fn clear_cache(&self) {
        self.cache.lock().entries.clear();
        tracing::debug!("cleared parse cache");
    }

    // ─── Aliases ─────────────────────────────────────────────────────────────

    /// Registers `name` as shorthand for a space-separated tag list, along
    /// with a generated `/name` unsetter that undoes each expanded tag.
    pub fn alias(&self, name: &str, value: &str) {
        let mut inner = self.inner.write();
        let unsetter = generate_unsetter(value, &inner.aliases, &inner.macros);
        inner.aliases.insert(format!("/{name}"), unsetter);
        inner.aliases.insert(name.to_owned(), value.to_owned());
        inner.generation += 1;
        tracing::debug!(name, value, "registered alias");
    }

    /// Registers an alias without generating an unsetter.
    pub fn alias_plain(&self, name: &str, value: &str) {
        let mut inner = self.inner.write();
        inner.aliases.insert(name.to_owned(), value.to_owned());
        inner.generation += 1;
        tracing::debug!(name, value, "registered alias without unsetter");
    }

    // ─── Macros ──────────────────────────────────────────────────────────────

    /// Defines (or replaces) a macro under `name`, invoked as `[!name]`.
    /// Names only reach markup through `[a-z0-9_-]`.
    pub fn define(&self, name: &str, func: MacroFn) {
        let mut inner = self.inner.write();
        inner.macros.insert(name.to_owned(), func);
        inner.generation += 1;
        tracing::debug!(name, "defined macro");
    }

    /// [`define`](Self::define) for plain function pointers.
    pub fn define_fn(&self, name: &str, func: fn(&[String], &str) -> Result<String, String>) {
        self.define(name, Arc::new(func));
    }

    /// Removes a macro definition. Returns whether one existed.
    #[allow(clippy::must_use_candidate)] // called for the removal itself
    pub fn undefine(&self, name: &str) -> bool {
        let mut inner = self.inner.write();
        let removed = inner.macros.remove(name).is_some();
        if removed {
            inner.generation += 1;
            tracing::debug!(name, "removed macro");
        }
        removed
    }

    // ─── Color system ────────────────────────────────────────────────────────

    /// Switches the color system compiled output degrades to. A no-op when
    /// `system` is already active.
    pub fn set_color_system(&self, system: ColorSystem) {
        let mut inner = self.inner.write();
        if inner.color_system != system {
            inner.color_system = system;
            inner.generation += 1;
            tracing::debug!(?system, "switched color system");
        }
    }

    #[must_use]
    pub fn color_system(&self) -> ColorSystem {
        self.inner.read().color_system
    }

    /// The mutation counter. Moves on every state change, so equal values
    /// mean cached output is still valid.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.inner.read().generation
    }
}

impl Default for MarkupContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MarkupContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("MarkupContext")
            .field("aliases", &inner.aliases.len())
            .field("macros", &inner.macros.len())
            .field("color_system", &inner.color_system)
            .field("generation", &inner.generation)
            .finish_non_exhaustive()
    }
}

// ─── Unsetter generation ─────────────────────────────────────────────────────

/// Builds the `/name` expansion for an alias value: the value is expanded
/// through the current alias table, then each tag maps to whatever clears
/// it. Colors clear their channel; aliases, macros and everything else
/// clear by name.
fn generate_unsetter(
    value: &str,
    aliases: &FxHashMap<String, String>,
    macros: &FxHashMap<String, MacroFn>,
) -> String {
    let expanded = expand_aliases(value, aliases, 0);

    let mut parts: Vec<String> = Vec::new();
    for raw in expanded.split_whitespace() {
        let tag = match (raw.find('('), raw.contains(')')) {
            (Some(index), true) => &raw[..index],
            _ => raw,
        };

        let known_macro = tag
            .strip_prefix('!')
            .is_some_and(|name| macros.contains_key(name));

        if aliases.contains_key(tag) || known_macro {
            parts.push(format!("/{tag}"));
        } else if let Ok(color) = Color::parse(tag) {
            parts.push(if color.background { "/bg" } else { "/fg" }.to_owned());
        } else {
            parts.push(format!("/{tag}"));
        }
    }

    parts.join(" ")
}

/// Substitutes aliases in a tag list until none remain, bailing out at the
/// depth cap so cyclic tables terminate.
fn expand_aliases(value: &str, aliases: &FxHashMap<String, String>, depth: usize) -> String {
    if depth > MAX_DEPTH {
        return value.to_owned();
    }

    let mut out: Vec<String> = Vec::new();
    for tag in value.split_whitespace() {
        match aliases.get(tag) {
            Some(expansion) => out.push(expand_aliases(expansion, aliases, depth + 1)),
            None => out.push(tag.to_owned()),
        }
    }
    out.join(" ")
}

// ─── Tests ───────────────────────────────────────────────────────────────────
