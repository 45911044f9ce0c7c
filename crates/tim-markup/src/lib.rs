//! # tim-markup — the tim terminal markup engine
//!
//! Parses the tim markup language (`[bold 141]like this[/]`) into
//! terminal-ready ANSI strings. Tags style text, clear state, call text
//! macros, open hyperlinks and move the cursor; everything resolves against
//! a shared, mutable [`MarkupContext`].
//!
//! # Architecture
//!
//! ```text
//! markup string
//!     │
//!     ▼
//! tokenizer.rs: regex scan into tokens (innermost group wins, escapes)
//!     │
//!     ▼
//! resolver.rs:  tag text → meaning (styles, colors, aliases, clearers)
//!     │
//!     ▼
//! compiler.rs:  forward pass; macros transform text runs, styles diff
//!     │         against the last emitted state (ansi.rs), colors degrade
//!     │         to the context's color system (tim-color)
//!     ▼
//! StyledText:   ansi + plain + tokens + diagnostics
//! ```
//!
//! Parses are total: malformed input degrades to literal text or dropped
//! tags, each with a [`Diagnostic`] attached to the result. The context
//! caches compiled results and invalidates them whenever its state moves.
//!
//! # Example
//!
//! ```
//! use tim_color::ColorSystem;
//! use tim_markup::MarkupContext;
//!
//! let ctx = MarkupContext::with_color_system(ColorSystem::True);
//! let styled = ctx.parse("[bold 141]tim[/fg] engine");
//!
//! assert_eq!(styled.plain, "tim engine");
//! assert_eq!(styled.ansi, "\x1b[1;38;5;141mtim\x1b[39m engine\x1b[0m");
//! ```

// The main types live in modules sharing their name and are re-exported
// at the root.
#![allow(clippy::module_name_repetitions)]

mod ansi;
mod compiler;
pub mod context;
pub mod diagnostics;
pub mod macros;
mod resolver;
pub mod style;
pub mod styled;
pub mod token;
pub mod tokenizer;

pub use context::MarkupContext;
pub use diagnostics::{Diagnostic, MarkupError};
pub use macros::MacroFn;
pub use style::{Attributes, Style};
pub use styled::StyledText;
pub use token::Token;
pub use tokenizer::{escape, tokenize};
