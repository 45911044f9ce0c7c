//! # tim-color — terminal color model
//!
//! Colors as markup sees them: parse the literal forms (`141`, `@60`,
//! `255;0;0`, `#ff7f50`, `skyblue`), resolve everything to RGB, and
//! degrade gracefully to whatever palette the terminal actually has.
//!
//! # Architecture
//!
//! ```text
//! literal ("@#ff7f50", "141m", "coral")
//!     │
//!     ▼
//! color.rs:    parse into Color { value, background }
//!     │
//!     ▼
//! system.rs:   ColorSystem tier (NoColor < Standard < EightBit < True),
//!              detected from the environment or forced
//!     │
//!     ▼
//! palette.rs:  xterm tables, cube quantization, redmean nearest-match
//! contrast.rs: WCAG luminance, CIE L* brightness, readable foregrounds
//! ```
//!
//! Degradation is pure math and happens at emission time, so a parsed
//! color keeps its full fidelity until the moment it becomes bytes.

// The main types live in modules sharing their name and are re-exported
// at the root.
#![allow(clippy::module_name_repetitions)]

pub mod color;
pub mod contrast;
pub mod named;
pub mod palette;
pub mod system;

pub use color::{Color, ColorError, ColorValue};
pub use system::ColorSystem;
