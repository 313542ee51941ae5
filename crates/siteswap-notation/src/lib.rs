//! Siteswap notation parser, formatter and evaluator
//!
//! This crate reads the full multi-juggler siteswap notation into a syntax
//! tree, formats trees back to compact text, and evaluates them into
//! [`siteswap_core::Siteswap`] patterns.
//!
//! # Examples
//!
//! ```
//! use siteswap_notation::{parse, parse_siteswap, format};
//!
//! // Parse to a tree and format it back
//! let ast = parse("{0, 0.5} <3.5p | 3.5px>").unwrap();
//! assert_eq!(format(&ast), "{0,0.5}<3.5p|3.5px>");
//!
//! // Parse straight to a validated pattern
//! let pattern = parse_siteswap("(6,4)(6x,4)*").unwrap();
//! assert!(pattern.is_valid());
//! assert_eq!(pattern.period(), 8);
//! ```
//!
//! # Notation Syntax
//!
//! - Heights: `0-9`, `a-z` (10 to 35), optionally with a fraction: `3.5`
//! - Modifiers: `x` crossing, `p` pass, `pB` pass to juggler B
//! - Multiplex: `[43]`
//! - Sync beats: `(4,4x)`, with `!` removing the implied rest beat
//! - Hand prefixes: `L3`, `R3`
//! - Mirror repeat: `(6,4)*`
//! - Jugglers: `<3p33|3p33>`, with delays `{0,0.5}<...>`
//!
//! # Main Functions
//!
//! - [`parse`]: Parse notation to a syntax tree
//! - [`evaluate`]: Build a pattern from a syntax tree
//! - [`format()`]: Format a syntax tree back to notation
//! - [`parse_siteswap`], [`parse_vanilla`], [`parse_stack`], [`parse_khss`]

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod formatter;
pub mod lexer;
pub mod parser;
pub mod span;


pub use ast::{BeatNode, GroupNode, JugglerNode, PatternNode, ThrowNode};
pub use error::{ParseError, Result};
pub use evaluator::evaluate;
pub use formatter::format;
pub use lexer::{Lexer, Token};
pub use parser::{parse, parse_khss, parse_siteswap, parse_stack, parse_vanilla, Parser};
pub use span::Span;
