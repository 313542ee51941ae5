//! Core types and algorithms for siteswap juggling patterns
//!
//! This crate models patterns for any number of jugglers, checks that they can
//! actually be juggled, and works with the states they leave objects in. It
//! does not parse the full notation; see `siteswap-notation` for that.
//!
//! # Examples
//!
//! ```
//! use siteswap_core::{Siteswap, VanillaSiteswap};
//!
//! let vanilla = VanillaSiteswap::parse("531").unwrap();
//! let pattern = Siteswap::from_vanilla(&vanilla).unwrap();
//! assert!(pattern.is_valid());
//! assert_eq!(pattern.num_objects(), 3);
//!
//! // Spread the same throws over two jugglers
//! let passing = Siteswap::from_khss(&VanillaSiteswap::parse("7").unwrap(), 4).unwrap();
//! assert_eq!(passing.to_string(), "{0,0.5}<3.5p|3.5px>");
//! ```
//!
//! # Main Components
//!
//! - **Siteswap**: a validated multi-juggler pattern and its statistics
//! - **State**: where objects will land, and transitions between states
//! - **VanillaSiteswap**: the single-juggler, height-only special case
//! - **Jif**: the event-based interchange format

pub mod encoding;
pub mod error;
pub mod fraction;
pub mod hand;
pub mod jif;
pub mod khss;
pub mod siteswap;
pub mod state;
pub mod throw;
pub mod transition;
pub mod vanilla;

pub use error::{Result, SiteswapError, ValidationError};
pub use fraction::Fraction;
pub use hand::{Hand, Position};
pub use jif::{Jif, JifOptions};
pub use siteswap::Siteswap;
pub use state::{JugglerState, JugglerStateBeat, State};
pub use throw::{BeatSpec, JugglerBeat, JugglerBeats, Throw};
pub use transition::{all_transitions_of_length, shortest_transition, Transitions};
pub use vanilla::{VanillaSiteswap, VanillaState, VanillaTransitions};
