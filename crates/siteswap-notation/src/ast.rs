use crate::span::Span;
use serde::{Deserialize, Serialize};
use siteswap_core::Hand;

/// A whole pattern: optional delays and one or more jugglers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternNode {
    pub delays: Option<Vec<f64>>,
    pub jugglers: Vec<JugglerNode>,
    /// Written as `<..>` rather than a bare juggler
    pub bracketed: bool,
    pub span: Span,
}

/// One juggler's beats; `*` repeats them mirrored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JugglerNode {
    pub beats: Vec<BeatNode>,
    pub repeat_flipped: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BeatNode {
    /// `(left,right)`, with `!` cancelling the implied empty beat after it
    Sync {
        left: GroupNode,
        right: GroupNode,
        bang: bool,
        span: Span,
    },
    /// A single hand's throws, with an optional `L`/`R` prefix
    Async {
        hand: Option<Hand>,
        group: GroupNode,
        span: Span,
    },
}

impl BeatNode {
    pub fn span(&self) -> Span {
        match self {
            BeatNode::Sync { span, .. } | BeatNode::Async { span, .. } => *span,
        }
    }
}

/// A throw, or `[..]` for several from one hand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupNode {
    pub throws: Vec<ThrowNode>,
    pub multiplex: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThrowNode {
    pub height: f64,
    pub pass: bool,
    pub x: bool,
    pub recipient: Option<char>,
    pub span: Span,
}
