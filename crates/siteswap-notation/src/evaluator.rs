// Evaluator: build core patterns from the syntax tree
use crate::ast::*;
use siteswap_core::encoding::from_letter;
use siteswap_core::{BeatSpec, JugglerBeat, JugglerBeats, Siteswap, Throw};
use tracing::debug;

/// Build a pattern from a parsed tree. Validation happens in the core; read
/// the outcome from [`Siteswap::is_valid`].
pub fn evaluate(ast: &PatternNode) -> Siteswap {
    let jugglers: Vec<JugglerBeats> = ast.jugglers.iter().map(evaluate_juggler).collect();
    let siteswap = Siteswap::new(jugglers, ast.delays.clone());
    debug!(
        pattern = %siteswap,
        valid = siteswap.is_valid(),
        "evaluated pattern"
    );
    siteswap
}

fn evaluate_juggler(juggler: &JugglerNode) -> JugglerBeats {
    let mut specs = Vec::with_capacity(juggler.beats.len());
    for beat in &juggler.beats {
        match beat {
            BeatNode::Sync { left, right, bang, .. } => {
                specs.push(BeatSpec::Beat(JugglerBeat::new(
                    evaluate_group(left),
                    evaluate_group(right),
                )));
                // A sync beat implies an empty beat after it unless cancelled
                if !bang {
                    specs.push(BeatSpec::Beat(JugglerBeat::default()));
                }
            }
            BeatNode::Async { hand: Some(hand), group, .. } => {
                specs.push(BeatSpec::Beat(JugglerBeat::in_hand(*hand, evaluate_group(group))));
            }
            BeatNode::Async { hand: None, group, .. } => {
                specs.push(BeatSpec::Throws(evaluate_group(group)));
            }
        }
    }
    JugglerBeats::new(specs, juggler.repeat_flipped)
}

fn evaluate_group(group: &GroupNode) -> Vec<Throw> {
    group.throws.iter().map(evaluate_throw).collect()
}

fn evaluate_throw(throw: &ThrowNode) -> Throw {
    Throw::new(
        throw.height,
        throw.x,
        throw.pass,
        throw.recipient.map(|c| from_letter(c, 'A')),
    )
}
