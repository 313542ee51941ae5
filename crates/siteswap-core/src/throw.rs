//! Throws, beats and per-juggler beat sequences.

use crate::encoding::{float_to_ss, to_letter};
use crate::fraction::{fix_fraction, unfix_fraction};
use crate::hand::{Hand, Position};
use serde::Serialize;
use std::fmt;

fn is_even(height: f64) -> bool {
    height % 2.0 == 0.0
}

/// A single object's flight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Throw {
    /// Height as written, at most two decimals
    pub displayed_height: f64,
    /// Height snapped to an exact fraction
    pub height: f64,
    /// Height came from text, so `.3` and `.6` may stand for thirds
    #[serde(skip)]
    pub written: bool,
    pub x: bool,
    pub pass: bool,
    /// Explicit recipient; relative passes go to the next juggler
    pub pass_to: Option<usize>,
}

impl Throw {
    pub fn new(height: f64, x: bool, pass: bool, pass_to: Option<usize>) -> Self {
        Throw {
            displayed_height: height,
            height: fix_fraction(height, false),
            written: true,
            x,
            pass,
            pass_to,
        }
    }

    /// Plain self throw
    pub fn self_throw(height: f64) -> Self {
        Throw::new(height, false, false, None)
    }

    /// The throw that travels from `start` to `end` with the given exact height.
    pub fn between(start: Position, end: Position, height: f64, num_jugglers: usize) -> Self {
        let pass = start.juggler != end.juggler;
        let swaps = start.hand != end.hand;
        let relative = (start.juggler + 1) % num_jugglers.max(1);
        Throw {
            displayed_height: unfix_fraction(height),
            height,
            written: false,
            x: if pass { !swaps } else { swaps == is_even(height) },
            pass,
            pass_to: (pass && end.juggler != relative).then_some(end.juggler),
        }
    }

    /// Re-read the written height with `.3`/`.6` taken as thirds. Exact
    /// heights are left alone.
    pub fn unlock_thirds(&mut self) {
        if self.written {
            self.height = fix_fraction(self.displayed_height, true);
        }
    }

    /// Passes swap hands unless marked `x`; self throws swap when an even
    /// height is marked `x` or an odd one is not.
    pub fn crosses_hands(&self) -> bool {
        if self.pass {
            !self.x
        } else {
            is_even(self.height) == self.x
        }
    }

    pub fn landing_juggler(&self, juggler: usize, num_jugglers: usize) -> usize {
        match self.pass_to {
            Some(to) => to,
            None if self.pass => (juggler + 1) % num_jugglers.max(1),
            None => juggler,
        }
    }
}

impl fmt::Display for Throw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match float_to_ss(self.displayed_height) {
            Ok(symbol) => f.write_str(&symbol)?,
            // Heights past `z` have no symbol
            Err(_) => write!(f, "{}", unfix_fraction(self.displayed_height))?,
        }
        if self.pass {
            f.write_str("p")?;
        }
        if self.x {
            f.write_str("x")?;
        }
        if let Some(to) = self.pass_to {
            write!(f, "{}", to_letter(to, 'A'))?;
        }
        Ok(())
    }
}

/// One time step for one juggler. Each hand holds a multiplex of throws.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct JugglerBeat {
    pub left: Vec<Throw>,
    pub right: Vec<Throw>,
}

impl JugglerBeat {
    pub fn new(left: Vec<Throw>, right: Vec<Throw>) -> Self {
        JugglerBeat { left, right }
    }

    /// A beat with `throws` in one hand only
    pub fn in_hand(hand: Hand, throws: Vec<Throw>) -> Self {
        match hand {
            Hand::Left => JugglerBeat::new(throws, Vec::new()),
            Hand::Right => JugglerBeat::new(Vec::new(), throws),
        }
    }

    pub fn throws(&self, hand: Hand) -> &[Throw] {
        match hand {
            Hand::Left => &self.left,
            Hand::Right => &self.right,
        }
    }

    pub fn throws_mut(&mut self, hand: Hand) -> &mut Vec<Throw> {
        match hand {
            Hand::Left => &mut self.left,
            Hand::Right => &mut self.right,
        }
    }

    pub fn all_throws(&self) -> impl Iterator<Item = &Throw> {
        self.left.iter().chain(self.right.iter())
    }

    pub fn is_sync(&self) -> bool {
        !self.left.is_empty() && !self.right.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    pub fn is_async(&self) -> bool {
        !self.is_sync() && !self.is_empty()
    }

    pub fn multiplex(&self) -> usize {
        self.left.len().max(self.right.len())
    }

    pub fn has_pass(&self) -> bool {
        self.all_throws().any(|th| th.pass)
    }

    pub fn flip(&self) -> Self {
        JugglerBeat::new(self.right.clone(), self.left.clone())
    }

    /// Render the beat, given the hand a bare throw would be assigned to.
    pub fn to_notation(&self, next_hand: Hand) -> String {
        let left = render_group(&self.left);
        let right = render_group(&self.right);
        match (left.is_empty(), right.is_empty()) {
            (false, false) => format!("({},{})", left, right),
            (false, true) if next_hand == Hand::Left => left,
            (false, true) => format!("L{}", left),
            (true, false) if next_hand == Hand::Right => right,
            (true, false) => format!("R{}", right),
            (true, true) => String::new(),
        }
    }
}

fn render_group(throws: &[Throw]) -> String {
    let mut joined = String::new();
    for th in throws {
        let text = th.to_string();
        // Heights `p` and `x` would otherwise read as modifiers
        if !joined.is_empty() && text.starts_with(['p', 'x']) {
            joined.push(' ');
        }
        joined.push_str(&text);
    }
    if throws.len() > 1 {
        format!("[{}]", joined)
    } else {
        joined
    }
}

/// Input for [`JugglerBeats::new`]: a beat with its hands decided, or bare
/// throws whose hand follows from the previous beat.
#[derive(Debug, Clone, PartialEq)]
pub enum BeatSpec {
    Beat(JugglerBeat),
    Throws(Vec<Throw>),
}

/// One juggler's sequence of beats; its length is the period.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct JugglerBeats {
    beats: Vec<JugglerBeat>,
}

impl JugglerBeats {
    /// Bare throws go to the left hand only after an asynchronous right-hand
    /// beat; otherwise, including at the start and after sync beats, to the
    /// right. With `repeat_flipped` the sequence is followed by its mirror.
    pub fn new(specs: Vec<BeatSpec>, repeat_flipped: bool) -> Self {
        let mut beats: Vec<JugglerBeat> = Vec::with_capacity(specs.len());
        for spec in specs {
            let beat = match spec {
                BeatSpec::Beat(beat) => beat,
                BeatSpec::Throws(throws) => {
                    let after_right = beats
                        .last()
                        .map_or(false, |prev| prev.is_async() && !prev.right.is_empty());
                    let hand = if after_right { Hand::Left } else { Hand::Right };
                    JugglerBeat::in_hand(hand, throws)
                }
            };
            beats.push(beat);
        }
        if repeat_flipped {
            let mirrored: Vec<_> = beats.iter().map(JugglerBeat::flip).collect();
            beats.extend(mirrored);
        }
        JugglerBeats { beats }
    }

    pub fn from_beats(beats: Vec<JugglerBeat>) -> Self {
        JugglerBeats { beats }
    }

    pub fn beats(&self) -> &[JugglerBeat] {
        &self.beats
    }

    pub fn beats_mut(&mut self) -> &mut [JugglerBeat] {
        &mut self.beats
    }

    pub fn len(&self) -> usize {
        self.beats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beats.is_empty()
    }

    pub fn flip(&self) -> Self {
        JugglerBeats {
            beats: self.beats.iter().map(JugglerBeat::flip).collect(),
        }
    }
}

/// A free-standing empty beat is written as a `0` rest, which the reader
/// places in the next hand; beats after it are prefixed to keep their hands.
/// A space is kept wherever the next beat would otherwise be read as part of
/// the throw before it.
impl fmt::Display for JugglerBeats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut after_right = false;
        let mut prev_sync = false;
        // Last beat was one bare throw; `true` if it is a pass with no recipient
        let mut open_throw: Option<bool> = None;
        for beat in &self.beats {
            let hand = if after_right { Hand::Left } else { Hand::Right };
            if beat.is_empty() {
                // The beat after a sync beat is implied
                if prev_sync {
                    after_right = false;
                    open_throw = None;
                } else {
                    f.write_str("0")?;
                    after_right = hand == Hand::Right;
                    open_throw = Some(false);
                }
                prev_sync = false;
                continue;
            }
            if prev_sync {
                f.write_str("!")?;
            }
            let text = beat.to_notation(hand);
            let joins = match (open_throw, text.chars().next()) {
                (Some(_), Some('p' | 'x')) => true,
                (Some(bare_pass), Some(c)) if c.is_ascii_uppercase() => bare_pass,
                _ => false,
            };
            if joins {
                f.write_str(" ")?;
            }
            f.write_str(&text)?;
            prev_sync = beat.is_sync();
            after_right = beat.is_async() && !beat.right.is_empty();
            open_throw = match beat.all_throws().collect::<Vec<_>>().as_slice() {
                [th] => Some(th.pass && th.pass_to.is_none()),
                _ => None,
            };
        }
        if prev_sync {
            f.write_str("!")?;
        }
        Ok(())
    }
}
