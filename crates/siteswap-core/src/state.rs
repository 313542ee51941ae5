//! Landing schedules ("states") and the ground states patterns enter from.

use crate::error::Result;
use crate::fraction::EPS;
use crate::hand::{Hand, Position};
use crate::siteswap::Siteswap;
use crate::transition;
use serde::Serialize;
use std::fmt;

/// Objects due to land in each hand of one juggler on one beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct JugglerStateBeat {
    pub left: usize,
    pub right: usize,
}

impl JugglerStateBeat {
    pub fn new(left: usize, right: usize) -> Self {
        JugglerStateBeat { left, right }
    }

    pub fn get(&self, hand: Hand) -> usize {
        match hand {
            Hand::Left => self.left,
            Hand::Right => self.right,
        }
    }

    pub fn increment(&mut self, hand: Hand) {
        match hand {
            Hand::Left => self.left += 1,
            Hand::Right => self.right += 1,
        }
    }

    pub fn decrement(&mut self, hand: Hand) {
        match hand {
            Hand::Left => self.left = self.left.saturating_sub(1),
            Hand::Right => self.right = self.right.saturating_sub(1),
        }
    }

    pub fn total(&self) -> usize {
        self.left + self.right
    }

    pub fn is_sync(&self) -> bool {
        self.left > 0 && self.right > 0
    }

    pub fn is_empty(&self) -> bool {
        self.left == 0 && self.right == 0
    }

    pub fn flip(&self) -> Self {
        JugglerStateBeat::new(self.right, self.left)
    }

    pub fn is_less_or_equal(&self, other: &JugglerStateBeat) -> bool {
        self.left <= other.left && self.right <= other.right
    }

    /// `(left,right)` in sync form, otherwise the single count.
    pub fn to_notation(&self, sync: bool) -> String {
        if sync {
            format!("({},{})", self.left, self.right)
        } else {
            self.total().to_string()
        }
    }
}

/// One juggler's landing schedule, indexed by beats from now.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct JugglerState {
    beats: Vec<JugglerStateBeat>,
}

impl JugglerState {
    pub fn new(beats: Vec<JugglerStateBeat>) -> Self {
        JugglerState { beats }
    }

    pub fn empty(height: usize) -> Self {
        JugglerState {
            beats: vec![JugglerStateBeat::default(); height],
        }
    }

    pub fn beats(&self) -> &[JugglerStateBeat] {
        &self.beats
    }

    /// Number of retained beats
    pub fn horizon(&self) -> usize {
        self.beats.len()
    }

    pub fn remove_trailing_zeros(&mut self) {
        while self.beats.last().map_or(false, JugglerStateBeat::is_empty) {
            self.beats.pop();
        }
    }

    /// Never sync, and occupied beats alternate hands with an empty beat
    /// counting as a hand change. Either hand may start.
    pub fn is_pure_async(&self) -> bool {
        let mut expected: Option<Hand> = None;
        for beat in &self.beats {
            if beat.is_sync() {
                return false;
            }
            let hand = if beat.left > 0 {
                Some(Hand::Left)
            } else if beat.right > 0 {
                Some(Hand::Right)
            } else {
                None
            };
            if let (Some(hand), Some(want)) = (hand, expected) {
                if hand != want {
                    return false;
                }
            }
            expected = hand.or(expected).map(Hand::other);
        }
        true
    }

    pub fn flip(&self) -> Self {
        JugglerState {
            beats: self.beats.iter().map(JugglerStateBeat::flip).collect(),
        }
    }
}

impl fmt::Display for JugglerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sync = !self.is_pure_async();
        for beat in &self.beats {
            f.write_str(&beat.to_notation(sync))?;
        }
        Ok(())
    }
}

/// Landing schedule of every juggler, plus the jugglers' phase delays.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct State {
    jugglers: Vec<JugglerState>,
    delays: Vec<f64>,
}

impl State {
    /// Build a state, dropping trailing empty beats. Missing delays are zero.
    pub fn new(jugglers: Vec<JugglerState>, delays: Option<Vec<f64>>) -> Self {
        let delays = delays.unwrap_or_else(|| vec![0.0; jugglers.len()]);
        let mut state = State { jugglers, delays };
        state.trim();
        state
    }

    /// An all-zero grid of `height` beats per juggler, kept untrimmed.
    pub fn empty(num_jugglers: usize, height: usize) -> Self {
        State {
            jugglers: vec![JugglerState::empty(height); num_jugglers],
            delays: vec![0.0; num_jugglers],
        }
    }

    /// The canonical state for `num_objects` objects. Objects are shared out
    /// as evenly as possible, lower-numbered jugglers taking the remainder.
    /// Async ground states alternate hands starting left; sync ones catch in
    /// both hands every other beat, an odd object going to the right hand.
    pub fn ground(num_objects: usize, sync: bool, num_jugglers: usize) -> Self {
        let num_jugglers = num_jugglers.max(1);
        let base = num_objects / num_jugglers;
        let extra = num_objects % num_jugglers;
        let jugglers = (0..num_jugglers)
            .map(|j| {
                let n = if j < extra { base + 1 } else { base };
                let mut state = JugglerState::empty(n);
                if sync {
                    for t in (0..n).step_by(2) {
                        state.beats[t].increment(Hand::Right);
                        if n % 2 == 0 || t != n - 1 {
                            state.beats[t].increment(Hand::Left);
                        }
                    }
                } else {
                    let mut hand = Hand::Left;
                    for beat in state.beats.iter_mut() {
                        beat.increment(hand);
                        hand = hand.other();
                    }
                }
                state
            })
            .collect();
        State::new(jugglers, None)
    }

    pub fn with_delays(mut self, delays: Vec<f64>) -> Self {
        self.delays = delays;
        self
    }

    pub fn jugglers(&self) -> &[JugglerState] {
        &self.jugglers
    }

    pub fn delays(&self) -> &[f64] {
        &self.delays
    }

    pub fn num_jugglers(&self) -> usize {
        self.jugglers.len()
    }

    pub fn num_objects(&self) -> usize {
        self.jugglers
            .iter()
            .flat_map(|j| j.beats.iter())
            .map(JugglerStateBeat::total)
            .sum()
    }

    /// Longest horizon over all jugglers
    pub fn max_height(&self) -> usize {
        self.jugglers.iter().map(JugglerState::horizon).max().unwrap_or(0)
    }

    /// Pure async jugglers, horizons within one beat of each other, and one
    /// object on every retained beat.
    pub fn is_ground(&self) -> bool {
        let min = self.jugglers.iter().map(JugglerState::horizon).min().unwrap_or(0);
        self.max_height() - min <= 1
            && self.jugglers.iter().all(|j| {
                j.is_pure_async() && j.beats.iter().all(|beat| beat.total() == 1)
            })
    }

    pub fn trim(&mut self) {
        for juggler in &mut self.jugglers {
            juggler.remove_trailing_zeros();
        }
    }

    /// Count at a slot; anything past the horizon is empty.
    pub fn at(&self, position: Position) -> usize {
        self.jugglers
            .get(position.juggler)
            .and_then(|j| j.beats.get(position.time))
            .map_or(0, |beat| beat.get(position.hand))
    }

    /// Add one object at a slot, extending the horizon if needed.
    pub fn inc(&mut self, position: Position) {
        if let Some(juggler) = self.jugglers.get_mut(position.juggler) {
            if juggler.beats.len() <= position.time {
                juggler.beats.resize(position.time + 1, JugglerStateBeat::default());
            }
            juggler.beats[position.time].increment(position.hand);
        }
    }

    pub fn dec(&mut self, position: Position) {
        if let Some(beat) = self
            .jugglers
            .get_mut(position.juggler)
            .and_then(|j| j.beats.get_mut(position.time))
        {
            beat.decrement(position.hand);
        }
    }

    /// Every juggler's beat at `time`, empty past each horizon.
    pub fn global_state_beat(&self, time: usize) -> Vec<JugglerStateBeat> {
        self.jugglers
            .iter()
            .map(|j| j.beats.get(time).copied().unwrap_or_default())
            .collect()
    }

    pub fn flip(&self) -> Self {
        State {
            jugglers: self.jugglers.iter().map(JugglerState::flip).collect(),
            delays: self.delays.clone(),
        }
    }

    pub(crate) fn same_delays(&self, other: &State) -> bool {
        self.delays.len() == other.delays.len()
            && self
                .delays
                .iter()
                .zip(&other.delays)
                .all(|(a, b)| (a - b).abs() < EPS)
    }

    fn ground_like(&self, sync: bool) -> State {
        State::ground(self.num_objects(), sync, self.num_jugglers()).with_delays(self.delays.clone())
    }

    /// Shortest way into this state, from `from` or the matching ground state.
    pub fn entry(&self, from: Option<&State>, sync: bool, allow_flip: bool) -> Result<Siteswap> {
        match from {
            Some(from) => transition::shortest_transition(from, self, allow_flip),
            None => transition::shortest_transition(&self.ground_like(sync), self, allow_flip),
        }
    }

    /// Shortest way out of this state, to `to` or the matching ground state.
    pub fn exit(&self, to: Option<&State>, sync: bool, allow_flip: bool) -> Result<Siteswap> {
        match to {
            Some(to) => transition::shortest_transition(self, to, allow_flip),
            None => transition::shortest_transition(self, &self.ground_like(sync), allow_flip),
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.jugglers.len() == 1 {
            return write!(f, "{}", self.jugglers[0]);
        }
        let parts: Vec<String> = self.jugglers.iter().map(|j| j.to_string()).collect();
        write!(f, "<{}>", parts.join("|"))
    }
}
