use serde::{Deserialize, Serialize};
use std::fmt;

/// One of a juggler's two hands. Converts to `0`/`1` so a flip is `1 - hand`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Hand {
    Right = 0,
    Left = 1,
}

impl Hand {
    /// Both hands in slot order
    pub const BOTH: [Hand; 2] = [Hand::Right, Hand::Left];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Self {
        if index % 2 == 0 {
            Hand::Right
        } else {
            Hand::Left
        }
    }

    pub fn other(self) -> Self {
        match self {
            Hand::Right => Hand::Left,
            Hand::Left => Hand::Right,
        }
    }

    pub fn flip_if(self, flip: bool) -> Self {
        if flip {
            self.other()
        } else {
            self
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hand::Right => write!(f, "R"),
            Hand::Left => write!(f, "L"),
        }
    }
}

/// A throw/catch slot: juggler, beat relative to the pattern start, hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub juggler: usize,
    pub time: usize,
    pub hand: Hand,
}

impl Position {
    pub fn new(juggler: usize, time: usize, hand: Hand) -> Self {
        Position {
            juggler,
            time,
            hand,
        }
    }

    pub fn shifted(self, by: usize) -> Self {
        Position {
            time: self.time + by,
            ..self
        }
    }
}

/// Every slot ordered by juggler, then time, then hand (right first).
pub fn all_positions(num_jugglers: usize, length: usize) -> impl Iterator<Item = Position> {
    (0..num_jugglers).flat_map(move |juggler| {
        (0..length).flat_map(move |time| {
            Hand::BOTH
                .into_iter()
                .map(move |hand| Position::new(juggler, time, hand))
        })
    })
}
