//! Single-juggler, asynchronous patterns: plain height sequences.

use crate::encoding::{int_to_ss, ss_to_int};
use crate::error::{Result, SiteswapError, ValidationError};
use crate::transition::HeapPermutations;
use std::fmt;

/// Landing counts per future beat, trailing zeros trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VanillaState {
    cells: Vec<usize>,
}

impl VanillaState {
    pub fn new(mut cells: Vec<usize>) -> Self {
        while cells.last() == Some(&0) {
            cells.pop();
        }
        VanillaState { cells }
    }

    pub fn ground(num_objects: usize) -> Self {
        VanillaState::new(vec![1; num_objects])
    }

    pub fn cells(&self) -> &[usize] {
        &self.cells
    }

    pub fn num_objects(&self) -> usize {
        self.cells.iter().sum()
    }

    pub fn max_height(&self) -> usize {
        self.cells.len()
    }

    pub fn is_ground(&self) -> bool {
        self.cells.iter().all(|&c| c == 1)
    }

    fn at(&self, time: usize) -> usize {
        self.cells.get(time).copied().unwrap_or(0)
    }

    /// Shortest transition into this state, by default from the ground state.
    pub fn entry(&self, from: Option<&VanillaState>) -> Result<VanillaSiteswap> {
        match from {
            Some(from) => VanillaState::shortest_transition(from, self),
            None => VanillaState::shortest_transition(&VanillaState::ground(self.num_objects()), self),
        }
    }

    /// Shortest transition out of this state, by default to the ground state.
    pub fn exit(&self, to: Option<&VanillaState>) -> Result<VanillaSiteswap> {
        match to {
            Some(to) => VanillaState::shortest_transition(self, to),
            None => VanillaState::shortest_transition(self, &VanillaState::ground(self.num_objects())),
        }
    }

    fn check_compatible(s1: &VanillaState, s2: &VanillaState) -> Result<()> {
        if s1.num_objects() != s2.num_objects() {
            return Err(SiteswapError::ObjectCountMismatch(s1.num_objects(), s2.num_objects()));
        }
        Ok(())
    }

    /// After `shift` beats, every landing still scheduled in `s1` must be
    /// one `s2` expects.
    pub fn is_shift_valid(s1: &VanillaState, s2: &VanillaState, shift: usize) -> bool {
        (shift..s1.max_height()).all(|t| s1.at(t) <= s2.at(t - shift))
    }

    pub fn shortest_transition_length(s1: &VanillaState, s2: &VanillaState) -> Result<usize> {
        VanillaState::check_compatible(s1, s2)?;
        let start = s1.max_height().saturating_sub(s2.max_height());
        Ok((start..s1.max_height())
            .find(|&shift| VanillaState::is_shift_valid(s1, s2, shift))
            .unwrap_or(s1.max_height()))
    }

    /// Landing times, relative to the start of the transition, for the
    /// objects thrown during it.
    pub fn find_landings(s1: &VanillaState, s2: &VanillaState, shift: usize) -> Vec<usize> {
        let mut lands = Vec::new();
        for t in 0..s2.max_height() {
            let needed = s2.at(t).saturating_sub(s1.at(t + shift));
            lands.extend(std::iter::repeat(t + shift).take(needed));
        }
        lands
    }

    /// Pair the objects landing in `s` with `landings` in order. Beats with
    /// nothing to throw get a `0`.
    pub fn get_transition(s: &VanillaState, length: usize, landings: &[usize]) -> VanillaSiteswap {
        let mut lands = landings.iter();
        let throws = (0..length)
            .map(|t| {
                let beat: Vec<usize> = (0..s.at(t))
                    .filter_map(|_| lands.next().map(|&land| land - t))
                    .collect();
                if beat.is_empty() {
                    vec![0]
                } else {
                    beat
                }
            })
            .collect();
        VanillaSiteswap::new(throws)
    }

    pub fn shortest_transition(s1: &VanillaState, s2: &VanillaState) -> Result<VanillaSiteswap> {
        let length = VanillaState::shortest_transition_length(s1, s2)?;
        let lands = VanillaState::find_landings(s1, s2, length);
        Ok(VanillaState::get_transition(s1, length, &lands))
    }

    /// Every transition of exactly `length` beats, one per ordering of the
    /// landings. Repeats are not removed.
    pub fn all_transitions_of_length(
        s1: &VanillaState,
        s2: &VanillaState,
        length: usize,
    ) -> Result<VanillaTransitions> {
        VanillaState::check_compatible(s1, s2)?;
        let permutations = VanillaState::is_shift_valid(s1, s2, length)
            .then(|| HeapPermutations::new(VanillaState::find_landings(s1, s2, length)));
        Ok(VanillaTransitions {
            from: s1.clone(),
            length,
            permutations,
        })
    }
}

impl fmt::Display for VanillaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cell in &self.cells {
            write!(f, "{}", cell)?;
        }
        Ok(())
    }
}

/// Lazily produced transitions, see [`VanillaState::all_transitions_of_length`].
pub struct VanillaTransitions {
    from: VanillaState,
    length: usize,
    permutations: Option<HeapPermutations<usize>>,
}

impl Iterator for VanillaTransitions {
    type Item = VanillaSiteswap;

    fn next(&mut self) -> Option<VanillaSiteswap> {
        let lands = self.permutations.as_mut()?.next()?;
        Some(VanillaState::get_transition(&self.from, self.length, &lands))
    }
}

/// A sequence of multiplexed heights, one list per beat.
#[derive(Debug, Clone, PartialEq)]
pub struct VanillaSiteswap {
    throws: Vec<Vec<usize>>,
    period: usize,
    num_objects: usize,
    max_height: usize,
    max_multiplex: usize,
    state: VanillaState,
    error: Option<ValidationError>,
}

impl VanillaSiteswap {
    pub fn new(throws: Vec<Vec<usize>>) -> Self {
        let mut siteswap = VanillaSiteswap {
            period: throws.len(),
            max_height: throws.iter().flatten().copied().max().unwrap_or(0),
            max_multiplex: throws.iter().map(Vec::len).max().unwrap_or(0),
            throws,
            num_objects: 0,
            state: VanillaState::default(),
            error: None,
        };
        if let Err(error) = siteswap.validate() {
            tracing::debug!(pattern = %siteswap, %error, "vanilla pattern failed validation");
            siteswap.error = Some(error);
        }
        siteswap
    }

    fn validate(&mut self) -> std::result::Result<(), ValidationError> {
        if self.period == 0 {
            return Err(ValidationError::NoBeats);
        }
        let sum: usize = self.throws.iter().flatten().sum();
        if sum % self.period != 0 {
            return Err(ValidationError::InvalidAverage);
        }
        self.num_objects = sum / self.period;

        let mut check: Vec<usize> = self.throws.iter().map(Vec::len).collect();
        let mut cells = vec![0; self.max_height];
        for (t, beat) in self.throws.iter().enumerate() {
            for &height in beat {
                let land = (t + height) % self.period;
                if check[land] == 0 {
                    return Err(ValidationError::TimeCollision { time: land });
                }
                check[land] -= 1;
                let mut time = (t + height) as isize - self.period as isize;
                while time >= 0 {
                    cells[time as usize] += 1;
                    time -= self.period as isize;
                }
            }
        }
        self.state = VanillaState::new(cells);
        Ok(())
    }

    /// Heights as symbols, ignoring spaces, with `[..]` for multiplexes.
    pub fn parse(input: &str) -> Result<Self> {
        let mut throws = Vec::new();
        let mut multiplex: Option<Vec<usize>> = None;
        for c in input.chars().filter(|c| *c != ' ') {
            match (c, multiplex.as_mut()) {
                ('[', None) => multiplex = Some(Vec::new()),
                (']', Some(group)) => {
                    if group.is_empty() {
                        return Err(SiteswapError::Notation("empty multiplex".into()));
                    }
                    throws.push(std::mem::take(group));
                    multiplex = None;
                }
                (c, Some(group)) => group.push(symbol_height(c)?),
                (c, None) => throws.push(vec![symbol_height(c)?]),
            }
        }
        if multiplex.is_some() {
            return Err(SiteswapError::Notation("unclosed multiplex".into()));
        }
        Ok(VanillaSiteswap::new(throws))
    }

    /// Stack notation: height symbols only, spaces ignored.
    pub fn parse_stack(input: &str) -> Result<Self> {
        let values = input
            .chars()
            .filter(|c| *c != ' ')
            .map(symbol_height)
            .collect::<Result<Vec<_>>>()?;
        VanillaSiteswap::from_stack(&values)
    }

    /// Rebuild heights from stack values: a throw to depth `s` comes back
    /// once `s - 1` later throws have gone in at or below it.
    pub fn from_stack(values: &[usize]) -> Result<Self> {
        let period = values.len();
        let limit = period * (values.iter().sum::<usize>() + 1);
        let mut throws = Vec::with_capacity(period);
        for (t, &s) in values.iter().enumerate() {
            if s == 0 {
                throws.push(vec![0]);
                continue;
            }
            let mut depth = s;
            let height = (t + 1..=t + limit).find_map(|tau| {
                let next = values[tau % period];
                if next == 0 {
                    None
                } else if depth == 1 {
                    Some(tau - t)
                } else {
                    if next >= depth {
                        depth -= 1;
                    }
                    None
                }
            });
            let height = height.ok_or_else(|| {
                SiteswapError::Notation(format!("stack value {} at beat {} never returns", s, t))
            })?;
            throws.push(vec![height]);
        }
        Ok(VanillaSiteswap::new(throws))
    }

    /// Stack value per beat: the height minus the throws made in between
    /// that come down first.
    pub fn to_stack(&self) -> Result<Vec<usize>> {
        if self.max_multiplex > 1 {
            return Err(SiteswapError::Multiplex("stack notation"));
        }
        let height_at = |t: usize| self.throws[t % self.period].first().copied().unwrap_or(0);
        Ok((0..self.period)
            .map(|t| {
                let h = height_at(t);
                let earlier = (t + 1..t + h.max(1)).filter(|&j| j + height_at(j) < t + h).count();
                h - earlier
            })
            .collect())
    }

    pub fn to_stack_string(&self) -> Result<String> {
        self.to_stack()?
            .into_iter()
            .map(|s| int_to_ss(s as i64))
            .collect()
    }

    pub fn throws(&self) -> &[Vec<usize>] {
        &self.throws
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn num_objects(&self) -> usize {
        self.num_objects
    }

    pub fn max_height(&self) -> usize {
        self.max_height
    }

    pub fn max_multiplex(&self) -> usize {
        self.max_multiplex
    }

    pub fn state(&self) -> &VanillaState {
        &self.state
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    pub fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    pub fn error_message(&self) -> String {
        self.error.as_ref().map(|e| e.to_string()).unwrap_or_default()
    }
}

fn symbol_height(c: char) -> Result<usize> {
    let mut buf = [0; 4];
    ss_to_int(c.encode_utf8(&mut buf)).map(|h| h as usize)
}

fn symbol(height: usize) -> String {
    int_to_ss(height as i64).map_or_else(|_| height.to_string(), String::from)
}

impl fmt::Display for VanillaSiteswap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for beat in &self.throws {
            if beat.len() == 1 {
                f.write_str(&symbol(beat[0]))?;
            } else {
                let inner: String = beat.iter().map(|&h| symbol(h)).collect();
                write!(f, "[{}]", inner)?;
            }
        }
        Ok(())
    }
}
