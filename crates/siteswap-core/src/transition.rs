//! Transitions between states: the throws that turn one landing schedule into
//! another.

use crate::error::{Result, SiteswapError};
use crate::hand::{all_positions, Position};
use crate::siteswap::Siteswap;
use crate::state::State;
use crate::throw::{JugglerBeat, JugglerBeats, Throw};
use tracing::trace;

fn check_compatible(s1: &State, s2: &State) -> Result<()> {
    if s1.num_objects() != s2.num_objects() {
        return Err(SiteswapError::ObjectCountMismatch(s1.num_objects(), s2.num_objects()));
    }
    if s1.num_jugglers() != s2.num_jugglers() {
        return Err(SiteswapError::JugglerCountMismatch(s1.num_jugglers(), s2.num_jugglers()));
    }
    if !s1.same_delays(s2) {
        return Err(SiteswapError::DelayMismatch);
    }
    Ok(())
}

/// True when, after `shift` beats, nothing `s1` already has in the air lands
/// where `s2` does not expect it.
pub fn is_shift_valid(s1: &State, s2: &State, shift: usize) -> bool {
    (shift..s1.max_height()).all(|time| {
        let after = s2.global_state_beat(time - shift);
        s1.global_state_beat(time)
            .iter()
            .zip(&after)
            .all(|(beat, target)| beat.is_less_or_equal(target))
    })
}

/// Fewest beats needed to get from `s1` to `s2`.
pub fn shortest_transition_length(s1: &State, s2: &State) -> Result<usize> {
    check_compatible(s1, s2)?;
    let h1 = s1.max_height();
    let start = h1.saturating_sub(s2.max_height());
    let length = (start..h1)
        .find(|&shift| is_shift_valid(s1, s2, shift))
        .unwrap_or(h1);
    trace!(from = %s1, to = %s2, length, "transition length");
    Ok(length)
}

/// Slots, shifted to transition time, that still need an object after
/// everything already in flight in `s1` has come down. Ordered by juggler,
/// then beat, then hand.
pub fn find_landings(s1: &State, s2: &State, shift: usize) -> Vec<Position> {
    let mut lands = Vec::new();
    for pos in all_positions(s1.num_jugglers(), s2.max_height()) {
        let landing = pos.shifted(shift);
        let needed = s2.at(pos).saturating_sub(s1.at(landing));
        lands.extend(std::iter::repeat(landing).take(needed));
    }
    lands
}

/// Throw the objects of `s` in slot order, the i-th one to the i-th landing.
pub fn get_transition(s: &State, length: usize, landings: &[Position]) -> Siteswap {
    let n = s.num_jugglers();
    let delays = s.delays();
    let delay = |j: usize| delays.get(j).copied().unwrap_or(0.0);
    let mut jugglers = vec![vec![JugglerBeat::default(); length]; n];
    let mut lands = landings.iter();
    for pos in all_positions(n, length) {
        for _ in 0..s.at(pos) {
            let Some(&land) = lands.next() else {
                break;
            };
            let height = land.time as f64 - pos.time as f64 - delay(pos.juggler) + delay(land.juggler);
            jugglers[pos.juggler][pos.time]
                .throws_mut(pos.hand)
                .push(Throw::between(pos, land, height, n));
        }
    }
    let jugglers = jugglers.into_iter().map(JugglerBeats::from_beats).collect();
    Siteswap::with_exact_delays(jugglers, delays.to_vec())
}

fn basic_transition(s1: &State, s2: &State) -> Result<Siteswap> {
    let length = shortest_transition_length(s1, s2)?;
    let lands = find_landings(s1, s2, length);
    Ok(get_transition(s1, length, &lands))
}

fn is_shorter(a: &Siteswap, b: &Siteswap) -> bool {
    a.period() < b.period()
        || (a.period() == b.period() && a.to_string().len() < b.to_string().len())
}

/// Shortest transition from `s1` to `s2`. With `allow_flip`, mirrored
/// versions of either side are tried too and the most compact result wins.
pub fn shortest_transition(s1: &State, s2: &State, allow_flip: bool) -> Result<Siteswap> {
    let mut best = basic_transition(s1, s2)?;
    if allow_flip {
        let (f1, f2) = (s1.flip(), s2.flip());
        for (from, to) in [(&f1, s2), (s1, &f2), (&f1, &f2)] {
            let candidate = basic_transition(from, to)?;
            if is_shorter(&candidate, &best) {
                best = candidate;
            }
        }
    }
    Ok(best)
}

/// Every transition of exactly `length` beats, produced on demand. Empty when
/// `length` is too short; symmetric landings give repeated patterns.
pub fn all_transitions_of_length(s1: &State, s2: &State, length: usize) -> Result<Transitions> {
    check_compatible(s1, s2)?;
    let permutations =
        is_shift_valid(s1, s2, length).then(|| HeapPermutations::new(find_landings(s1, s2, length)));
    Ok(Transitions {
        from: s1.clone(),
        length,
        permutations,
    })
}

/// Iterator returned by [`all_transitions_of_length`].
pub struct Transitions {
    from: State,
    length: usize,
    permutations: Option<HeapPermutations<Position>>,
}

impl Iterator for Transitions {
    type Item = Siteswap;

    fn next(&mut self) -> Option<Siteswap> {
        let lands = self.permutations.as_mut()?.next()?;
        Some(get_transition(&self.from, self.length, &lands))
    }
}

/// Heap's algorithm as an iterator: the items as given first, then each
/// following ordering one swap away from the last.
#[derive(Debug, Clone)]
pub struct HeapPermutations<T> {
    items: Vec<T>,
    counters: Vec<usize>,
    index: usize,
    started: bool,
}

impl<T: Clone> HeapPermutations<T> {
    pub fn new(items: Vec<T>) -> Self {
        HeapPermutations {
            counters: vec![0; items.len()],
            items,
            index: 1,
            started: false,
        }
    }
}

impl<T: Clone> Iterator for HeapPermutations<T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        if !self.started {
            self.started = true;
            return Some(self.items.clone());
        }
        while self.index < self.items.len() {
            let i = self.index;
            if self.counters[i] < i {
                let k = if i % 2 == 1 { self.counters[i] } else { 0 };
                self.items.swap(i, k);
                self.counters[i] += 1;
                self.index = 1;
                return Some(self.items.clone());
            }
            self.counters[i] = 0;
            self.index += 1;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{JugglerState, JugglerStateBeat};
    use std::collections::HashSet;

    fn async_state(cells: &[(usize, usize)]) -> State {
        let beats = cells.iter().map(|&(l, r)| JugglerStateBeat::new(l, r)).collect();
        State::new(vec![JugglerState::new(beats)], None)
    }

    #[test]
    fn test_heap_permutations() {
        let perms: Vec<Vec<u8>> = HeapPermutations::new(vec![1, 2, 3]).collect();
        assert_eq!(perms.len(), 6);
        assert_eq!(perms[0], vec![1, 2, 3]);
        let distinct: HashSet<_> = perms.into_iter().collect();
        assert_eq!(distinct.len(), 6);
    }

    #[test]
    fn test_heap_permutations_small() {
        assert_eq!(HeapPermutations::<u8>::new(vec![]).count(), 1);
        assert_eq!(HeapPermutations::new(vec!['a']).count(), 1);
        assert_eq!(HeapPermutations::new(vec![1, 1, 2, 3]).count(), 24);
    }

    #[test]
    fn test_shift_validity() {
        let s1 = async_state(&[(1, 0), (0, 1), (0, 0), (0, 1), (1, 0)]);
        let s2 = State::ground(3, false, 1);
        assert!(!is_shift_valid(&s1, &s2, 0));
        assert!(!is_shift_valid(&s1, &s2, 3));
        assert!(is_shift_valid(&s1, &s2, 4));
        assert!(is_shift_valid(&s1, &s2, 5));
    }

    #[test]
    fn test_shift_validity_across_jugglers() {
        let juggler = |cells: &[(usize, usize)]| {
            JugglerState::new(cells.iter().map(|&(l, r)| JugglerStateBeat::new(l, r)).collect())
        };
        let s1 = State::new(vec![juggler(&[(1, 0)]), juggler(&[(0, 0), (0, 0), (0, 1)])], None);
        let s2 = State::new(vec![juggler(&[(1, 0)]), juggler(&[(0, 1)])], None);
        // Juggler A always fits; B's late catch only lines up after two beats
        assert!(!is_shift_valid(&s1, &s2, 0));
        assert!(!is_shift_valid(&s1, &s2, 1));
        assert!(is_shift_valid(&s1, &s2, 2));
        assert!(is_shift_valid(&s1, &s2, 3));
        // A right-hand catch does not fit a left-hand slot
        let mirrored = State::new(vec![juggler(&[(1, 0)]), juggler(&[(1, 0)])], None);
        assert!(!is_shift_valid(&s1, &mirrored, 2));
    }

    #[test]
    fn test_entry_and_exit() {
        let state = async_state(&[(1, 0), (0, 1), (0, 0), (0, 1)]);
        let ground = State::ground(3, false, 1);
        assert_eq!(shortest_transition_length(&ground, &state).unwrap(), 2);
        assert_eq!(state.entry(None, false, false).unwrap().to_string(), "L34");
        assert_eq!(state.entry(None, false, true).unwrap().to_string(), "4");
        assert_eq!(state.exit(None, false, false).unwrap().to_string(), "L23");
        assert_eq!(state.exit(None, false, true).unwrap().to_string(), "2");
    }

    #[test]
    fn test_sync_exit_with_flip() {
        let state = State::new(
            vec![JugglerState::new(vec![
                JugglerStateBeat::new(1, 1),
                JugglerStateBeat::default(),
                JugglerStateBeat::new(1, 1),
            ])],
            None,
        );
        let exit = state.exit(None, false, true).unwrap();
        assert_eq!(exit.to_string(), "(4x,3)(4x,3)!");
        assert_eq!(exit.period(), 3);
    }

    #[test]
    fn test_incompatible_states() {
        let s1 = State::ground(3, false, 1);
        let s2 = State::ground(4, false, 1);
        assert_eq!(
            shortest_transition_length(&s1, &s2),
            Err(SiteswapError::ObjectCountMismatch(3, 4))
        );
        let two = State::ground(3, false, 2);
        assert_eq!(
            shortest_transition_length(&s1, &two),
            Err(SiteswapError::JugglerCountMismatch(1, 2))
        );
        let delayed = State::ground(4, false, 2).with_delays(vec![0.0, 0.5]);
        let plain = State::ground(4, false, 2);
        assert_eq!(
            shortest_transition_length(&delayed, &plain),
            Err(SiteswapError::DelayMismatch)
        );
    }

    #[test]
    fn test_all_transitions() {
        let s1 = State::ground(3, false, 1);
        let s2 = async_state(&[(1, 0), (0, 1), (0, 0), (0, 1)]);
        let all: HashSet<String> = all_transitions_of_length(&s1, &s2, 3)
            .unwrap()
            .map(|t| t.to_string())
            .collect();
        assert_eq!(all.len(), 6);
        assert_eq!(all_transitions_of_length(&s1, &s2, 2).unwrap().count(), 2);
        assert_eq!(all_transitions_of_length(&s1, &s2, 1).unwrap().count(), 0);
        assert_eq!(all_transitions_of_length(&s1, &s2, 0).unwrap().count(), 0);
    }

    #[test]
    fn test_transition_throws_follow_delays() {
        let vanilla = crate::vanilla::VanillaSiteswap::parse("801").unwrap();
        let ss = Siteswap::from_khss(&vanilla, 4).unwrap();
        let state = ss.state().clone();
        let ground = State::ground(3, false, 2).with_delays(state.delays().to_vec());
        let entry = shortest_transition(&ground, &state, false).unwrap();
        assert!(entry.period() > 0);
        for juggler in entry.jugglers() {
            for beat in juggler.beats() {
                for th in beat.all_throws() {
                    assert_eq!(th.height.fract() != 0.0, th.pass);
                }
            }
        }
    }
}
