use proptest::prelude::*;
use siteswap_core::transition::{is_shift_valid, shortest_transition_length};
use siteswap_core::{
    all_transitions_of_length, Hand, JugglerState, JugglerStateBeat, Position, Siteswap, State,
    VanillaSiteswap, VanillaState,
};

/// Valid vanilla patterns: beat `i` lands on `perm[i]`, plus whole extra periods.
fn vanilla_pattern() -> impl Strategy<Value = Vec<usize>> {
    (1usize..7).prop_flat_map(|period| {
        (
            Just((0..period).collect::<Vec<_>>()).prop_shuffle(),
            prop::collection::vec(0usize..3, period),
        )
            .prop_map(move |(perm, extra)| {
                (0..period)
                    .map(|i| (perm[i] + period - i) % period + extra[i] * period)
                    .collect()
            })
    })
}

fn build(heights: &[usize]) -> VanillaSiteswap {
    VanillaSiteswap::new(heights.iter().map(|&h| vec![h]).collect())
}

/// Throw through `throws` starting from `state`, one beat at a time.
fn replay(state: &VanillaState, throws: &[Vec<usize>]) -> Vec<usize> {
    let mut cells: Vec<usize> = state.cells().to_vec();
    for beat in throws {
        let held = if cells.is_empty() { 0 } else { cells.remove(0) };
        let thrown = beat.iter().filter(|&&h| h > 0).count();
        assert_eq!(held, thrown, "throws {:?} do not match the state", beat);
        for &h in beat.iter().filter(|&&h| h > 0) {
            if cells.len() < h {
                cells.resize(h, 0);
            }
            cells[h - 1] += 1;
        }
    }
    while cells.last() == Some(&0) {
        cells.pop();
    }
    cells
}

/// Throw `pattern` once through from `start`. `None` when a hand is asked to
/// throw a different number of objects than it holds.
fn replay_state(start: &State, pattern: &Siteswap) -> Option<State> {
    let n = start.num_jugglers();
    let delays = start.delays().to_vec();
    let mut cells: Vec<Vec<JugglerStateBeat>> =
        start.jugglers().iter().map(|j| j.beats().to_vec()).collect();
    for t in 0..pattern.period() {
        for j in 0..n {
            for hand in Hand::BOTH {
                let throws: Vec<_> = pattern
                    .throws_at(Position::new(j, t, hand))
                    .iter()
                    .filter(|th| th.height > 0.0)
                    .collect();
                let held = cells[j].first().map_or(0, |beat| beat.get(hand));
                if held != throws.len() {
                    return None;
                }
                for th in throws {
                    let to = th.landing_juggler(j, n);
                    let flight = th.height + delays[j] - delays[to];
                    let beats = flight.round();
                    assert!((flight - beats).abs() < 1e-6 && beats >= 1.0, "throw {} in {}", th, pattern);
                    let beats = beats as usize;
                    if cells[to].len() <= beats {
                        cells[to].resize(beats + 1, JugglerStateBeat::default());
                    }
                    cells[to][beats].increment(hand.flip_if(th.crosses_hands()));
                }
            }
        }
        for beats in &mut cells {
            if !beats.is_empty() {
                beats.remove(0);
            }
        }
    }
    Some(State::new(cells.into_iter().map(JugglerState::new).collect(), Some(delays)))
}

fn same_cells(a: &State, b: &State) -> bool {
    let trimmed = |s: &State| State::new(s.jugglers().to_vec(), None);
    trimmed(a).jugglers() == trimmed(b).jugglers()
}

/// Whether `pattern` takes `from` to `to`, mirrored sides allowed with `flip`
fn reaches(from: &State, pattern: &Siteswap, to: &State, flip: bool) -> bool {
    let starts = if flip { vec![from.clone(), from.flip()] } else { vec![from.clone()] };
    let ends = if flip { vec![to.clone(), to.flip()] } else { vec![to.clone()] };
    starts.iter().any(|start| {
        replay_state(start, pattern).map_or(false, |end| ends.iter().any(|e| same_cells(&end, e)))
    })
}

/// Vanilla patterns shared out over one or two jugglers. Two jugglers skip
/// `1`s, which would land before the next beat.
fn shared_pattern() -> impl Strategy<Value = Siteswap> {
    (vanilla_pattern(), prop_oneof![Just(2usize), Just(4usize)])
        .prop_filter("1s are caught within the beat", |(heights, hands)| {
            *hands == 2 || !heights.contains(&1)
        })
        .prop_map(|(heights, hands)| Siteswap::from_khss(&build(&heights), hands).unwrap())
}

proptest! {
    #[test]
    fn test_average_is_object_count(heights in vanilla_pattern()) {
        let vanilla = build(&heights);
        prop_assert!(vanilla.is_valid(), "{}", vanilla.error_message());
        let sum: usize = heights.iter().sum();
        prop_assert_eq!(vanilla.num_objects() * vanilla.period(), sum);
        prop_assert_eq!(vanilla.state().num_objects(), vanilla.num_objects());

        let full = Siteswap::from_vanilla(&vanilla).unwrap();
        prop_assert!(full.is_valid(), "{}", full.error_message());
        prop_assert_eq!(full.num_objects(), vanilla.num_objects());
        prop_assert_eq!(full.state().num_objects(), vanilla.num_objects());
    }

    #[test]
    fn test_flip_is_an_involution(heights in vanilla_pattern()) {
        let full = Siteswap::from_vanilla(&build(&heights)).unwrap();
        let twice = full.flip().flip();
        prop_assert_eq!(twice.to_string(), full.to_string());
        prop_assert_eq!(twice.state(), full.state());
        prop_assert_eq!(full.flip().num_objects(), full.num_objects());
    }

    #[test]
    fn test_stack_round_trip(heights in vanilla_pattern()) {
        let vanilla = build(&heights);
        let stack = vanilla.to_stack().unwrap();
        let back = VanillaSiteswap::from_stack(&stack).unwrap();
        prop_assert_eq!(back.throws(), vanilla.throws());
    }

    #[test]
    fn test_transitions_reach_their_target(heights in vanilla_pattern()) {
        let vanilla = build(&heights);
        let state = vanilla.state();
        let ground = VanillaState::ground(vanilla.num_objects());

        let entry = state.entry(None).unwrap();
        prop_assert_eq!(replay(&ground, entry.throws()), state.cells().to_vec());

        let exit = state.exit(None).unwrap();
        prop_assert_eq!(replay(state, exit.throws()), ground.cells().to_vec());
    }

    #[test]
    fn test_state_repeats_after_a_period(ss in shared_pattern()) {
        prop_assert!(ss.is_valid(), "{}", ss.error_message());
        let state = ss.state();
        let after = replay_state(state, &ss).expect("pattern throws what its state holds");
        let expected = if ss.has_implicit_flip() { state.flip() } else { state.clone() };
        prop_assert!(same_cells(&after, &expected), "{}: {} became {}", ss, state, after);
    }

    #[test]
    fn test_state_transitions_replay(ss in shared_pattern(), sync in any::<bool>(), flip in any::<bool>()) {
        let state = ss.state();
        let ground = State::ground(state.num_objects(), sync, state.num_jugglers())
            .with_delays(state.delays().to_vec());

        let entry = state.entry(None, sync, flip).unwrap();
        prop_assert!(reaches(&ground, &entry, state, flip), "entry {} into {}", entry, ss);
        let exit = state.exit(None, sync, flip).unwrap();
        prop_assert!(reaches(state, &exit, &ground, flip), "exit {} from {}", exit, ss);
    }

    #[test]
    fn test_transitions_of_each_length(ss in shared_pattern()) {
        let state = ss.state();
        let ground = State::ground(state.num_objects(), false, state.num_jugglers())
            .with_delays(state.delays().to_vec());
        let shortest = shortest_transition_length(&ground, state).unwrap();
        for length in 0..=shortest + 1 {
            let found: Vec<Siteswap> = all_transitions_of_length(&ground, state, length)
                .unwrap()
                .take(6)
                .collect();
            prop_assert_eq!(!found.is_empty(), is_shift_valid(&ground, state, length));
            if length < shortest {
                prop_assert!(found.is_empty());
            }
            for transition in &found {
                prop_assert!(reaches(&ground, transition, state, false), "{} into {}", transition, ss);
            }
        }
    }
}
