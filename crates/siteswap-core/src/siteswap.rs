//! The pattern model and its validation engine.

use crate::encoding::to_letter;
use crate::error::{Result, SiteswapError, ValidationError};
use crate::fraction::{fix_fraction, round_within, unfix_fraction, EPS, LAX_EPS};
use crate::hand::{all_positions, Position};
use crate::state::State;
use crate::throw::{JugglerBeats, Throw};
use crate::vanilla::VanillaSiteswap;
use std::collections::VecDeque;
use std::fmt;
use tracing::debug;

/// A juggling pattern for one or more jugglers.
///
/// Construction always succeeds; whether the pattern can actually be juggled is
/// reported through [`Siteswap::is_valid`] and [`Siteswap::error`]. Statistics
/// and the state are only meaningful for valid patterns.
#[derive(Debug, Clone)]
pub struct Siteswap {
    jugglers: Vec<JugglerBeats>,
    delays: Vec<f64>,
    delays_supplied: bool,
    /// Supplied delays need no snapping
    delays_exact: bool,
    exact_delays: Vec<f64>,
    period: usize,
    num_objects: usize,
    max_height: f64,
    max_multiplex: usize,
    has_sync: bool,
    has_async: bool,
    has_pass: bool,
    pure_async: bool,
    state: State,
    error: Option<ValidationError>,
}

impl Siteswap {
    /// Build and validate a pattern. Without `delays` the jugglers' phase
    /// offsets are worked out from the passes.
    pub fn new(jugglers: Vec<JugglerBeats>, delays: Option<Vec<f64>>) -> Self {
        Siteswap::build(jugglers, delays, false)
    }

    /// Like [`Siteswap::new`] for delays that are already exact fractions,
    /// such as `j/N` from KHSS or offsets read from JIF times.
    pub(crate) fn with_exact_delays(jugglers: Vec<JugglerBeats>, delays: Vec<f64>) -> Self {
        Siteswap::build(jugglers, Some(delays), true)
    }

    fn build(mut jugglers: Vec<JugglerBeats>, delays: Option<Vec<f64>>, delays_exact: bool) -> Self {
        if !jugglers.is_empty() && jugglers.len() % 3 == 0 {
            for juggler in &mut jugglers {
                for beat in juggler.beats_mut() {
                    for th in beat.left.iter_mut().chain(beat.right.iter_mut()) {
                        th.unlock_thirds();
                    }
                }
            }
        }
        let delays_supplied = delays.is_some();
        let mut siteswap = Siteswap {
            jugglers,
            delays: delays.unwrap_or_default(),
            delays_supplied,
            delays_exact,
            exact_delays: Vec::new(),
            period: 0,
            num_objects: 0,
            max_height: 0.0,
            max_multiplex: 0,
            has_sync: false,
            has_async: false,
            has_pass: false,
            pure_async: false,
            state: State::default(),
            error: None,
        };
        if let Err(error) = siteswap.validate() {
            debug!(pattern = %siteswap, %error, "pattern failed validation");
            siteswap.error = Some(error);
        }
        siteswap
    }

    fn validate(&mut self) -> std::result::Result<(), ValidationError> {
        let n = self.jugglers.len();
        if n == 0 {
            return Err(ValidationError::NoJugglers);
        }
        self.period = self.jugglers[0].len();
        if self.jugglers.iter().any(|j| j.len() != self.period) {
            return Err(ValidationError::MismatchingPeriods);
        }
        if self.period == 0 {
            return Err(ValidationError::NoBeats);
        }
        for th in self.throws() {
            if let Some(to) = th.pass_to.filter(|&to| to >= n) {
                return Err(ValidationError::InvalidJuggler {
                    juggler: to_letter(to, 'A'),
                    jugglers: n,
                });
            }
        }

        if self.delays_supplied {
            if self.delays.len() != n {
                return Err(ValidationError::DelayCount {
                    jugglers: n,
                    delays: self.delays.len(),
                });
            }
            let allow_thirds = n % 3 == 0;
            self.exact_delays = if self.delays_exact {
                self.delays.clone()
            } else {
                self.delays
                    .iter()
                    .map(|&d| fix_fraction(d, allow_thirds))
                    .collect()
            };
        } else {
            self.exact_delays = self.infer_delays()?;
            self.delays = self.exact_delays.iter().map(|&d| unfix_fraction(d)).collect();
            if self.exact_delays.iter().any(|&d| d != 0.0) {
                debug!(delays = ?self.delays, "inferred juggler delays");
            }
        }

        let beats = || self.jugglers.iter().flat_map(|j| j.beats());
        self.max_multiplex = beats().map(|b| b.multiplex()).max().unwrap_or(0);
        self.has_pass = beats().any(|b| b.has_pass());
        self.has_sync = beats().any(|b| b.is_sync());
        self.has_async = beats().any(|b| b.is_async());
        self.pure_async = beats().all(|b| b.is_async());

        // Slots still expecting a catch, seeded from the throws made there
        let mut check = State::empty(n, self.period);
        let mut sum = 0.0;
        let mut max_height: f64 = 0.0;
        for pos in all_positions(n, self.period) {
            for th in self.throws_at(pos) {
                sum += th.height;
                max_height = max_height.max(th.height);
                check.inc(pos);
            }
        }
        self.max_height = max_height;

        let average = sum / self.period as f64;
        let tolerance = if self.exact_delays.iter().any(|&d| d != 0.0) {
            LAX_EPS
        } else {
            EPS
        };
        let objects = round_within(average, tolerance).ok_or(ValidationError::InvalidAverage)?;
        self.num_objects = objects as usize;

        // Pure async patterns of odd period repeat on the other side
        let implicit_flip = self.pure_async && self.period % 2 == 1;
        let mut state = State::empty(n, 0);
        for pos in all_positions(n, self.period) {
            for th in self.throws_at(pos) {
                let land_juggler = th.landing_juggler(pos.juggler, n);
                let offset = self.exact_delays[pos.juggler] - self.exact_delays[land_juggler];
                let full_land_time = round_within(pos.time as f64 + th.height + offset, LAX_EPS)
                    .filter(|&t| t >= 0.0)
                    .ok_or(ValidationError::InvalidLandingTime {
                        height: th.displayed_height,
                        juggler: land_juggler,
                    })? as usize;
                let land_time = full_land_time % self.period;
                let loops = full_land_time / self.period;
                let full_land_hand = pos.hand.flip_if(th.crosses_hands());
                let land_hand = full_land_hand.flip_if(implicit_flip && loops % 2 == 1);
                let landing = Position::new(land_juggler, land_time, land_hand);
                if check.at(landing) == 0 {
                    return Err(ValidationError::Collision {
                        juggler: land_juggler,
                        time: land_time,
                        hand: land_hand.index(),
                    });
                }
                check.dec(landing);

                // Echo the throw back one period at a time into the state
                let mut time = full_land_time as isize - self.period as isize;
                let mut hand = full_land_hand;
                while time >= 0 {
                    state.inc(Position::new(land_juggler, time as usize, hand));
                    hand = hand.flip_if(implicit_flip);
                    time -= self.period as isize;
                }
            }
        }
        state.trim();
        self.state = state.with_delays(self.exact_delays.clone());
        Ok(())
    }

    /// Phase offsets implied by the passes, juggler 0 (and any juggler no pass
    /// reaches) starting at zero.
    fn infer_delays(&self) -> std::result::Result<Vec<f64>, ValidationError> {
        let n = self.jugglers.len();
        let mut edges: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n];
        for (j, juggler) in self.jugglers.iter().enumerate() {
            for th in juggler.beats().iter().flat_map(|b| b.all_throws()) {
                if !th.pass {
                    if round_within(th.height, LAX_EPS).is_none() {
                        return Err(ValidationError::FractionalSelfThrow {
                            height: th.displayed_height,
                            juggler: to_letter(j, 'A'),
                        });
                    }
                    continue;
                }
                let to = th.landing_juggler(j, n);
                edges[j].push((to, th.height));
                edges[to].push((j, -th.height));
            }
        }

        let mut delays: Vec<Option<f64>> = vec![None; n];
        for start in 0..n {
            if delays[start].is_some() {
                continue;
            }
            delays[start] = Some(0.0);
            let mut queue = VecDeque::from([start]);
            while let Some(j) = queue.pop_front() {
                let from = delays[j].unwrap_or(0.0);
                for &(to, height) in &edges[j] {
                    let mut inferred = (from + height).rem_euclid(1.0);
                    if 1.0 - inferred < EPS {
                        inferred = 0.0;
                    }
                    match delays[to] {
                        None => {
                            delays[to] = Some(inferred);
                            queue.push_back(to);
                        }
                        Some(existing) => {
                            let diff = (existing - inferred).rem_euclid(1.0);
                            if diff.min(1.0 - diff) > LAX_EPS {
                                return Err(ValidationError::DelayConflict {
                                    juggler: to_letter(to, 'A'),
                                    existing: unfix_fraction(existing),
                                    inferred: unfix_fraction(inferred),
                                });
                            }
                        }
                    }
                }
            }
        }
        Ok(delays.into_iter().map(|d| d.unwrap_or(0.0)).collect())
    }

    fn throws(&self) -> impl Iterator<Item = &Throw> {
        self.jugglers
            .iter()
            .flat_map(|j| j.beats())
            .flat_map(|b| b.all_throws())
    }

    /// Throws made from a slot
    pub fn throws_at(&self, position: Position) -> &[Throw] {
        self.jugglers
            .get(position.juggler)
            .and_then(|j| j.beats().get(position.time))
            .map_or(&[], |beat| beat.throws(position.hand))
    }

    pub fn jugglers(&self) -> &[JugglerBeats] {
        &self.jugglers
    }

    /// Delays as supplied (or inferred, rounded for display)
    pub fn delays(&self) -> &[f64] {
        &self.delays
    }

    /// Delays snapped to exact fractions
    pub fn exact_delays(&self) -> &[f64] {
        &self.exact_delays
    }

    pub fn num_jugglers(&self) -> usize {
        self.jugglers.len()
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn num_objects(&self) -> usize {
        self.num_objects
    }

    pub fn max_height(&self) -> f64 {
        self.max_height
    }

    pub fn max_multiplex(&self) -> usize {
        self.max_multiplex
    }

    pub fn has_multiplex(&self) -> bool {
        self.max_multiplex > 1
    }

    pub fn has_sync(&self) -> bool {
        self.has_sync
    }

    pub fn has_async(&self) -> bool {
        self.has_async
    }

    pub fn has_pass(&self) -> bool {
        self.has_pass
    }

    pub fn is_pure_async(&self) -> bool {
        self.pure_async
    }

    /// Whether the pattern mirrors onto the other side every period
    pub fn has_implicit_flip(&self) -> bool {
        self.pure_async && self.period % 2 == 1
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    pub fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    /// Diagnostic for an invalid pattern, empty when valid
    pub fn error_message(&self) -> String {
        self.error.as_ref().map(|e| e.to_string()).unwrap_or_default()
    }

    /// Mirror every beat
    pub fn flip(&self) -> Siteswap {
        let delays = self.delays_supplied.then(|| self.delays.clone());
        Siteswap::build(
            self.jugglers.iter().map(JugglerBeats::flip).collect(),
            delays,
            self.delays_exact,
        )
    }

    /// Single juggler, pure async, whole heights, no `x` or passes.
    pub fn to_vanilla(&self) -> Result<VanillaSiteswap> {
        if let Some(error) = &self.error {
            return Err(SiteswapError::InvalidPattern(error.to_string()));
        }
        if self.jugglers.len() != 1 {
            return Err(SiteswapError::NotVanilla("more than one juggler".into()));
        }
        if !self.pure_async {
            return Err(SiteswapError::NotVanilla("not purely asynchronous".into()));
        }
        let mut throws = Vec::with_capacity(self.period);
        for beat in self.jugglers[0].beats() {
            let mut heights = Vec::new();
            for th in beat.all_throws() {
                if th.x || th.pass || th.height.fract() != 0.0 {
                    return Err(SiteswapError::NotVanilla(format!("throw {}", th)));
                }
                heights.push(th.height as usize);
            }
            throws.push(heights);
        }
        Ok(VanillaSiteswap::new(throws))
    }

    /// The two-handed, one-juggler reading of a vanilla pattern.
    pub fn from_vanilla(vanilla: &VanillaSiteswap) -> Result<Siteswap> {
        Siteswap::from_khss(vanilla, 2)
    }
}

impl fmt::Display for Siteswap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.jugglers.len() == 1 {
            return write!(f, "{}", self.jugglers[0]);
        }
        if self.delays.iter().any(|&d| d > 0.0) {
            let delays: Vec<String> = self
                .delays
                .iter()
                .map(|&d| unfix_fraction(d).to_string())
                .collect();
            write!(f, "{{{}}}", delays.join(","))?;
        }
        let parts: Vec<String> = self.jugglers.iter().map(|j| j.to_string()).collect();
        write!(f, "<{}>", parts.join("|"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::Hand;
    use crate::throw::{BeatSpec, JugglerBeat};

    fn th(height: f64) -> Throw {
        Throw::self_throw(height)
    }

    fn pass(height: f64, x: bool) -> Throw {
        Throw::new(height, x, true, None)
    }

    fn juggler(throws: Vec<Throw>) -> JugglerBeats {
        JugglerBeats::new(throws.into_iter().map(|t| BeatSpec::Throws(vec![t])).collect(), false)
    }

    fn vanilla(heights: &[f64]) -> Siteswap {
        Siteswap::new(vec![juggler(heights.iter().map(|&h| th(h)).collect())], None)
    }

    #[test]
    fn test_cascade_statistics() {
        let ss = vanilla(&[9.0, 7.0, 5.0, 3.0, 1.0]);
        assert!(ss.is_valid(), "{}", ss.error_message());
        assert_eq!(ss.period(), 5);
        assert_eq!(ss.num_objects(), 5);
        assert_eq!(ss.max_height(), 9.0);
        assert_eq!(ss.state().to_string(), "11111");
        assert!(ss.state().is_ground());
        assert!(ss.is_pure_async());
        assert_eq!(ss.error_message(), "");
        assert_eq!(ss.to_string(), "97531");
    }

    #[test]
    fn test_collision() {
        let ss = vanilla(&[4.0, 3.0, 2.0]);
        assert!(!ss.is_valid());
        assert_eq!(ss.error_message(), "Collision at juggler 0, time 1, hand 1");
        assert_eq!(
            ss.error(),
            Some(&ValidationError::Collision { juggler: 0, time: 1, hand: Hand::Left.index() })
        );
    }

    #[test]
    fn test_invalid_average() {
        let ss = vanilla(&[4.0, 4.0, 3.0]);
        assert_eq!(ss.error_message(), "Invalid pattern average");
    }

    #[test]
    fn test_no_jugglers() {
        let ss = Siteswap::new(vec![], None);
        assert_eq!(ss.error_message(), "No jugglers");
    }

    #[test]
    fn test_no_beats() {
        let ss = Siteswap::new(vec![JugglerBeats::default()], None);
        assert_eq!(ss.error(), Some(&ValidationError::NoBeats));
    }

    #[test]
    fn test_mismatching_periods() {
        let ss = Siteswap::new(
            vec![juggler(vec![pass(3.0, false), th(3.0)]), juggler(vec![pass(3.0, false)])],
            None,
        );
        assert_eq!(ss.error_message(), "Mismatching juggler periods");
    }

    #[test]
    fn test_delay_count() {
        let ss = Siteswap::new(
            vec![juggler(vec![pass(3.0, false)]), juggler(vec![pass(3.0, false)])],
            Some(vec![0.0]),
        );
        assert_eq!(
            ss.error_message(),
            "Number of jugglers (2) not equal to number of delays (1)"
        );
    }

    #[test]
    fn test_invalid_recipient() {
        let ss = Siteswap::new(
            vec![
                juggler(vec![Throw::new(3.0, false, true, Some(2))]),
                juggler(vec![pass(3.0, false)]),
            ],
            None,
        );
        assert_eq!(ss.error_message(), "Invalid juggler C, there are only 2 jugglers");
    }

    #[test]
    fn test_inferred_half_beat_delay() {
        let ss = Siteswap::new(
            vec![juggler(vec![pass(3.5, false)]), juggler(vec![pass(3.5, true)])],
            None,
        );
        assert!(ss.is_valid(), "{}", ss.error_message());
        assert_eq!(ss.delays(), &[0.0, 0.5]);
        assert_eq!(ss.to_string(), "{0,0.5}<3.5p|3.5px>");
        assert_eq!(ss.state().to_string(), "<1111|111>");
        assert!(ss.state().is_ground());
        assert_eq!(ss.num_objects(), 7);
    }

    #[test]
    fn test_fractional_self_throw_rejected() {
        let ss = Siteswap::new(
            vec![juggler(vec![th(3.5)]), juggler(vec![pass(3.0, false)])],
            None,
        );
        assert!(matches!(ss.error(), Some(ValidationError::FractionalSelfThrow { .. })));
    }

    #[test]
    fn test_delay_conflict() {
        let ss = Siteswap::new(
            vec![
                juggler(vec![pass(3.5, false), pass(3.0, false)]),
                juggler(vec![pass(3.0, false), pass(3.0, false)]),
            ],
            None,
        );
        assert!(matches!(ss.error(), Some(ValidationError::DelayConflict { juggler: 'B', .. })));
    }

    #[test]
    fn test_invalid_landing_time() {
        let ss = Siteswap::new(
            vec![juggler(vec![pass(3.2, true)]), juggler(vec![pass(3.8, false)])],
            Some(vec![0.0, 0.5]),
        );
        assert_eq!(
            ss.error_message(),
            "Throw 3.2 lands at an invalid time for juggler 1"
        );
    }

    #[test]
    fn test_thirds_with_three_jugglers() {
        let ss = Siteswap::new(
            vec![
                juggler(vec![pass(3.3, false), th(3.0)]),
                juggler(vec![pass(3.3, false), th(3.0)]),
                juggler(vec![pass(4.3, false), th(3.0)]),
            ],
            Some(vec![0.0, 0.3, 0.6]),
        );
        assert!(ss.is_valid(), "{}", ss.error_message());
        assert_eq!(ss.num_objects(), 10);
        assert_eq!(ss.max_height(), 4.0 + 1.0 / 3.0);
        assert_eq!(ss.to_string(), "{0,0.3,0.6}<3.3p3|3.3p3|4.3p3>");
    }

    #[test]
    fn test_sync_state() {
        let beat = JugglerBeat::new(vec![th(4.0)], vec![th(4.0)]);
        let ss = Siteswap::new(
            vec![JugglerBeats::new(
                vec![BeatSpec::Beat(beat), BeatSpec::Beat(JugglerBeat::default())],
                false,
            )],
            None,
        );
        assert!(ss.is_valid(), "{}", ss.error_message());
        assert_eq!(ss.num_objects(), 4);
        assert!(ss.has_sync());
        assert!(!ss.has_async());
        assert_eq!(ss.state().to_string(), "(1,1)(0,0)(1,1)");
    }

    #[test]
    fn test_flip_round_trip() {
        let ss = Siteswap::new(
            vec![juggler(vec![th(5.0), th(3.0), th(1.0)]), juggler(vec![th(3.0), th(3.0), th(3.0)])],
            Some(vec![0.0, 0.5]),
        );
        assert_eq!(ss.flip().flip().to_string(), ss.to_string());
        assert_eq!(ss.flip().delays(), ss.delays());
    }

    #[test]
    fn test_to_vanilla() {
        let ss = vanilla(&[5.0, 3.0, 1.0]);
        let v = ss.to_vanilla().unwrap();
        assert_eq!(v.to_string(), "531");
        assert_eq!(v.num_objects(), 3);

        let two = Siteswap::new(vec![juggler(vec![th(3.0)]), juggler(vec![th(3.0)])], None);
        assert!(two.is_valid(), "{}", two.error_message());
        assert!(matches!(two.to_vanilla(), Err(SiteswapError::NotVanilla(_))));

        let invalid = vanilla(&[4.0, 3.0, 2.0]);
        assert!(matches!(invalid.to_vanilla(), Err(SiteswapError::InvalidPattern(_))));
    }
}
