//! Conversion to and from JIF, the event-based juggling interchange format.

use crate::encoding::to_letter;
use crate::error::{Result, SiteswapError};
use crate::fraction::{round_within, Fraction, EPS, LAX_EPS};
use crate::hand::{all_positions, Hand, Position};
use crate::siteswap::Siteswap;
use crate::throw::{JugglerBeat, JugglerBeats, Throw};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::f64::consts::PI;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Jif {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<JifMeta>,
    #[serde(default = "default_time_stretch")]
    pub time_stretch_factor: f64,
    pub jugglers: Vec<JifJuggler>,
    pub limbs: Vec<JifLimb>,
    #[serde(default)]
    pub props: Vec<JifProp>,
    pub throws: Vec<JifThrow>,
    pub repetition: JifRepetition,
}

fn default_time_stretch() -> f64 {
    1.0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JifMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JifJuggler {
    pub name: String,
    pub position: [f64; 3],
    pub look_at: [f64; 3],
}

/// A hand; `type` is `"right hand"` or `"left hand"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JifLimb {
    pub juggler: usize,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JifProp {
    pub color: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// One flight, `from` and `to` being limb indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JifThrow {
    pub time: f64,
    pub duration: f64,
    pub from: usize,
    pub to: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prop: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JifRepetition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limb_permutation: Option<Vec<usize>>,
}

const RIGHT_HAND: &str = "right hand";
const LEFT_HAND: &str = "left hand";

/// Knobs for [`Siteswap::to_jif_with`]. Every field falls back to its default
/// when missing from a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JifOptions {
    /// Distance of each juggler from the centre; ignored for a single juggler
    pub radius: f64,
    /// Prop colours, reused in order when there are more props than colours
    pub colors: Vec<String>,
    pub prop_type: String,
    /// Upper bound on prop repetition search, in base periods
    pub max_periods: usize,
    pub generator: String,
}

impl Default for JifOptions {
    fn default() -> Self {
        JifOptions {
            radius: 1.0,
            colors: ["red", "green", "blue", "yellow", "magenta", "cyan", "orange", "purple"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            prop_type: "ball".into(),
            max_periods: 500,
            generator: concat!("siteswap-core ", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

fn limb_index(juggler: usize, hand: Hand) -> usize {
    juggler * 2 + hand.index()
}

#[derive(Debug, Clone)]
struct Event {
    time: f64,
    duration: f64,
    from: usize,
    to: usize,
    label: String,
}

/// Arrival slots waiting to be caught, keyed by time in ten-thousandths of a
/// beat and limb.
#[derive(Default)]
struct PropTracker {
    arrivals: HashMap<(i64, usize), VecDeque<usize>>,
    minted: usize,
}

fn slot_key(time: f64, limb: usize) -> (i64, usize) {
    ((time * 1e4).round() as i64, limb)
}

impl PropTracker {
    /// Run one pass of `events` starting at `offset`, returning the prop each
    /// throw carries.
    fn run_pass(&mut self, events: &[Event], offset: f64) -> Vec<usize> {
        events
            .iter()
            .map(|event| {
                let time = event.time + offset;
                let key = slot_key(time, event.from);
                let caught = match self.arrivals.get_mut(&key) {
                    Some(queue) => {
                        let id = queue.pop_front();
                        if queue.is_empty() {
                            self.arrivals.remove(&key);
                        }
                        id
                    }
                    None => None,
                };
                let id = caught.unwrap_or_else(|| {
                    self.minted += 1;
                    self.minted - 1
                });
                self.arrivals
                    .entry(slot_key(time + event.duration, event.to))
                    .or_default()
                    .push_back(id);
                id
            })
            .collect()
    }
}

impl Siteswap {
    pub fn to_jif(&self) -> Result<Jif> {
        self.to_jif_with(&JifOptions::default())
    }

    /// Export as JIF. The throws cover one full prop repetition: the time it
    /// takes every prop to be back where it started.
    pub fn to_jif_with(&self, options: &JifOptions) -> Result<Jif> {
        if let Some(error) = self.error() {
            return Err(SiteswapError::InvalidPattern(error.to_string()));
        }
        let n = self.num_jugglers();
        let (base, events) = self.base_events();

        // Every flight that is still up when a pass starts was thrown in one
        // of the `warmup` passes before it
        let warmup = ((self.max_height() + 1.0) / base as f64).ceil().max(1.0) as usize;
        let mut tracker = PropTracker::default();
        let mut passes: Vec<Vec<usize>> = Vec::new();
        let mut repeat = None;
        for r in 1..=options.max_periods {
            while passes.len() < 2 * warmup + r {
                let offset = (passes.len() * base) as f64;
                passes.push(tracker.run_pass(&events, offset));
            }
            if (0..warmup).all(|i| passes[warmup + i] == passes[warmup + r + i]) {
                repeat = Some(r);
                break;
            }
        }
        let repeat = repeat.ok_or(SiteswapError::JifPeriodNotFound(options.max_periods))?;
        debug!(pattern = %self, repeat, base, props = tracker.minted, "found prop repetition");

        let throws = (0..repeat)
            .flat_map(|k| {
                let props = &passes[warmup + k];
                events.iter().zip(props).map(move |(event, &prop)| JifThrow {
                    time: event.time + (k * base) as f64,
                    duration: event.duration,
                    from: event.from,
                    to: event.to,
                    label: Some(event.label.clone()),
                    prop: Some(prop),
                })
            })
            .collect();

        let radius = if n == 1 { 0.0 } else { options.radius };
        let jugglers = (0..n)
            .map(|j| {
                let angle = 2.0 * PI * j as f64 / n as f64;
                JifJuggler {
                    name: to_letter(j, 'A').to_string(),
                    position: [radius * angle.cos(), 0.0, radius * angle.sin()],
                    look_at: if n == 1 { [0.0, 0.0, 1.0] } else { [0.0, 0.0, 0.0] },
                }
            })
            .collect();
        let limbs = (0..n)
            .flat_map(|juggler| {
                Hand::BOTH.into_iter().map(move |hand| JifLimb {
                    juggler,
                    kind: match hand {
                        Hand::Right => RIGHT_HAND.into(),
                        Hand::Left => LEFT_HAND.into(),
                    },
                })
            })
            .collect();
        let props = (0..tracker.minted)
            .map(|i| JifProp {
                color: options
                    .colors
                    .get(i % options.colors.len().max(1))
                    .cloned()
                    .unwrap_or_else(|| "red".into()),
                kind: options.prop_type.clone(),
            })
            .collect();

        Ok(Jif {
            meta: Some(JifMeta {
                name: Some(self.to_string()),
                kind: Some("siteswap".into()),
                description: None,
                generator: Some(options.generator.clone()),
                version: Some("0.1".into()),
            }),
            time_stretch_factor: 1.0,
            jugglers,
            limbs,
            props,
            throws,
            repetition: JifRepetition {
                period: Some((repeat * base) as f64),
                limb_permutation: None,
            },
        })
    }

    /// Throw events for one base unit, sorted by time. Patterns that mirror
    /// themselves every period contribute the mirrored period too.
    fn base_events(&self) -> (usize, Vec<Event>) {
        let n = self.num_jugglers();
        let period = self.period();
        let reps = if self.has_implicit_flip() { 2 } else { 1 };
        let delays = self.exact_delays();
        let mut events = Vec::new();
        for rep in 0..reps {
            for pos in all_positions(n, period) {
                let hand = pos.hand.flip_if(rep == 1);
                for th in self.throws_at(pos) {
                    if th.height.abs() < EPS {
                        continue;
                    }
                    let land_juggler = th.landing_juggler(pos.juggler, n);
                    let land_hand = hand.flip_if(th.crosses_hands());
                    events.push(Event {
                        time: (rep * period + pos.time) as f64 + delays[pos.juggler],
                        duration: th.height,
                        from: limb_index(pos.juggler, hand),
                        to: limb_index(land_juggler, land_hand),
                        label: th.to_string(),
                    });
                }
            }
        }
        events.sort_by(|a, b| a.time.total_cmp(&b.time).then(a.from.cmp(&b.from)));
        (reps * period, events)
    }

    /// Rebuild a pattern from JIF throws. Each juggler's delay comes from the
    /// fractional part of their first throw, and every throw must then fall
    /// on that juggler's beat within one repetition period. Beats with no
    /// throw become `0`s for asynchronous jugglers. Only unstretched time
    /// (`timeStretchFactor` of 1) is read.
    pub fn from_jif(jif: &Jif) -> Result<Siteswap> {
        let hands = jif
            .limbs
            .iter()
            .map(|limb| match limb.kind.as_str() {
                RIGHT_HAND => Ok((limb.juggler, Hand::Right)),
                LEFT_HAND => Ok((limb.juggler, Hand::Left)),
                other => Err(SiteswapError::InvalidLimb(other.to_string())),
            })
            .collect::<Result<Vec<_>>>()?;
        let n = hands
            .iter()
            .map(|&(juggler, _)| juggler + 1)
            .max()
            .unwrap_or(0)
            .max(jif.jugglers.len());
        if n == 0 {
            return Err(SiteswapError::Jif("no jugglers".into()));
        }
        if (jif.time_stretch_factor - 1.0).abs() > EPS {
            return Err(SiteswapError::Jif(format!(
                "timeStretchFactor {} is not supported",
                jif.time_stretch_factor
            )));
        }
        let period = jif
            .repetition
            .period
            .and_then(|p| round_within(p, LAX_EPS))
            .filter(|&p| p >= 1.0)
            .ok_or_else(|| SiteswapError::Jif("period must be a positive whole number of beats".into()))?
            as usize;
        let limb = |index: usize| {
            hands
                .get(index)
                .copied()
                .ok_or_else(|| SiteswapError::Jif(format!("unknown limb {}", index)))
        };

        let mut delays: Vec<Option<f64>> = vec![None; n];
        for th in &jif.throws {
            let (juggler, _) = limb(th.from)?;
            if delays[juggler].is_none() {
                let offset = Fraction::approximate(th.time.rem_euclid(1.0), 100).ok_or_else(|| {
                    SiteswapError::Jif(format!("throw time {} is not on a rational grid", th.time))
                })?;
                delays[juggler] = Some(offset.fract().to_float());
            }
        }
        let delays: Vec<f64> = delays.into_iter().map(|d| d.unwrap_or(0.0)).collect();

        let mut grid = vec![vec![JugglerBeat::default(); period]; n];
        for th in &jif.throws {
            let (juggler, hand) = limb(th.from)?;
            let (receiver, land_hand) = limb(th.to)?;
            let off_beat = |time: f64, who: usize| {
                SiteswapError::Jif(format!(
                    "time {} is off the beat for juggler {}",
                    time,
                    to_letter(who, 'A')
                ))
            };
            let start = round_within(th.time - delays[juggler], LAX_EPS)
                .ok_or_else(|| off_beat(th.time, juggler))?;
            let end = round_within(th.time + th.duration - delays[receiver], LAX_EPS)
                .ok_or_else(|| off_beat(th.time + th.duration, receiver))?;
            if start < 0.0 || start >= period as f64 {
                return Err(SiteswapError::Jif(format!(
                    "throw at time {} lies outside the period of {} beats",
                    th.time, period
                )));
            }
            let height = end - start + delays[receiver] - delays[juggler];
            let time = start as usize;
            let from = Position::new(juggler, time, hand);
            let to = Position::new(receiver, 0, land_hand);
            grid[juggler][time]
                .throws_mut(hand)
                .push(Throw::between(from, to, height, n));
        }

        reduce_period(&mut grid);
        for beats in &mut grid {
            fill_rests(beats);
        }
        let jugglers = grid.into_iter().map(JugglerBeats::from_beats).collect();
        Ok(Siteswap::with_exact_delays(jugglers, delays))
    }
}

/// Cut the grid down to its shortest repeating unit. Asynchronous grids made
/// of a run and its mirror image are cut to the run when the run is odd.
fn reduce_period(grid: &mut [Vec<JugglerBeat>]) {
    let period = grid.first().map_or(0, Vec::len);
    let shortest = (1..=period)
        .find(|&q| {
            period % q == 0
                && grid
                    .iter()
                    .all(|beats| (q..period).all(|t| beats[t] == beats[t % q]))
        })
        .unwrap_or(period);
    for beats in grid.iter_mut() {
        beats.truncate(shortest);
    }

    let half = shortest / 2;
    let no_sync = grid.iter().flatten().all(|beat| !beat.is_sync());
    let mirrored = grid
        .iter()
        .all(|beats| (0..half).all(|t| beats[t + half] == beats[t].flip()));
    if no_sync && shortest % 2 == 0 && half % 2 == 1 && mirrored {
        for beats in grid.iter_mut() {
            beats.truncate(half);
        }
    }
}

/// Put a `0` in every empty beat of an asynchronous juggler, alternating hands
/// with the beat before.
fn fill_rests(beats: &mut [JugglerBeat]) {
    if beats.iter().any(JugglerBeat::is_sync) {
        return;
    }
    let hand_of = |beat: &JugglerBeat| {
        if beat.right.is_empty() {
            Hand::Left
        } else {
            Hand::Right
        }
    };
    let start = beats.iter().position(|beat| !beat.is_empty());
    let mut hand = start.map_or(Hand::Left, |s| hand_of(&beats[s]));
    let len = beats.len();
    for i in 0..len {
        let t = (start.unwrap_or(0) + i) % len;
        if beats[t].is_empty() {
            hand = hand.other();
            beats[t] = JugglerBeat::in_hand(hand, vec![Throw::self_throw(0.0)]);
        } else {
            hand = hand_of(&beats[t]);
        }
    }
}
