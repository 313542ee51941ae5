//! k-handed siteswap: one throw stream shared by every hand of every juggler.

use crate::error::{Result, SiteswapError};
use crate::fraction::{lcm, unfix_fraction};
use crate::hand::Hand;
use crate::siteswap::Siteswap;
use crate::throw::{JugglerBeat, JugglerBeats, Throw};
use crate::vanilla::VanillaSiteswap;

impl Siteswap {
    /// Spread a vanilla pattern over `hands / 2` jugglers.
    ///
    /// Global beat `t` belongs to juggler `t mod N` at local beat `t div N`,
    /// and juggler `j` runs `j / N` of a beat behind juggler 0. A global height
    /// `h` becomes a local height of `h / N`, passing whenever it lands with a
    /// different juggler. Each juggler's hands alternate right, left.
    pub fn from_khss(vanilla: &VanillaSiteswap, hands: usize) -> Result<Siteswap> {
        if hands == 0 || hands % 2 != 0 {
            return Err(SiteswapError::InvalidHands(hands));
        }
        if vanilla.max_multiplex() > 1 {
            return Err(SiteswapError::Multiplex("k-handed siteswap"));
        }
        let period = vanilla.period();
        if period == 0 {
            return Err(SiteswapError::Notation("empty pattern".into()));
        }
        let n = hands / 2;
        let global_period = lcm(period as i64, n as i64) as usize;
        let local_period = global_period / n;

        let jugglers = (0..n)
            .map(|j| {
                let beats = (0..local_period)
                    .map(|local| {
                        let t = local * n + j;
                        let Some(&height) = vanilla.throws()[t % period].first() else {
                            return JugglerBeat::default();
                        };
                        let land_juggler = (t + height) % n;
                        let land_local = (t + height) / n;
                        let pass = land_juggler != j;
                        let exact = height as f64 / n as f64;
                        let swaps = (local + land_local) % 2 == 1;
                        let even = exact % 2.0 == 0.0;
                        let relative = (j + 1) % n;
                        let th = Throw {
                            displayed_height: unfix_fraction(exact),
                            height: exact,
                            written: false,
                            x: if pass { !swaps } else { swaps == even },
                            pass,
                            pass_to: (pass && land_juggler != relative).then_some(land_juggler),
                        };
                        let hand = if local % 2 == 0 { Hand::Right } else { Hand::Left };
                        JugglerBeat::in_hand(hand, vec![th])
                    })
                    .collect();
                JugglerBeats::from_beats(beats)
            })
            .collect();
        let delays = (0..n).map(|j| j as f64 / n as f64).collect();
        Ok(Siteswap::with_exact_delays(jugglers, delays))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn khss(pattern: &str, hands: usize) -> Siteswap {
        let vanilla = VanillaSiteswap::parse(pattern).unwrap();
        Siteswap::from_khss(&vanilla, hands).unwrap()
    }

    #[test]
    fn test_two_hands_is_vanilla() {
        let ss = khss("531", 2);
        assert!(ss.is_valid(), "{}", ss.error_message());
        assert_eq!(ss.to_string(), "531");
        assert_eq!(ss.num_objects(), 3);
    }

    #[test]
    fn test_four_hands_odd_height() {
        let ss = khss("7", 4);
        assert!(ss.is_valid(), "{}", ss.error_message());
        assert_eq!(ss.to_string(), "{0,0.5}<3.5p|3.5px>");
        assert_eq!(ss.num_objects(), 7);
    }

    #[test]
    fn test_four_hands_even_height() {
        let ss = khss("6", 4);
        assert!(ss.is_valid(), "{}", ss.error_message());
        assert_eq!(ss.to_string(), "{0,0.5}<3|3>");
    }

    #[test]
    fn test_twelve_jugglers_keep_exact_heights() {
        let ss = khss("j", 24);
        assert!(ss.is_valid(), "{}", ss.error_message());
        assert_eq!(ss.num_jugglers(), 12);
        assert_eq!(ss.num_objects(), 19);
        for juggler in ss.jugglers() {
            for th in juggler.beats().iter().flat_map(|b| b.all_throws()) {
                assert_eq!(th.height, 19.0 / 12.0);
                assert_eq!(th.displayed_height, 1.58);
            }
        }
        assert_eq!(ss.exact_delays()[7], 7.0 / 12.0);
        assert_eq!(ss.flip().exact_delays()[7], 7.0 / 12.0);
        assert!(ss.flip().is_valid());
    }

    #[test]
    fn test_rejects_odd_hands() {
        let vanilla = VanillaSiteswap::parse("3").unwrap();
        assert_eq!(
            Siteswap::from_khss(&vanilla, 3).unwrap_err(),
            SiteswapError::InvalidHands(3)
        );
    }

    #[test]
    fn test_rejects_multiplex() {
        let vanilla = VanillaSiteswap::parse("[43]23").unwrap();
        assert!(matches!(
            Siteswap::from_khss(&vanilla, 4),
            Err(SiteswapError::Multiplex(_))
        ));
    }

    #[test]
    fn test_from_vanilla() {
        let vanilla = VanillaSiteswap::parse("b01").unwrap();
        let ss = Siteswap::from_vanilla(&vanilla).unwrap();
        assert_eq!(ss.to_string(), "b01");
        assert_eq!(ss.num_objects(), 4);
        assert_eq!(ss.max_height(), 11.0);
    }
}
