/// Tolerance for values that should be exact.
pub const EPS: f64 = 1e-7;

/// Tolerance for values written with only two decimal places.
pub const LAX_EPS: f64 = 1e-2;

/// Snap a height or delay onto a nearby small-denominator fraction.
///
/// Written heights carry at most two decimals, so `4.33` stands for `4 + 1/3`
/// and `1.16` for `1 + 1/6`. With `allow_thirds` a single decimal `.3` or `.6`
/// is read as a third as well, which only makes sense once the juggler count is
/// a multiple of three.
pub fn fix_fraction(n: f64, allow_thirds: bool) -> f64 {
    let whole = n.floor();
    let frac = n % 1.0;
    if frac == 0.0 {
        return n;
    }
    if allow_thirds && (frac - 0.3).abs() < EPS {
        return whole + 1.0 / 3.0;
    }
    if allow_thirds && (frac - 0.6).abs() < EPS {
        return whole + 2.0 / 3.0;
    }
    for den in 2..10 {
        for num in 1..den {
            let candidate = num as f64 / den as f64;
            if (frac - candidate).abs() < LAX_EPS {
                return whole + candidate;
            }
        }
    }
    n
}

/// Round to the two decimal places used for display.
pub fn unfix_fraction(n: f64) -> f64 {
    (n * 100.0).round() / 100.0
}

/// Round `value` to the nearest integer if it lies within `tolerance` of it.
pub fn round_within(value: f64, tolerance: f64) -> Option<f64> {
    let rounded = value.round();
    ((value - rounded).abs() < tolerance).then_some(rounded)
}

/// Exact rational, used where phase offsets must share a common grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fraction {
    pub numerator: i64,
    pub denominator: i64,
}

impl Fraction {
    /// `None` for a zero denominator
    fn new(numerator: i64, denominator: i64) -> Option<Self> {
        if denominator == 0 {
            return None;
        }
        let gcd = gcd(numerator.abs(), denominator.abs());
        let sign = denominator.signum();
        Some(Fraction {
            numerator: sign * numerator / gcd,
            denominator: sign * denominator / gcd,
        })
    }

    /// Smallest-denominator fraction within [`EPS`] of `value`.
    pub fn approximate(value: f64, max_denominator: i64) -> Option<Self> {
        (1..=max_denominator).find_map(|den| {
            let num = (value * den as f64).round();
            if (num / den as f64 - value).abs() < EPS {
                Fraction::new(num as i64, den)
            } else {
                None
            }
        })
    }

    pub fn to_float(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Fractional part, always in `[0, 1)`
    pub fn fract(self) -> Self {
        Fraction {
            numerator: self.numerator.rem_euclid(self.denominator),
            denominator: self.denominator,
        }
    }
}

/// Greatest common divisor
pub fn gcd(mut a: i64, mut b: i64) -> i64 {
    while b != 0 {
        let temp = b;
        b = a % b;
        a = temp;
    }
    a
}

/// Least common multiple
pub fn lcm(a: i64, b: i64) -> i64 {
    if a == 0 || b == 0 {
        return 0;
    }
    (a * b).abs() / gcd(a, b)
}
