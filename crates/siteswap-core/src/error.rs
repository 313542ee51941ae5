/// Hard failures: broken preconditions on conversions and transitions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SiteswapError {
    #[error("States must be for the same number of objects ({0} and {1})")]
    ObjectCountMismatch(usize, usize),

    #[error("States must be for the same number of jugglers ({0} and {1})")]
    JugglerCountMismatch(usize, usize),

    #[error("Transitions between states with different juggler delays are not supported")]
    DelayMismatch,

    #[error("Not a vanilla siteswap: {0}")]
    NotVanilla(String),

    #[error("Multiplex throws are not supported by {0}")]
    Multiplex(&'static str),

    #[error("Only siteswaps up to height 35 are accepted, got {0}")]
    HeightOutOfRange(f64),

    #[error("Unknown siteswap throw \"{0}\"")]
    UnknownThrow(String),

    #[error("Invalid notation: {0}")]
    Notation(String),

    #[error("Number of hands must be a positive even number, got {0}")]
    InvalidHands(usize),

    #[error("Invalid JIF: {0}")]
    Jif(String),

    #[error("Unsupported limb type \"{0}\"")]
    InvalidLimb(String),

    #[error("JIF prop repetition not found within {0} periods")]
    JifPeriodNotFound(usize),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

pub type Result<T> = std::result::Result<T, SiteswapError>;

/// Why a pattern is not jugglable. Stored on the pattern rather than returned,
/// so an invalid pattern can still be rendered and inspected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("No jugglers")]
    NoJugglers,

    #[error("Pattern has no beats")]
    NoBeats,

    #[error("Mismatching juggler periods")]
    MismatchingPeriods,

    #[error("Number of jugglers ({jugglers}) not equal to number of delays ({delays})")]
    DelayCount { jugglers: usize, delays: usize },

    #[error("Invalid juggler {juggler}, there are only {jugglers} jugglers")]
    InvalidJuggler { juggler: char, jugglers: usize },

    #[error("Conflicting delays for juggler {juggler}: {existing} and {inferred}")]
    DelayConflict {
        juggler: char,
        existing: f64,
        inferred: f64,
    },

    #[error("Throw {height} by juggler {juggler} is a self throw at a fractional height")]
    FractionalSelfThrow { height: f64, juggler: char },

    #[error("Invalid pattern average")]
    InvalidAverage,

    #[error("Throw {height} lands at an invalid time for juggler {juggler}")]
    InvalidLandingTime { height: f64, juggler: usize },

    #[error("Collision at juggler {juggler}, time {time}, hand {hand}")]
    Collision {
        juggler: usize,
        time: usize,
        hand: usize,
    },

    #[error("Collision at time {time}")]
    TimeCollision { time: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            ValidationError::DelayCount { jugglers: 2, delays: 1 }.to_string(),
            "Number of jugglers (2) not equal to number of delays (1)"
        );
        assert_eq!(
            ValidationError::InvalidJuggler { juggler: 'C', jugglers: 2 }.to_string(),
            "Invalid juggler C, there are only 2 jugglers"
        );
        assert_eq!(
            ValidationError::InvalidLandingTime { height: 3.2, juggler: 1 }.to_string(),
            "Throw 3.2 lands at an invalid time for juggler 1"
        );
        assert_eq!(
            ValidationError::Collision { juggler: 0, time: 1, hand: 1 }.to_string(),
            "Collision at juggler 0, time 1, hand 1"
        );
    }

    #[test]
    fn test_hard_error_messages() {
        assert_eq!(
            SiteswapError::UnknownThrow("A".into()).to_string(),
            "Unknown siteswap throw \"A\""
        );
        assert_eq!(
            SiteswapError::JifPeriodNotFound(500).to_string(),
            "JIF prop repetition not found within 500 periods"
        );
    }
}
